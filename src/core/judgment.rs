//! Judgment gate: at most one verdict per session
//!
//! A request first claims the session under its mutex, then calls the judge
//! with the lock released. The claim makes concurrent requests fail fast with
//! `Conflict` instead of reaching the judge. If the call fails, times out or
//! the request future is dropped, the claim is released and the session stays
//! in `awaiting_judgment`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::store::{lock, SessionCell};
use crate::core::{Judge, SessionStore};
use crate::types::{CaseFile, EngineError, SessionId, UserId};

pub struct JudgmentGate {
    store: Arc<SessionStore>,
    judge: Arc<dyn Judge>,
    timeout: Duration,
}

/// Outstanding right to judge one session; released on drop unless committed
struct JudgingClaim {
    cell: SessionCell,
    committed: bool,
}

impl JudgingClaim {
    fn take(cell: SessionCell, requester: UserId) -> Result<(Self, CaseFile), EngineError> {
        let case = {
            let mut session = lock(&cell)?;
            if let Err(err) = session
                .ensure_participant(requester)
                .and_then(|()| session.begin_judging())
            {
                debug!(session_id = %session.id(), user_id = %requester, error = %err, "judgment claim rejected");
                return Err(err);
            }
            session.case_file()
        };
        Ok((Self { cell, committed: false }, case))
    }

    fn commit(mut self, verdict: String) -> Result<String, EngineError> {
        let mut session = lock(&self.cell)?;
        let judgment = session.record_judgment(verdict)?;
        let verdict = judgment.verdict.clone();
        drop(session);
        self.committed = true;
        Ok(verdict)
    }
}

impl Drop for JudgingClaim {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match self.cell.lock() {
            Ok(mut session) => session.abandon_judging(),
            Err(poisoned) => poisoned.into_inner().abandon_judging(),
        }
    }
}

impl JudgmentGate {
    pub fn new(store: Arc<SessionStore>, judge: Arc<dyn Judge>) -> Self {
        let timeout = store.config().judge_timeout;
        Self { store, judge, timeout }
    }

    /// Ask the judge for a verdict and record it
    ///
    /// Returns the verdict text. A second request after success is a `Conflict`.
    pub async fn request(&self, session_id: SessionId, requester: UserId) -> Result<String, EngineError> {
        let cell = self.store.fetch(session_id)?;
        let (claim, case) = JudgingClaim::take(cell, requester)?;
        info!(
            session_id = %session_id,
            user_id = %requester,
            arguments = case.arguments.len(),
            "judgment requested"
        );

        let verdict = match tokio::time::timeout(self.timeout, self.judge.adjudicate(&case)).await {
            Err(_) => {
                warn!(session_id = %session_id, timeout_ms = self.timeout.as_millis() as u64, "judge timed out");
                return Err(EngineError::upstream(format!(
                    "judge did not answer within {}s",
                    self.timeout.as_secs_f64()
                )));
            }
            Ok(Err(err)) => {
                warn!(session_id = %session_id, error = %err, "judge failed");
                return Err(EngineError::upstream(err.to_string()));
            }
            Ok(Ok(verdict)) if verdict.trim().is_empty() => {
                warn!(session_id = %session_id, "judge returned an empty verdict");
                return Err(EngineError::upstream("judge returned an empty verdict"));
            }
            Ok(Ok(verdict)) => verdict,
        };

        let verdict = claim.commit(verdict)?;
        info!(session_id = %session_id, "session judged");
        Ok(verdict)
    }
}
