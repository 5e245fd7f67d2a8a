//! Argument ledger: append-only submissions and one-way locking
//!
//! Locking re-evaluates judgment readiness inside the same per-session
//! critical section, so two final locks racing from opposite sides always
//! leave the session in `awaiting_judgment`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::store::lock;
use crate::core::SessionStore;
use crate::types::{
    Argument, ArgumentId, ArgumentView, EngineError, SessionId, SessionStatus, User, UserId,
};

/// All arguments of a session, in submission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentListing {
    pub session_id: SessionId,
    pub arguments: Vec<ArgumentView>,
    /// Both sides have locked; the session is ready for (or past) judgment
    pub all_arguments_submitted: bool,
}

#[derive(Debug)]
pub struct ArgumentLedger {
    store: Arc<SessionStore>,
    /// Which session each argument belongs to
    owners: RwLock<HashMap<ArgumentId, SessionId>>,
    next_id: AtomicU64,
}

impl ArgumentLedger {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            store,
            owners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append an unlocked argument on behalf of `author`
    pub fn submit(
        &self,
        session_id: SessionId,
        author: &User,
        content: &str,
    ) -> Result<ArgumentView, EngineError> {
        if content.trim().is_empty() {
            return Err(EngineError::invalid_input("argument content is required"));
        }

        let cell = self.store.fetch(session_id)?;
        let mut session = lock(&cell)?;
        if let Err(err) = session.ensure_participant(author.id) {
            debug!(session_id = %session_id, user_id = %author.id, error = %err, "submit rejected");
            return Err(err);
        }
        if session.status() != SessionStatus::Active {
            debug!(session_id = %session_id, status = %session.status(), "submit rejected");
            return Err(EngineError::conflict(format!(
                "session {} is {}, not active",
                session_id,
                session.status()
            )));
        }
        if session.has_locked(author.id) {
            debug!(session_id = %session_id, user_id = %author.id, "submit after lock rejected");
            return Err(EngineError::conflict(
                "you already locked an argument in this session",
            ));
        }

        let id = ArgumentId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let view = session
            .append_argument(Argument::new(id, session_id, author.clone(), content))
            .view();
        self.owners
            .write()
            .map_err(|_| EngineError::Internal("argument index lock poisoned".into()))?
            .insert(id, session_id);

        info!(session_id = %session_id, user_id = %author.id, argument_id = %id, "argument submitted");
        Ok(view)
    }

    /// Lock one of the caller's own arguments
    ///
    /// A second lock on the same argument is a `Conflict`, not a no-op.
    pub fn lock(&self, argument_id: ArgumentId, user: UserId) -> Result<ArgumentView, EngineError> {
        let session_id = self.owner_of(argument_id)?;
        let cell = self.store.fetch(session_id)?;
        let mut session = lock(&cell)?;
        let status = session.status();

        let argument = session
            .argument_mut(argument_id)
            .ok_or_else(|| EngineError::not_found("argument", argument_id))?;
        if argument.author().id != user {
            debug!(argument_id = %argument_id, user_id = %user, "lock by non-author rejected");
            return Err(EngineError::forbidden("you can only lock your own arguments"));
        }
        if argument.is_locked() {
            debug!(argument_id = %argument_id, "duplicate lock rejected");
            return Err(EngineError::conflict(format!(
                "argument {} is already locked",
                argument_id
            )));
        }
        if status != SessionStatus::Active {
            debug!(session_id = %session_id, status = %status, "lock rejected");
            return Err(EngineError::conflict(format!(
                "session {} is {}, arguments can no longer be locked",
                session_id, status
            )));
        }
        argument.lock();
        let view = argument.view();
        info!(session_id = %session_id, user_id = %user, argument_id = %argument_id, "argument locked");

        if session.settle_if_ready()? {
            info!(session_id = %session_id, "both sides locked, awaiting judgment");
        }
        Ok(view)
    }

    /// Every argument in the session, for participants only
    pub fn list(&self, session_id: SessionId, requester: UserId) -> Result<ArgumentListing, EngineError> {
        let cell = self.store.fetch(session_id)?;
        let session = lock(&cell)?;
        if let Err(err) = session.ensure_participant(requester) {
            debug!(session_id = %session_id, user_id = %requester, error = %err, "argument listing rejected");
            return Err(err);
        }
        Ok(ArgumentListing {
            session_id,
            arguments: session.arguments().iter().map(Argument::view).collect(),
            all_arguments_submitted: session.status() >= SessionStatus::AwaitingJudgment,
        })
    }

    fn owner_of(&self, argument_id: ArgumentId) -> Result<SessionId, EngineError> {
        self.owners
            .read()
            .map_err(|_| EngineError::Internal("argument index lock poisoned".into()))?
            .get(&argument_id)
            .copied()
            .ok_or_else(|| EngineError::not_found("argument", argument_id))
    }
}
