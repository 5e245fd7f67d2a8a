//! Adjudicator: the engine facade tying store, ledger and judgment gate together

use std::sync::Arc;

use crate::core::{
    ArgumentLedger, ArgumentListing, EngineConfig, Judge, JudgmentGate, SessionListing,
    SessionStore,
};
use crate::types::{ArgumentId, ArgumentView, EngineError, SessionId, SessionView, User, UserId};

/// One instance serves every session; clone the `Arc` to share it
pub struct Adjudicator {
    store: Arc<SessionStore>,
    ledger: ArgumentLedger,
    gate: JudgmentGate,
}

impl Adjudicator {
    pub fn new(config: EngineConfig, judge: Arc<dyn Judge>) -> Self {
        let store = Arc::new(SessionStore::new(config));
        Self {
            ledger: ArgumentLedger::new(Arc::clone(&store)),
            gate: JudgmentGate::new(Arc::clone(&store), judge),
            store,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn create_session(&self, title: &str, creator: &User) -> Result<SessionView, EngineError> {
        self.store.create(title, creator)
    }

    pub fn join_session(&self, token: &str, user: &User) -> Result<SessionView, EngineError> {
        self.store.join(token, user)
    }

    pub fn session(&self, id: SessionId, requester: UserId) -> Result<SessionView, EngineError> {
        self.store.get(id, requester)
    }

    pub fn sessions_for(&self, user: UserId) -> Result<SessionListing, EngineError> {
        self.store.list_for_user(user)
    }

    pub fn submit_argument(
        &self,
        session_id: SessionId,
        author: &User,
        content: &str,
    ) -> Result<ArgumentView, EngineError> {
        self.ledger.submit(session_id, author, content)
    }

    pub fn lock_argument(&self, argument_id: ArgumentId, user: UserId) -> Result<ArgumentView, EngineError> {
        self.ledger.lock(argument_id, user)
    }

    pub fn arguments(&self, session_id: SessionId, requester: UserId) -> Result<ArgumentListing, EngineError> {
        self.ledger.list(session_id, requester)
    }

    pub async fn request_judgment(&self, session_id: SessionId, requester: UserId) -> Result<String, EngineError> {
        self.gate.request(session_id, requester).await
    }
}
