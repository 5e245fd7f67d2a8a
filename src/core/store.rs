//! Session store: creation, joining and read access
//!
//! Each session sits behind its own mutex. Every check-then-act sequence on a
//! session runs while holding that mutex, so concurrent callers on one session
//! are serialized and callers on different sessions never contend. The mutex
//! is never held across an `.await`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{EngineConfig, InviteResolver};
use crate::types::{EngineError, Session, SessionId, SessionView, User, UserId};

pub type SessionCell = Arc<Mutex<Session>>;

/// Sessions a user created and sessions they joined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionListing {
    pub created_sessions: Vec<SessionView>,
    pub joined_sessions: Vec<SessionView>,
}

/// Owner of every session
#[derive(Debug)]
pub struct SessionStore {
    config: EngineConfig,
    sessions: RwLock<HashMap<SessionId, SessionCell>>,
    invites: InviteResolver,
    next_id: AtomicU64,
}

impl SessionStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            invites: InviteResolver::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Open a new session awaiting an opponent
    pub fn create(&self, title: &str, creator: &User) -> Result<SessionView, EngineError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::invalid_input("title is required"));
        }
        if title.chars().count() > self.config.max_title_chars {
            return Err(EngineError::invalid_input(format!(
                "title exceeds {} characters",
                self.config.max_title_chars
            )));
        }

        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let token = self.invites.issue(id)?;
        let session = Session::new(id, title, creator.clone(), token);
        let view = session.view_for(creator.id);

        let mut sessions = self.sessions.write().map_err(|_| poisoned("session index"))?;
        sessions.insert(id, Arc::new(Mutex::new(session)));
        drop(sessions);

        info!(session_id = %id, user_id = %creator.id, "session created");
        Ok(view)
    }

    /// Become the opponent of the session the token was issued for
    ///
    /// Exactly one of any number of concurrent joins on one token succeeds.
    pub fn join(&self, token: &str, user: &User) -> Result<SessionView, EngineError> {
        let id = self.invites.resolve(token)?;
        let cell = self.fetch(id)?;
        let view = {
            let mut session = lock(&cell)?;
            if let Err(err) = session.admit_opponent(token, user.clone()) {
                debug!(session_id = %id, user_id = %user.id, error = %err, "join rejected");
                return Err(err);
            }
            session.view_for(user.id)
        };
        self.invites.retire(token);

        info!(session_id = %id, user_id = %user.id, "opponent joined");
        Ok(view)
    }

    /// Session detail, visible to participants only
    pub fn get(&self, id: SessionId, requester: UserId) -> Result<SessionView, EngineError> {
        let cell = self.fetch(id)?;
        let session = lock(&cell)?;
        if let Err(err) = session.ensure_participant(requester) {
            debug!(session_id = %id, user_id = %requester, error = %err, "session read rejected");
            return Err(err);
        }
        Ok(session.view_for(requester))
    }

    /// Sessions `user` created and sessions `user` joined, each in creation order
    pub fn list_for_user(&self, user: UserId) -> Result<SessionListing, EngineError> {
        let mut cells: Vec<(SessionId, SessionCell)> = {
            let sessions = self.sessions.read().map_err(|_| poisoned("session index"))?;
            sessions.iter().map(|(id, cell)| (*id, Arc::clone(cell))).collect()
        };
        cells.sort_by_key(|(id, _)| *id);

        let mut listing = SessionListing {
            created_sessions: Vec::new(),
            joined_sessions: Vec::new(),
        };
        for (_, cell) in cells {
            let session = lock(&cell)?;
            if session.is_creator(user) {
                listing.created_sessions.push(session.view_for(user));
            } else if session.is_opponent(user) {
                listing.joined_sessions.push(session.view_for(user));
            }
        }
        Ok(listing)
    }

    /// Shared handle to one session
    pub fn fetch(&self, id: SessionId) -> Result<SessionCell, EngineError> {
        let sessions = self.sessions.read().map_err(|_| poisoned("session index"))?;
        sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("session", id))
    }
}

/// Enter a session's critical section
pub fn lock(cell: &Mutex<Session>) -> Result<MutexGuard<'_, Session>, EngineError> {
    cell.lock().map_err(|_| poisoned("session"))
}

fn poisoned(what: &str) -> EngineError {
    EngineError::Internal(format!("{} lock poisoned", what))
}
