//! Arguments submitted within a session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ArgumentId, SessionId, User};

/// One side's submission
#[derive(Debug, Clone)]
pub struct Argument {
    id: ArgumentId,
    session_id: SessionId,
    author: User,
    content: String,
    submitted_at: DateTime<Utc>,
    locked: bool,
}

impl Argument {
    /// New unlocked argument stamped with the current time
    pub fn new(id: ArgumentId, session_id: SessionId, author: User, content: impl Into<String>) -> Self {
        Self {
            id,
            session_id,
            author,
            content: content.into(),
            submitted_at: Utc::now(),
            locked: false,
        }
    }

    pub fn id(&self) -> ArgumentId {
        self.id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn author(&self) -> &User {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// One-way lock. Returns false if it was already locked.
    pub(crate) fn lock(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    pub fn view(&self) -> ArgumentView {
        ArgumentView {
            id: self.id,
            content: self.content.clone(),
            submitted_at: self.submitted_at,
            is_locked: self.locked,
            user: self.author.name.clone(),
        }
    }
}

/// Argument as returned over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentView {
    pub id: ArgumentId,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
    pub is_locked: bool,
    pub user: String,
}
