//! Verdict artifact and the case handed to a judge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SessionId;

/// The single verdict recorded for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub session_id: SessionId,
    pub verdict: String,
    pub produced_at: DateTime<Utc>,
}

impl Judgment {
    pub fn new(session_id: SessionId, verdict: impl Into<String>) -> Self {
        Self {
            session_id,
            verdict: verdict.into(),
            produced_at: Utc::now(),
        }
    }
}

/// A locked argument as presented to the judge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseArgument {
    pub author: String,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
}

/// Everything a judge sees: the debate title, both parties and their locked arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseFile {
    pub session_id: SessionId,
    pub title: String,
    pub creator: String,
    pub opponent: String,
    /// Locked arguments from both sides, in submission order
    pub arguments: Vec<CaseArgument>,
}
