//! The external judging collaborator

use async_trait::async_trait;

use crate::types::{CaseFile, JudgeError};

/// Produces a verdict for a fully argued case
///
/// Called at most once per successful judgment, with only locked arguments.
/// The caller bounds the call with a timeout; implementations need not.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn adjudicate(&self, case: &CaseFile) -> Result<String, JudgeError>;
}
