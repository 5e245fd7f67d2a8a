//! Core types for the adjudicator

mod ids;
mod status;
mod error;
mod argument;
mod judgment;
mod session;

pub use ids::{SessionId, ArgumentId, UserId, User};
pub use status::SessionStatus;
pub use error::{EngineError, JudgeError};
pub use argument::{Argument, ArgumentView};
pub use judgment::{Judgment, CaseFile, CaseArgument};
pub use session::{Session, SessionView};
