//! Adjudicator: session and argument lifecycle engine for two-party debates
//!
//! A creator opens a session, an opponent joins with the single-use invite
//! token, both sides submit and lock arguments, and once both are locked the
//! session may be handed to a judge exactly once.

pub mod core;
pub mod types;

// =============================================================================
// ENGINE LIMITS
// =============================================================================

/// Longest accepted session title, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Upper bound on a single judge call (seconds)
pub const DEFAULT_JUDGE_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Listen address when none is configured
pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";

/// Browser origin allowed to call the API cross-origin
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Chat model used by the OpenAI judge
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

/// OpenAI-compatible chat completions endpoint
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
