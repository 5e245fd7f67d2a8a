//! Core modules for the adjudicator

pub mod config;
pub mod invite;
pub mod store;
pub mod ledger;
pub mod judge;
pub mod openai;
pub mod judgment;
pub mod engine;
pub mod identity;
pub mod api;

#[cfg(test)]
mod test_logs;

pub use config::{EngineConfig, ServerConfig, OpenAiSettings, ConfigError};
pub use invite::InviteResolver;
pub use store::{SessionStore, SessionListing};
pub use ledger::{ArgumentLedger, ArgumentListing};
pub use judge::Judge;
pub use openai::{OpenAiJudge, render_prompt, SYSTEM_PROMPT};
pub use judgment::JudgmentGate;
pub use engine::Adjudicator;
pub use identity::{IdentityGate, TokenRegistry};
pub use api::{cors_layer, create_router, run_server, AppState};
