//! Invite resolver: single-use join tokens
//!
//! Tokens are random UUIDv4 strings. Possession of a token is the only
//! authorization needed to join, so they must be unguessable and unique.

use std::collections::HashMap;
use std::sync::Mutex;

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::types::{EngineError, SessionId};

lazy_static! {
    /// Canonical hyphenated lowercase UUID
    static ref RE_JOIN_TOKEN: Regex = Regex::new(
        r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$"
    ).unwrap();
}

/// Maps outstanding join tokens to their session
#[derive(Debug, Default)]
pub struct InviteResolver {
    tokens: Mutex<HashMap<String, SessionId>>,
}

impl InviteResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `token` has the shape of a token this resolver could have issued
    pub fn is_well_formed(token: &str) -> bool {
        RE_JOIN_TOKEN.is_match(token)
    }

    /// Mint a fresh token for `session` and register it
    pub fn issue(&self, session: SessionId) -> Result<String, EngineError> {
        let mut tokens = self.tokens.lock().map_err(poisoned)?;
        loop {
            let token = Uuid::new_v4().to_string();
            if !tokens.contains_key(&token) {
                tokens.insert(token.clone(), session);
                return Ok(token);
            }
        }
    }

    /// Session the token was issued for
    pub fn resolve(&self, token: &str) -> Result<SessionId, EngineError> {
        if !Self::is_well_formed(token) {
            return Err(EngineError::not_found("join token", token));
        }
        let tokens = self.tokens.lock().map_err(poisoned)?;
        tokens
            .get(token)
            .copied()
            .ok_or_else(|| EngineError::not_found("join token", token))
    }

    /// Forget a spent token
    pub fn retire(&self, token: &str) {
        match self.tokens.lock() {
            Ok(mut tokens) => {
                tokens.remove(token);
            }
            Err(p) => {
                p.into_inner().remove(token);
            }
        }
    }

    /// Number of tokens still outstanding
    pub fn outstanding(&self) -> usize {
        self.tokens.lock().map(|t| t.len()).unwrap_or(0)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> EngineError {
    EngineError::Internal("invite index lock poisoned".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_tokens_resolve() {
        let invites = InviteResolver::new();
        let token = invites.issue(SessionId(7)).unwrap();
        assert!(InviteResolver::is_well_formed(&token));
        assert_eq!(invites.resolve(&token).unwrap(), SessionId(7));
    }

    #[test]
    fn test_tokens_are_unique() {
        let invites = InviteResolver::new();
        let mut seen = std::collections::HashSet::new();
        for i in 0..500 {
            assert!(seen.insert(invites.issue(SessionId(i)).unwrap()));
        }
        assert_eq!(invites.outstanding(), 500);
    }

    #[test]
    fn test_retired_token_is_unknown() {
        let invites = InviteResolver::new();
        let token = invites.issue(SessionId(1)).unwrap();
        invites.retire(&token);
        assert_eq!(invites.resolve(&token).unwrap_err().kind(), "not_found");
    }

    #[test]
    fn test_malformed_token_rejected() {
        let invites = InviteResolver::new();
        for bad in ["", "abc", "../../etc", "00000000-0000-0000-0000-000000000000"] {
            assert_eq!(invites.resolve(bad).unwrap_err().kind(), "not_found", "{bad}");
        }
    }
}
