//! Identity gate: bearer token to user
//!
//! Registration and login live elsewhere; the engine only needs a verified
//! identity per call. `TokenRegistry` keeps SHA-256 digests of the tokens,
//! never the tokens themselves.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::core::ConfigError;
use crate::types::{User, UserId};

/// Resolves a presented bearer token to a user
pub trait IdentityGate: Send + Sync {
    fn authenticate(&self, bearer_token: &str) -> Option<User>;
}

/// One entry of the users file
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub id: u64,
    pub name: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct UsersFile {
    users: Vec<UserEntry>,
}

/// Static set of users known at startup
#[derive(Debug, Default)]
pub struct TokenRegistry {
    by_digest: HashMap<[u8; 32], User>,
}

fn digest(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries, rejecting duplicate ids, duplicate tokens and blank fields
    pub fn from_entries(entries: Vec<UserEntry>) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        let mut ids: HashSet<UserId> = HashSet::new();
        for entry in entries {
            if entry.token.trim().is_empty() || entry.name.trim().is_empty() {
                return Err(ConfigError::Users(format!("user {} has a blank name or token", entry.id)));
            }
            if !ids.insert(UserId(entry.id)) {
                return Err(ConfigError::Users(format!("duplicate user id {}", entry.id)));
            }
            let user = User::new(entry.id, entry.name);
            if registry.by_digest.insert(digest(&entry.token), user).is_some() {
                return Err(ConfigError::Users(format!("user {} reuses another user's token", entry.id)));
            }
        }
        Ok(registry)
    }

    /// Load `{"users": [{"id": 1, "name": "alice", "token": "..."}]}`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: UsersFile = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_entries(file.users)
    }

    /// Register a single user; later registrations of the same token win
    pub fn register(&mut self, user: User, token: &str) {
        self.by_digest.insert(digest(token), user);
    }

    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }
}

impl IdentityGate for TokenRegistry {
    fn authenticate(&self, bearer_token: &str) -> Option<User> {
        self.by_digest.get(&digest(bearer_token)).cloned()
    }
}
