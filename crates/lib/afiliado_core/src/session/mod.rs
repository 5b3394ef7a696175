//! Persisted session store.
//!
//! A small key-value store that survives restarts and holds the signed-in
//! user and its bearer token under two fixed keys.

pub mod file;
pub mod memory;

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::models::auth::User;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

/// Key holding the serialized [`User`].
pub const USER_KEY: &str = "afiliadobot_user";

/// Key holding the raw bearer token.
pub const TOKEN_KEY: &str = "afiliadobot_token";

/// Session persistence errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Corrupt(String),

    #[error("Stored user is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Session store lock poisoned")]
    Poisoned,
}

/// Key-value persistence shared by the whole process.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Typed view of the session entries in a [`SessionStore`].
#[derive(Clone)]
pub struct PersistedSession {
    store: Arc<dyn SessionStore>,
}

impl PersistedSession {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Stored user, if any. Unparseable data is an error, not `None`.
    pub fn user(&self) -> Result<Option<User>, SessionError> {
        match self.store.get(USER_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Stored bearer token, if any.
    pub fn token(&self) -> Result<Option<String>, SessionError> {
        Ok(self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Persists both entries. If either write fails both are removed again.
    pub fn save(&self, user: &User, token: &str) -> Result<(), SessionError> {
        let serialized = serde_json::to_string(user)?;
        let written = self
            .store
            .set(TOKEN_KEY, token)
            .and_then(|()| self.store.set(USER_KEY, &serialized));
        if let Err(e) = written {
            if let Err(rollback) = self.clear() {
                warn!(error = %rollback, "could not roll back partially saved session");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Removes both entries, attempting each even if the other fails.
    pub fn clear(&self) -> Result<(), SessionError> {
        let user = self.store.remove(USER_KEY);
        let token = self.store.remove(TOKEN_KEY);
        if let Err(e) = &user {
            warn!(error = %e, "failed to remove stored user");
        }
        if let Err(e) = &token {
            warn!(error = %e, "failed to remove stored token");
        }
        user.and(token)
    }
}
