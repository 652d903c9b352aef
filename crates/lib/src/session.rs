//! Session management for the web interface
//!
//! Provides in-memory session storage mapping session tokens to usernames.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::crypto::generate_token;

/// Session token (random hex stored in the `session_id` cookie)
pub type SessionToken = String;

/// In-memory session store
///
/// Maps session tokens to the username they were issued for.
/// Sessions never expire and are lost on server restart.
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, String>>>,
}

impl SessionStore {
    /// Create a new empty session store
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new session for a user
    ///
    /// Generates a random token and records it against `username`.
    ///
    /// # Returns
    /// The session token to be stored in a cookie
    pub async fn create_session(&self, username: &str) -> SessionToken {
        let token = generate_token();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), username.to_string());
        token
    }

    /// Get the username a session token belongs to
    pub async fn get_username(&self, token: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Destroy a session
    ///
    /// Unknown tokens are ignored.
    pub async fn destroy_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Get the number of active sessions (for debugging)
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
