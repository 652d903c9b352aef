//! The user/session store.
//!
//! `Store` owns the user table and the session table. Every mutation goes
//! through its methods, and every mutation of the user table rewrites the whole
//! backing file before returning. There is no incremental append and no
//! recovery from a partial write.
//!
//! The user table sits behind a single lock that is held across the
//! mutate-and-save step, so concurrent registrations and comments are
//! serialised rather than racing on the file.

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::{
    Result,
    session::{SessionStore, SessionToken},
    user::{User, UserTable, persistence},
};

mod errors;

pub use errors::StoreError;

/// Result of a successful login.
///
/// Carries the submitted plaintext credentials back to the caller, which
/// echoes them into cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: SessionToken,
    pub username: String,
    pub password: String,
}

/// Users, their comments and active sessions.
#[derive(Debug)]
pub struct Store {
    users: RwLock<UserTable>,
    sessions: SessionStore,
    path: Option<PathBuf>,
}

impl Store {
    /// Create a store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            users: RwLock::new(UserTable::new()),
            sessions: SessionStore::new(),
            path: None,
        }
    }

    /// Open the store backed by the CSV file at `path`.
    ///
    /// A missing file starts an empty store; the file is created on the first
    /// registration.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let users = persistence::load_from_file(&path).await?;
        tracing::info!("Loaded {} users from {}", users.len(), path.display());

        Ok(Self {
            users: RwLock::new(users),
            sessions: SessionStore::new(),
            path: Some(path),
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The session table.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Register a new user and log them in.
    ///
    /// # Errors
    /// [`StoreError::UsernameAlreadyExists`] if the name is taken. Nothing is
    /// written in that case.
    pub async fn register(&self, username: &str, password: &str) -> Result<SessionToken> {
        {
            let mut users = self.users.write().await;
            if users.contains(username) {
                return Err(StoreError::UsernameAlreadyExists {
                    username: username.to_string(),
                }
                .into());
            }

            users.insert(User::new(username, password));
            if let Err(e) = self.persist(&users).await {
                users.remove(username);
                return Err(e);
            }
        }

        tracing::info!("Registered user {username}");
        Ok(self.sessions.create_session(username).await)
    }

    /// Check credentials and open a new session.
    ///
    /// # Errors
    /// [`StoreError::InvalidCredentials`] for an unknown user or a wrong
    /// password. No session is created in that case.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant> {
        let valid = self
            .users
            .read()
            .await
            .get(username)
            .is_some_and(|user| user.verify_password(password));

        if !valid {
            tracing::debug!("Rejected login for {username}");
            return Err(StoreError::InvalidCredentials.into());
        }

        let token = self.sessions.create_session(username).await;
        Ok(LoginGrant {
            token,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) {
        self.sessions.destroy_session(token).await;
    }

    /// Username behind a session token.
    pub async fn current_user(&self, token: &str) -> Option<String> {
        self.sessions.get_username(token).await
    }

    /// Fetch one user's record.
    pub async fn get_profile(&self, username: &str) -> Result<User> {
        self.users
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| {
                StoreError::UserNotFound {
                    username: username.to_string(),
                }
                .into()
            })
    }

    /// Append a comment to `target`'s profile on behalf of `current_user`.
    ///
    /// The text is stored verbatim. Empty text is accepted but not stored.
    ///
    /// # Errors
    /// Rejected when `current_user` is `None`, when `target` is unknown, or
    /// when `target` is `current_user`.
    pub async fn add_comment(
        &self,
        current_user: Option<&str>,
        target: &str,
        text: &str,
    ) -> Result<()> {
        let Some(current_user) = current_user else {
            return Err(StoreError::NotAuthenticated.into());
        };
        if current_user == target {
            return Err(StoreError::SelfComment {
                username: target.to_string(),
            }
            .into());
        }

        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(target) else {
            return Err(StoreError::UnknownCommentTarget {
                username: target.to_string(),
            }
            .into());
        };

        if text.is_empty() {
            return Ok(());
        }

        user.comments.push(text.to_string());
        if let Err(e) = self.persist(&users).await {
            if let Some(user) = users.get_mut(target) {
                user.comments.pop();
            }
            return Err(e);
        }

        tracing::info!("{current_user} commented on {target}");
        Ok(())
    }

    /// Copy of the whole user table.
    pub async fn snapshot(&self) -> UserTable {
        self.users.read().await.clone()
    }

    /// All registered usernames in table order.
    pub async fn usernames(&self) -> Vec<String> {
        self.users.read().await.usernames()
    }

    /// Number of registered users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Rewrite the backing file from memory.
    pub async fn save(&self) -> Result<()> {
        let users = self.users.read().await;
        self.persist(&users).await
    }

    async fn persist(&self, users: &UserTable) -> Result<()> {
        match &self.path {
            Some(path) => persistence::save_to_file(users, path).await,
            None => Ok(()),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::in_memory()
    }
}
