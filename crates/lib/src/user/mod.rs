//! User records and the in-memory user table.
//!
//! The table is keyed by username and iterates in username order, which is also
//! the row order of the persisted file.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::crypto::hash_password;

pub(crate) mod persistence;

/// A registered user.
///
/// Serialized as-is into the comment template context, so every field here is
/// reachable from a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub comments: Vec<String>,
}

impl User {
    /// Create a user with no comments, digesting the plaintext password.
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_hash: hash_password(password),
            comments: Vec::new(),
        }
    }

    /// Check a plaintext password against the stored digest.
    pub fn verify_password(&self, password: &str) -> bool {
        self.password_hash == hash_password(password)
    }
}

/// All registered users, keyed by username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserTable {
    users: BTreeMap<String, User>,
}

impl UserTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn get_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users.get_mut(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Insert or replace a user, returning the previous record under that name.
    pub fn insert(&mut self, user: User) -> Option<User> {
        self.users.insert(user.username.clone(), user)
    }

    pub fn remove(&mut self, username: &str) -> Option<User> {
        self.users.remove(username)
    }

    pub fn usernames(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<User> for UserTable {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        let mut table = UserTable::new();
        for user in iter {
            table.insert(user);
        }
        table
    }
}
