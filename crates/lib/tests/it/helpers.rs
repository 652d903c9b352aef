//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use ctfweb::{Store, TargetServer, session::SessionToken};
use tempfile::TempDir;

/// A store backed by a file in a fresh temporary directory.
///
/// Keep the `TempDir` alive for as long as the store is used.
pub async fn setup_file_store() -> (Store, TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("users.csv");
    let store = Store::open(&path).await.expect("Failed to open store");
    (store, dir, path)
}

/// An in-memory store with the given users registered.
///
/// Returns the store and one session token per user, in order.
pub async fn setup_store_with_users(users: &[(&str, &str)]) -> (Store, Vec<SessionToken>) {
    let store = Store::in_memory();
    let mut tokens = Vec::new();
    for (username, password) in users {
        let token = store
            .register(username, password)
            .await
            .expect("Failed to register user");
        tokens.push(token);
    }
    (store, tokens)
}

/// Start the SSRF target on a free loopback port.
pub async fn start_target() -> TargetServer {
    TargetServer::start("127.0.0.1:0".parse().unwrap())
        .await
        .expect("Failed to start target")
}
