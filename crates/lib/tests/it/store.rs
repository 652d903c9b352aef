//! Store tests: registration, login, logout, comments and the backing file.

use ctfweb::{Store, crypto::hash_password};

use super::helpers::*;

// ===== REGISTRATION =====

#[tokio::test]
async fn test_register_creates_user_and_session() {
    let store = Store::in_memory();
    let token = store.register("alice", "pw").await.unwrap();

    assert_eq!(store.current_user(&token).await.as_deref(), Some("alice"));

    let profile = store.get_profile("alice").await.unwrap();
    assert_eq!(profile.password_hash, hash_password("pw"));
    assert!(profile.comments.is_empty());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "first")]).await;

    let err = store.register("alice", "second").await.unwrap_err();
    assert!(err.is_conflict());

    assert_eq!(store.user_count().await, 1);
    assert_eq!(store.sessions().session_count().await, 1);
    // Original password still works
    assert!(store.login("alice", "first").await.is_ok());
    assert!(store.login("alice", "second").await.is_err());
}

// ===== LOGIN / LOGOUT =====

#[tokio::test]
async fn test_login_returns_plaintext_credentials() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "hunter2")]).await;

    let grant = store.login("alice", "hunter2").await.unwrap();
    assert_eq!(grant.username, "alice");
    assert_eq!(grant.password, "hunter2");
    assert_eq!(
        store.current_user(&grant.token).await.as_deref(),
        Some("alice")
    );
}

#[tokio::test]
async fn test_wrong_password_creates_no_session() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "hunter2")]).await;
    let before = store.sessions().session_count().await;

    let err = store.login("alice", "wrong").await.unwrap_err();
    assert!(err.is_authentication_error());
    assert_eq!(store.sessions().session_count().await, before);
}

#[tokio::test]
async fn test_unknown_user_creates_no_session() {
    let store = Store::in_memory();
    assert!(store.login("ghost", "pw").await.is_err());
    assert_eq!(store.sessions().session_count().await, 0);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let (store, tokens) = setup_store_with_users(&[("alice", "pw")]).await;

    store.logout(&tokens[0]).await;
    assert_eq!(store.current_user(&tokens[0]).await, None);
    store.logout(&tokens[0]).await;
    store.logout("never-issued").await;
    assert_eq!(store.sessions().session_count().await, 0);
}

// ===== PROFILES AND COMMENTS =====

#[tokio::test]
async fn test_unknown_profile_is_not_found() {
    let store = Store::in_memory();
    assert!(store.get_profile("ghost").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_comments_append_in_order() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "a"), ("bob", "b")]).await;

    store.add_comment(Some("alice"), "bob", "one").await.unwrap();
    store.add_comment(Some("alice"), "bob", "two").await.unwrap();

    let bob = store.get_profile("bob").await.unwrap();
    assert_eq!(bob.comments, vec!["one", "two"]);
}

#[tokio::test]
async fn test_self_comment_is_rejected() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "a")]).await;

    let err = store
        .add_comment(Some("alice"), "alice", "me!")
        .await
        .unwrap_err();
    assert!(err.is_comment_rejected());
    assert!(store.get_profile("alice").await.unwrap().comments.is_empty());
}

#[tokio::test]
async fn test_unauthenticated_comment_is_rejected() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "a")]).await;

    let err = store.add_comment(None, "alice", "hi").await.unwrap_err();
    assert!(err.is_comment_rejected());
    assert!(store.get_profile("alice").await.unwrap().comments.is_empty());
}

#[tokio::test]
async fn test_comment_on_unknown_user_is_rejected() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "a")]).await;

    let err = store
        .add_comment(Some("alice"), "ghost", "hi")
        .await
        .unwrap_err();
    assert!(err.is_comment_rejected());
    assert_eq!(store.user_count().await, 1);
}

#[tokio::test]
async fn test_empty_comment_is_accepted_but_not_stored() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "a"), ("bob", "b")]).await;

    store.add_comment(Some("alice"), "bob", "").await.unwrap();
    assert!(store.get_profile("bob").await.unwrap().comments.is_empty());
}

// ===== PERSISTENCE =====

#[tokio::test]
async fn test_mutations_are_persisted() {
    let (store, _dir, path) = setup_file_store().await;
    store.register("alice", "a").await.unwrap();
    store.register("bob", "b").await.unwrap();
    store
        .add_comment(Some("alice"), "bob", "hello, \"bob\"\nsecond line")
        .await
        .unwrap();
    store
        .add_comment(Some("bob"), "alice", "{{ secret_key }}")
        .await
        .unwrap();

    let reopened = Store::open(&path).await.unwrap();
    assert_eq!(reopened.snapshot().await, store.snapshot().await);
    // Sessions are not persisted
    assert_eq!(reopened.sessions().session_count().await, 0);
    assert!(reopened.login("bob", "b").await.is_ok());
}

#[tokio::test]
async fn test_file_has_expected_header() {
    let (store, _dir, path) = setup_file_store().await;
    store.register("alice", "a").await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("username,password_hash,comments"));
    let row = lines.next().unwrap();
    assert!(row.starts_with(&format!("alice,{},", hash_password("a"))));
}

#[tokio::test]
async fn test_failed_duplicate_does_not_touch_file() {
    let (store, _dir, path) = setup_file_store().await;
    store.register("alice", "a").await.unwrap();
    let before = std::fs::read(&path).unwrap();

    assert!(store.register("alice", "other").await.is_err());
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_loads_file_written_elsewhere() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.csv");
    let hash = hash_password("pw");
    std::fs::write(
        &path,
        format!(
            "username,password_hash,comments\r\n\
             alice,{hash},\"[\"\"hi, there\"\"]\"\r\n\
             bob,{hash},broken\r\n"
        ),
    )
    .unwrap();

    let store = Store::open(&path).await.unwrap();
    assert_eq!(store.path(), Some(path.as_path()));
    assert!(Store::in_memory().path().is_none());
    assert_eq!(
        store.get_profile("alice").await.unwrap().comments,
        vec!["hi, there"]
    );
    assert!(store.get_profile("bob").await.unwrap().comments.is_empty());
    assert!(store.login("bob", "pw").await.is_ok());
}

#[tokio::test]
async fn test_failed_save_rolls_back_mutations() {
    let (store, dir, _path) = setup_file_store().await;
    store.register("alice", "a").await.unwrap();
    store.register("bob", "b").await.unwrap();

    // Removing the directory makes every later save fail
    drop(dir);

    let err = store.register("carol", "c").await.unwrap_err();
    assert!(err.is_io_error());
    assert_eq!(store.user_count().await, 2);
    assert_eq!(store.sessions().session_count().await, 2);

    let err = store
        .add_comment(Some("alice"), "bob", "lost")
        .await
        .unwrap_err();
    assert!(err.is_io_error());
    assert!(store.get_profile("bob").await.unwrap().comments.is_empty());
}
