//! Comment templates evaluated against a live store.

use ctfweb::{CommentRenderer, RenderContext, constants::SSTI_FLAG};

use super::helpers::*;

async fn render_profile(store: &ctfweb::Store, viewer: &str, profile: &str) -> Vec<String> {
    let users = store.snapshot().await;
    let comments = store.get_profile(profile).await.unwrap().comments;
    let ctx = RenderContext {
        current_user: viewer,
        users: &users,
        secret_key: SSTI_FLAG,
    };
    CommentRenderer::new().render_all(&comments, &ctx)
}

#[tokio::test]
async fn test_stored_expression_leaks_secret() {
    let (store, _tokens) = setup_store_with_users(&[("mallory", "m"), ("bob", "b")]).await;
    store
        .add_comment(Some("mallory"), "bob", "flag: {{ secret_key }}")
        .await
        .unwrap();

    let rendered = render_profile(&store, "bob", "bob").await;
    assert_eq!(rendered, vec![format!("flag: {SSTI_FLAG}")]);
}

#[tokio::test]
async fn test_stored_expression_leaks_other_users_hashes() {
    let (store, _tokens) = setup_store_with_users(&[("mallory", "m"), ("bob", "b")]).await;
    store
        .add_comment(
            Some("mallory"),
            "bob",
            "{% for name, user in users|items %}{{ name }}={{ user.password_hash }} {% endfor %}",
        )
        .await
        .unwrap();

    let rendered = render_profile(&store, "mallory", "bob").await;
    let bob_hash = store.get_profile("bob").await.unwrap().password_hash;
    assert!(rendered[0].contains(&format!("bob={bob_hash}")));
    assert!(rendered[0].contains("mallory="));
}

#[tokio::test]
async fn test_rendering_follows_viewer_and_repeats() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "a"), ("bob", "b")]).await;
    store
        .add_comment(Some("alice"), "bob", "hello {{ current_user }}")
        .await
        .unwrap();
    store
        .add_comment(Some("alice"), "bob", "users: {{ users|length }}")
        .await
        .unwrap();

    assert_eq!(
        render_profile(&store, "bob", "bob").await,
        vec!["hello bob", "users: 2"]
    );

    // Not cached: a new user changes the next render
    store.register("carol", "c").await.unwrap();
    assert_eq!(
        render_profile(&store, "carol", "bob").await,
        vec!["hello carol", "users: 3"]
    );

    // Stored text itself is untouched
    let stored = store.get_profile("bob").await.unwrap().comments;
    assert_eq!(stored[0], "hello {{ current_user }}");
}

#[tokio::test]
async fn test_broken_comment_shows_raw_and_others_still_render() {
    let (store, _tokens) = setup_store_with_users(&[("alice", "a"), ("bob", "b")]).await;
    store
        .add_comment(Some("alice"), "bob", "{% if %}")
        .await
        .unwrap();
    store
        .add_comment(Some("alice"), "bob", "{{ 6 * 7 }}")
        .await
        .unwrap();

    assert_eq!(
        render_profile(&store, "bob", "bob").await,
        vec!["{% if %}", "42"]
    );
}
