//! Fixture seeding through the store trait.

mod common;

use common::{body_json, get, test_app, MemoryStore};
use ketebul_api::seed::{read_fixture, seed};
use ketebul_api::{AppError, Fixture, Settings};
use std::sync::Arc;

fn fixture(value: serde_json::Value) -> Fixture {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn seeded_records_are_readable() {
    let store = Arc::new(MemoryStore::new());
    let counts = seed(
        store.as_ref(),
        &fixture(serde_json::json!({
            "artists": [{"name": "Jane Doe", "slug": "jane-doe"}],
            "posts": [
                {"title": "A", "content": "first"},
                {"title": "B", "content": "second"}
            ],
            "contact_messages": [{"name": "Sam", "email": "sam@example.org", "message": "Hi"}]
        })),
    )
    .await
    .unwrap();
    assert_eq!(counts.artists, 1);
    assert_eq!(counts.posts, 2);
    assert_eq!(store.contact_message_count(), 1);

    let app = test_app(store, Settings::default());
    let posts = body_json(get(&app, "/api/posts/").await).await;
    assert_eq!(posts[0]["title"], "B");
    assert_eq!(posts[1]["title"], "A");
}

#[tokio::test]
async fn invalid_fixture_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let err = seed(
        store.as_ref(),
        &fixture(serde_json::json!({
            "artists": [{"name": "Jane", "slug": "ok"}],
            "contact_messages": [{"name": "Sam", "email": "not-an-email", "message": "Hi"}]
        })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(store.contact_message_count(), 0);

    let app = test_app(store, Settings::default());
    assert_eq!(body_json(get(&app, "/api/artists/").await).await, serde_json::json!([]));
}

#[tokio::test]
async fn existing_slug_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    store.add_artist("Jane Doe", "jane-doe", None);
    let err = seed(
        store.as_ref(),
        &fixture(serde_json::json!({"artists": [{"name": "Other", "slug": "jane-doe"}]})),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn fixture_file_is_parsed() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("fixture.json");
    std::fs::write(
        &path,
        r#"{"books": [{"title": "Songs", "cover": "books/songs.jpg"}]}"#,
    )
    .unwrap();
    let parsed = read_fixture(&path).await.unwrap();
    assert_eq!(parsed.books.len(), 1);
    assert!(parsed.artists.is_empty());

    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(read_fixture(&path).await, Err(AppError::Validation(_))));
}
