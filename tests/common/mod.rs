//! Shared test fixtures: an in-memory ContentStore and router helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use ketebul_api::models::{Artist, Book, ContactMessage, Post};
use ketebul_api::{app, AppError, AppState, ContentStore, Fixture, FixtureCounts, Settings};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct Tables {
    artists: Vec<Artist>,
    books: Vec<Book>,
    posts: Vec<Post>,
    contact_messages: Vec<ContactMessage>,
    /// Ticks forward on every timestamped insert.
    clock: i64,
}

/// Store double with the same ordering rules as the Postgres store.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the database were down.
    pub fn failing() -> Self {
        MemoryStore {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail {
            Err(AppError::Db(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    pub fn add_artist(&self, name: &str, slug: &str, image: Option<&str>) -> i64 {
        let mut t = self.tables.lock().unwrap();
        let id = t.artists.len() as i64 + 1;
        t.artists.push(Artist {
            id,
            name: name.into(),
            bio: format!("{} biography", name),
            slug: slug.into(),
            image: image.map(String::from),
        });
        id
    }

    pub fn add_book(&self, title: &str, cover: &str, download_link: Option<&str>) -> i64 {
        let mut t = self.tables.lock().unwrap();
        let id = t.books.len() as i64 + 1;
        t.books.push(Book {
            id,
            title: title.into(),
            cover: cover.into(),
            description: format!("About {}", title),
            download_link: download_link.map(String::from),
        });
        id
    }

    /// Insert a post stamped with the next clock tick.
    pub fn add_post(&self, title: &str, content: &str) -> i64 {
        let at = {
            let mut t = self.tables.lock().unwrap();
            t.clock += 1;
            base_time() + Duration::seconds(t.clock)
        };
        self.add_post_at(title, content, at)
    }

    pub fn add_post_at(&self, title: &str, content: &str, created_at: DateTime<Utc>) -> i64 {
        let mut t = self.tables.lock().unwrap();
        let id = t.posts.len() as i64 + 1;
        t.posts.push(Post {
            id,
            title: title.into(),
            image: None,
            content: content.into(),
            created_at,
        });
        id
    }

    pub fn contact_message_count(&self) -> usize {
        self.tables.lock().unwrap().contact_messages.len()
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_artists(&self) -> Result<Vec<Artist>, AppError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().artists.clone())
    }

    async fn get_artist(&self, id: i64) -> Result<Option<Artist>, AppError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().artists.iter().find(|a| a.id == id).cloned())
    }

    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().books.clone())
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, AppError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().books.iter().find(|b| b.id == id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        self.check()?;
        let mut posts = self.tables.lock().unwrap().posts.clone();
        // Stable sort over ascending ids.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn load_fixture(&self, fixture: &Fixture) -> Result<FixtureCounts, AppError> {
        self.check()?;
        {
            let t = self.tables.lock().unwrap();
            if let Some(dup) = fixture
                .artists
                .iter()
                .find(|a| t.artists.iter().any(|e| e.slug == a.slug))
            {
                return Err(AppError::Validation(format!("slug '{}' already exists", dup.slug)));
            }
        }
        for a in &fixture.artists {
            self.add_artist(&a.name, &a.slug, a.image.as_deref());
        }
        for b in &fixture.books {
            self.add_book(&b.title, &b.cover, b.download_link.as_deref());
        }
        for p in &fixture.posts {
            self.add_post(&p.title, &p.content);
        }
        let mut t = self.tables.lock().unwrap();
        for m in &fixture.contact_messages {
            t.clock += 1;
            let id = t.contact_messages.len() as i64 + 1;
            let timestamp = base_time() + Duration::seconds(t.clock);
            t.contact_messages.push(ContactMessage {
                id,
                name: m.name.clone(),
                email: m.email.clone(),
                message: m.message.clone(),
                timestamp,
            });
        }
        Ok(FixtureCounts {
            artists: fixture.artists.len(),
            books: fixture.books.len(),
            posts: fixture.posts.len(),
            contact_messages: fixture.contact_messages.len(),
        })
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, AppError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().contact_messages.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }
}

pub fn test_app(store: Arc<MemoryStore>, settings: Settings) -> Router {
    app(AppState::new(store, settings))
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("host", "testserver")
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
