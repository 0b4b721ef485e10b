//! Content store: the only seam between HTTP handlers and the database.

mod postgres;
pub use postgres::{ensure_database_exists, PgStore};
pub(crate) use postgres::quoted;

use crate::error::AppError;
use crate::models::{
    Artist, Book, ContactMessage, NewArtist, NewBook, NewContactMessage, NewPost, Post,
};
use async_trait::async_trait;

/// Records loaded together by `seed`; inserted in one transaction.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub artists: Vec<NewArtist>,
    #[serde(default)]
    pub books: Vec<NewBook>,
    #[serde(default)]
    pub posts: Vec<NewPost>,
    #[serde(default)]
    pub contact_messages: Vec<NewContactMessage>,
}

/// Counts of rows written by [`ContentStore::load_fixture`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixtureCounts {
    pub artists: usize,
    pub books: usize,
    pub posts: usize,
    pub contact_messages: usize,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Artists in ascending id order.
    async fn list_artists(&self) -> Result<Vec<Artist>, AppError>;
    async fn get_artist(&self, id: i64) -> Result<Option<Artist>, AppError>;

    /// Books in ascending id order.
    async fn list_books(&self) -> Result<Vec<Book>, AppError>;
    async fn get_book(&self, id: i64) -> Result<Option<Book>, AppError>;

    /// Posts newest first; equal timestamps keep ascending id order.
    async fn list_posts(&self) -> Result<Vec<Post>, AppError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// Insert every record of the fixture atomically.
    async fn load_fixture(&self, fixture: &Fixture) -> Result<FixtureCounts, AppError>;

    /// Contact messages are write-only through the API; this exists for operators.
    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, AppError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
