//! Stored record shapes, one per content table.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Column length limits shared by the DDL and fixture validation.
pub const ARTIST_NAME_MAX: usize = 255;
pub const SLUG_MAX: usize = 50;
pub const TITLE_MAX: usize = 200;
pub const CONTACT_NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 254;
pub const MEDIA_PATH_MAX: usize = 100;
pub const URL_MAX: usize = 200;

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub bio: String,
    pub slug: String,
    /// Relative path under the media root, e.g. `artists/jane.jpg`.
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub cover: String,
    pub description: String,
    pub download_link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewArtist {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub cover: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub download_link: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub content: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}
