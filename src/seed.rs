//! Fixture loading for `seed`: field validation mirroring the column constraints.

use crate::error::{AppError, ConfigError};
use crate::models::{
    NewArtist, NewBook, NewContactMessage, NewPost, ARTIST_NAME_MAX, CONTACT_NAME_MAX, EMAIL_MAX,
    MEDIA_PATH_MAX, SLUG_MAX, TITLE_MAX, URL_MAX,
};
use crate::settings::parse_http_url;
use crate::store::{ContentStore, Fixture, FixtureCounts};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

pub struct FixtureValidator {
    slug: Regex,
    email: Regex,
}

impl FixtureValidator {
    pub fn new() -> Result<Self, AppError> {
        let compile = |p: &str| {
            Regex::new(p).map_err(|e| AppError::Validation(format!("invalid pattern: {}", e)))
        };
        Ok(FixtureValidator {
            slug: compile(r"^[-a-zA-Z0-9_]+$")?,
            email: compile(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")?,
        })
    }

    /// Validate every record; the first failure names its collection and position.
    pub fn validate(&self, fixture: &Fixture) -> Result<(), AppError> {
        let mut slugs = HashSet::new();
        for (i, a) in fixture.artists.iter().enumerate() {
            self.artist(a).map_err(|e| at("artists", i, e))?;
            if !slugs.insert(a.slug.as_str()) {
                return Err(at("artists", i, format!("duplicate slug '{}'", a.slug)));
            }
        }
        for (i, b) in fixture.books.iter().enumerate() {
            self.book(b).map_err(|e| at("books", i, e))?;
        }
        for (i, p) in fixture.posts.iter().enumerate() {
            self.post(p).map_err(|e| at("posts", i, e))?;
        }
        for (i, m) in fixture.contact_messages.iter().enumerate() {
            self.contact_message(m).map_err(|e| at("contact_messages", i, e))?;
        }
        Ok(())
    }

    fn artist(&self, a: &NewArtist) -> Result<(), String> {
        required("name", &a.name)?;
        max_len("name", &a.name, ARTIST_NAME_MAX)?;
        required("slug", &a.slug)?;
        max_len("slug", &a.slug, SLUG_MAX)?;
        if !self.slug.is_match(&a.slug) {
            return Err("slug may only contain letters, numbers, underscores or hyphens".into());
        }
        if let Some(image) = &a.image {
            max_len("image", image, MEDIA_PATH_MAX)?;
        }
        Ok(())
    }

    fn book(&self, b: &NewBook) -> Result<(), String> {
        required("title", &b.title)?;
        max_len("title", &b.title, TITLE_MAX)?;
        required("cover", &b.cover)?;
        max_len("cover", &b.cover, MEDIA_PATH_MAX)?;
        if let Some(link) = b.download_link.as_deref().filter(|l| !l.is_empty()) {
            max_len("download_link", link, URL_MAX)?;
            if parse_http_url(link).is_none() {
                return Err("download_link must be an http(s) URL".into());
            }
        }
        Ok(())
    }

    fn post(&self, p: &NewPost) -> Result<(), String> {
        required("title", &p.title)?;
        max_len("title", &p.title, TITLE_MAX)?;
        required("content", &p.content)?;
        if let Some(image) = &p.image {
            max_len("image", image, MEDIA_PATH_MAX)?;
        }
        Ok(())
    }

    fn contact_message(&self, m: &NewContactMessage) -> Result<(), String> {
        required("name", &m.name)?;
        max_len("name", &m.name, CONTACT_NAME_MAX)?;
        max_len("email", &m.email, EMAIL_MAX)?;
        if !self.email.is_match(&m.email) {
            return Err("email must be a valid email".into());
        }
        required("message", &m.message)
    }
}

fn at(collection: &str, index: usize, reason: String) -> AppError {
    AppError::Validation(format!("{}[{}]: {}", collection, index, reason))
}

fn required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(())
    }
}

/// Column limits count characters, not bytes.
fn max_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!("{} must be at most {} characters", field, max))
    } else {
        Ok(())
    }
}

/// Parse a fixture file.
pub async fn read_fixture(path: &Path) -> Result<Fixture, AppError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Validation(format!("{}: {}", path.display(), e)))
}

/// Validate then insert a fixture. Nothing is written when validation fails.
pub async fn seed(store: &dyn ContentStore, fixture: &Fixture) -> Result<FixtureCounts, AppError> {
    FixtureValidator::new()?.validate(fixture)?;
    let counts = store.load_fixture(fixture).await?;
    tracing::info!(
        artists = counts.artists,
        books = counts.books,
        posts = counts.posts,
        contact_messages = counts.contact_messages,
        "fixture loaded"
    );
    Ok(counts)
}
