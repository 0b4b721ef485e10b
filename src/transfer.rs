//! JSON shapes returned by the read API, built from stored records.

use crate::extractors::RequestOrigin;
use crate::models::{Artist, Book, Post};
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ArtistOut {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// Absolute URL of the artist image, or null.
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct BookOut {
    pub id: i64,
    pub title: String,
    pub cover: String,
    pub description: String,
    pub download_link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct PostOut {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ArtistOut {
    pub fn from_record(artist: Artist, origin: &RequestOrigin, media_url: &str) -> Self {
        let image = artist
            .image
            .as_deref()
            .and_then(|path| media_absolute_url(origin, media_url, path));
        ArtistOut {
            id: artist.id,
            name: artist.name,
            slug: artist.slug,
            image,
        }
    }
}

impl From<Book> for BookOut {
    fn from(book: Book) -> Self {
        BookOut {
            id: book.id,
            title: book.title,
            cover: book.cover,
            description: book.description,
            download_link: book.download_link,
        }
    }
}

impl From<Post> for PostOut {
    fn from(post: Post) -> Self {
        PostOut {
            id: post.id,
            title: post.title,
            image: post.image.filter(|p| !p.is_empty()),
            content: post.content,
            created_at: post.created_at,
        }
    }
}

/// Resolve a stored media path to `{scheme}://{host}{media_url}{path}`.
/// Blank paths yield `None`; values that already carry an http(s) scheme pass through.
/// Each path segment is percent-encoded.
pub fn media_absolute_url(origin: &RequestOrigin, media_url: &str, path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    if Url::parse(path).is_ok_and(|u| matches!(u.scheme(), "http" | "https")) {
        return Some(path.to_string());
    }
    let mut url = match Url::parse(&origin.absolute("/")) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(host = %origin.host, error = %e, "cannot build media URL");
            return None;
        }
    };
    url.path_segments_mut()
        .ok()?
        .clear()
        .extend(media_url.split('/').filter(|s| !s.is_empty()))
        .extend(path.split('/').filter(|s| !s.is_empty()));
    Some(url.into())
}
