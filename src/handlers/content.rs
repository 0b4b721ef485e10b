//! Read-only handlers: list and detail for artists, books and posts.

use crate::error::AppError;
use crate::extractors::RequestOrigin;
use crate::state::AppState;
use crate::transfer::{ArtistOut, BookOut, PostOut};
use axum::{
    extract::{Path, State},
    Json,
};

/// Parse a path id. Anything that is not a base-10 integer is a bad request.
pub fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}

#[utoipa::path(
    get,
    path = "/api/artists/",
    tag = "artists",
    responses(
        (status = 200, description = "All artists", body = [ArtistOut]),
        (status = 400, description = "Host header not in ALLOWED_HOSTS")
    )
)]
pub async fn list_artists(
    State(state): State<AppState>,
    origin: RequestOrigin,
) -> Result<Json<Vec<ArtistOut>>, AppError> {
    let media_url = state.settings.media_url.as_str();
    let artists = state.store.list_artists().await?;
    Ok(Json(
        artists
            .into_iter()
            .map(|a| ArtistOut::from_record(a, &origin, media_url))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/artists/{id}/",
    tag = "artists",
    params(("id" = i64, Path, description = "Artist id")),
    responses(
        (status = 200, description = "One artist", body = ArtistOut),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No artist with this id")
    )
)]
pub async fn read_artist(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id_str): Path<String>,
) -> Result<Json<ArtistOut>, AppError> {
    let id = parse_id(&id_str)?;
    let artist = state
        .store
        .get_artist(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("artist {}", id)))?;
    Ok(Json(ArtistOut::from_record(artist, &origin, &state.settings.media_url)))
}

#[utoipa::path(
    get,
    path = "/api/books/",
    tag = "books",
    responses((status = 200, description = "All books", body = [BookOut]))
)]
pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookOut>>, AppError> {
    let books = state.store.list_books().await?;
    Ok(Json(books.into_iter().map(BookOut::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}/",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "One book", body = BookOut),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No book with this id")
    )
)]
pub async fn read_book(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<BookOut>, AppError> {
    let id = parse_id(&id_str)?;
    let book = state
        .store
        .get_book(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
    Ok(Json(book.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/",
    tag = "posts",
    responses((status = 200, description = "All posts, newest first", body = [PostOut]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostOut>>, AppError> {
    let posts = state.store.list_posts().await?;
    Ok(Json(posts.into_iter().map(PostOut::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "One post", body = PostOut),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No post with this id")
    )
)]
pub async fn read_post(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<PostOut>, AppError> {
    let id = parse_id(&id_str)?;
    let post = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {}", id)))?;
    Ok(Json(post.into()))
}
