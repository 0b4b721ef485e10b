//! Read API route table. Each path answers with and without the trailing slash.

use crate::handlers::{
    api_root, list_artists, list_books, list_posts, read_artist, read_book, read_post,
};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

pub fn content_routes(state: AppState) -> Router {
    Router::new()
        .route("/api", get(api_root))
        .route("/api/", get(api_root))
        .route("/api/artists", get(list_artists))
        .route("/api/artists/", get(list_artists))
        .route("/api/artists/:id", get(read_artist))
        .route("/api/artists/:id/", get(read_artist))
        .route("/api/books", get(list_books))
        .route("/api/books/", get(list_books))
        .route("/api/books/:id", get(read_book))
        .route("/api/books/:id/", get(read_book))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/", get(list_posts))
        .route("/api/posts/:id", get(read_post))
        .route("/api/posts/:id/", get(read_post))
        .route("/api/schema/", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state)
}
