//! OpenAPI document for the read API, served at `/api/schema/`.

use crate::handlers::content;
use crate::transfer::{ArtistOut, BookOut, PostOut};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Ketebul content API", description = "Read-only artists, books and posts"),
    paths(
        content::list_artists,
        content::read_artist,
        content::list_books,
        content::read_book,
        content::list_posts,
        content::read_post,
    ),
    components(schemas(ArtistOut, BookOut, PostOut)),
    tags(
        (name = "artists", description = "Artist profiles"),
        (name = "books", description = "Published books"),
        (name = "posts", description = "News posts")
    )
)]
pub struct ApiDoc;
