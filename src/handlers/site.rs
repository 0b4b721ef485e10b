//! Site-level handlers: root redirect and the API index.

use crate::extractors::RequestOrigin;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};

/// Browsable collections listed by the API index, in display order.
pub const API_COLLECTIONS: &[&str] = &["artists", "books", "posts"];

/// `GET /`: 302 to the separate frontend.
pub async fn redirect_to_frontend(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.settings.frontend_url.to_string())],
    )
}

/// `GET /api/`: absolute URL of each collection.
pub async fn api_root(origin: RequestOrigin) -> Json<Value> {
    let mut map = Map::new();
    for name in API_COLLECTIONS {
        map.insert(
            (*name).to_string(),
            Value::String(origin.absolute(&format!("/api/{}/", name))),
        );
    }
    Json(Value::Object(map))
}
