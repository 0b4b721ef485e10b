//! Route tables and the assembled application router.

pub mod common;
pub mod content;
pub mod site;
pub use common::common_routes;
pub use content::content_routes;
pub use site::{site_routes, with_media};

use crate::error::AppError;
use crate::state::AppState;
use axum::{http::Uri, Router};
use tower_http::trace::TraceLayer;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Full application: site routes, read API, probes, media (non-production) and request tracing.
pub fn app(state: AppState) -> Router {
    let settings = state.settings.clone();
    let router = Router::new()
        .merge(site_routes(state.clone()))
        .merge(content_routes(state.clone()))
        .merge(common_routes(state))
        .fallback(not_found);
    with_media(router, &settings).layer(TraceLayer::new_for_http())
}
