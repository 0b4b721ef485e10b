//! Root redirect and development-only media serving.

use crate::handlers::redirect_to_frontend;
use crate::settings::Settings;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::services::ServeDir;

pub fn site_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(redirect_to_frontend))
        .with_state(state)
}

/// Mount `MEDIA_ROOT` under `MEDIA_URL` unless running in production.
pub fn with_media(router: Router, settings: &Settings) -> Router {
    if !settings.environment.serves_media() {
        return router;
    }
    tracing::info!(
        root = %settings.media_root.display(),
        url = %settings.media_url,
        "serving media files"
    );
    // Settings refuse `/` and router-owned prefixes, so this never conflicts.
    let prefix = settings.media_url.trim_end_matches('/');
    router.nest_service(prefix, ServeDir::new(&settings.media_root))
}
