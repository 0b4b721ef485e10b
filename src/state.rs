//! Shared application state for all routes. Immutable after startup.

use crate::settings::Settings;
use crate::store::ContentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, settings: Settings) -> Self {
        AppState {
            store,
            settings: Arc::new(settings),
        }
    }
}
