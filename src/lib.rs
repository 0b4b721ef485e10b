//! Ketebul content API: read-only artists, books and posts over PostgreSQL.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod seed;
pub mod settings;
pub mod state;
pub mod store;
pub mod transfer;

pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use routes::app;
pub use settings::{Environment, Settings};
pub use state::AppState;
pub use store::{ensure_database_exists, ContentStore, Fixture, FixtureCounts, PgStore};
