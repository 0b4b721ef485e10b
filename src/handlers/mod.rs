//! HTTP handlers for the read API and the site-level routes.

pub mod content;
pub mod site;
pub use content::*;
pub use site::*;
