//! Request extractors.

mod origin;
pub use origin::*;
