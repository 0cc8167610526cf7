//! HTTP handlers for entity listing, keyed lookup, and creation.

pub mod entity;
pub use entity::*;
