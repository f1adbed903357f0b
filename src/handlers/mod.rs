//! HTTP handlers for the category endpoints.

pub mod category;
pub use category::*;
