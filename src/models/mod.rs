//! Domain entities backed by the record layer.

mod category;
mod courier;

pub use category::Category;
pub use courier::Courier;
