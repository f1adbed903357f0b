//! Active-record layer: entities, records, query builder, collections and relations.

mod collection;
mod entity;
mod model;
mod record;
mod relations;

pub use collection::Collection;
pub use entity::Entity;
pub use model::{last_page, Model, Page};
pub use record::{Record, Related};
pub use relations::BelongsToMany;
