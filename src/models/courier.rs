use crate::error::OrmError;
use crate::orm::Entity;
use std::sync::Arc;

/// Shipping courier; the related side of a category's products.
pub struct Courier;

impl Courier {
    pub const TABLE: &'static str = "wc_couriers";

    pub fn entity(prefix: &str) -> Result<Arc<Entity>, OrmError> {
        Entity::new("Courier")
            .table(Self::TABLE)
            .prefix(prefix)
            .fillable(["courier_name", "api_endpoint", "api_key", "tracking_url", "status"])
            .build()
    }
}
