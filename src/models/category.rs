//! Menu category.

use crate::error::OrmError;
use crate::models::Courier;
use crate::orm::{BelongsToMany, Collection, Entity, Record};
use crate::sql::{ColumnType, Value};
use serde::Serialize;
use std::sync::Arc;

/// Typed view over a category record. Serializes as the underlying record.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct Category(Record);

impl Category {
    pub const TABLE: &'static str = "ehxd_menu_categories";

    pub fn entity(prefix: &str) -> Result<Arc<Entity>, OrmError> {
        Entity::new("Category")
            .table(Self::TABLE)
            .prefix(prefix)
            .fillable(["branch_id", "name", "description"])
            .cast("branch_id", ColumnType::Integer)
            .with_timestamps()
            .build()
    }

    pub fn id(&self) -> Option<i64> {
        self.0.key().and_then(Value::as_i64)
    }

    pub fn branch_id(&self) -> Option<i64> {
        self.0.get("branch_id").and_then(Value::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    pub fn record(&self) -> &Record {
        &self.0
    }

    pub fn into_record(self) -> Record {
        self.0
    }

    /// Couriers linked through the `category_courier` pivot.
    pub async fn products(&self) -> Result<Collection, OrmError> {
        let couriers = Courier::entity(self.0.entity().table_prefix())?;
        self.0.belongs_to_many(&couriers, BelongsToMany::default()).await
    }
}

impl From<Record> for Category {
    fn from(record: Record) -> Self {
        Category(record)
    }
}
