//! Table metadata for one model: table name, primary key, mass-assignable fields and column casts.

use crate::case::{default_table_name, foreign_key_for};
use crate::error::OrmError;
use crate::sql::{ColumnType, Value};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Entity {
    name: String,
    table: String,
    table_prefix: String,
    primary_key: String,
    fillable: Vec<String>,
    casts: HashMap<String, ColumnType>,
    timestamps: bool,
}

impl Entity {
    /// Entity for model `name`. Table defaults to the snake_cased, pluralized name.
    pub fn new(name: &str) -> Self {
        Entity {
            name: name.to_string(),
            table: default_table_name(name),
            table_prefix: String::new(),
            primary_key: "id".to_string(),
            fillable: Vec::new(),
            casts: HashMap::new(),
            timestamps: false,
        }
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.table_prefix = prefix.to_string();
        self
    }

    pub fn primary_key(mut self, column: &str) -> Self {
        self.primary_key = column.to_string();
        self
    }

    pub fn fillable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for f in fields {
            let f = f.into();
            if !self.fillable.contains(&f) {
                self.fillable.push(f);
            }
        }
        self
    }

    pub fn cast(mut self, column: &str, ty: ColumnType) -> Self {
        self.casts.insert(column.to_string(), ty);
        self
    }

    /// Maintain `updated_at` on updates; `created_at`/`updated_at` are filled by column defaults on insert.
    pub fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    /// Validate and share.
    pub fn build(self) -> Result<Arc<Entity>, OrmError> {
        if self.table.trim().is_empty() {
            return Err(OrmError::InvalidEntity(format!("{}: table name is empty", self.name)));
        }
        if self.primary_key.trim().is_empty() {
            return Err(OrmError::InvalidEntity(format!("{}: primary key is empty", self.name)));
        }
        Ok(Arc::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// Prefixed table name as stored in the database.
    pub fn qualified_table(&self) -> String {
        format!("{}{}", self.table_prefix, self.table)
    }

    pub fn primary_key_name(&self) -> &str {
        &self.primary_key
    }

    pub fn fillable_fields(&self) -> &[String] {
        &self.fillable
    }

    pub fn is_fillable(&self, field: &str) -> bool {
        self.fillable.iter().any(|f| f == field)
    }

    pub fn cast_of(&self, column: &str) -> Option<ColumnType> {
        self.casts.get(column).copied()
    }

    pub fn cast_value(&self, column: &str, value: Value) -> Value {
        match self.cast_of(column) {
            Some(ty) => value.cast(ty),
            None => value,
        }
    }

    pub fn has_timestamps(&self) -> bool {
        self.timestamps
    }

    /// Conventional foreign key other tables use to point at this model.
    pub fn foreign_key(&self) -> String {
        foreign_key_for(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_naming_convention() {
        let e = Entity::new("Courier").prefix("wp_").build().unwrap();
        assert_eq!(e.qualified_table(), "wp_couriers");
        assert_eq!(e.primary_key_name(), "id");
        assert_eq!(e.foreign_key(), "courier_id");
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(Entity::new("").build(), Err(OrmError::InvalidEntity(_))));
        assert!(matches!(Entity::new("Category").table(" ").build(), Err(OrmError::InvalidEntity(_))));
    }

    #[test]
    fn fillable_is_deduplicated_and_casts_apply() {
        let e = Entity::new("Category")
            .fillable(["name", "name", "branch_id"])
            .cast("branch_id", ColumnType::Integer);
        assert_eq!(e.fillable_fields(), ["name".to_string(), "branch_id".to_string()]);
        assert_eq!(e.cast_value("branch_id", Value::from("4")), Value::Integer(4));
        assert_eq!(e.cast_value("name", Value::from("4")), Value::from("4"));
    }
}
