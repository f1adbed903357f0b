//! Lazy relationship loading by foreign-key convention.

use crate::case::pivot_table_for;
use crate::error::OrmError;
use crate::orm::{Collection, Entity, Model, Record};
use crate::sql::{self, Value};
use std::sync::Arc;

/// Overrides for a many-to-many lookup. Unset fields follow naming conventions.
#[derive(Clone, Debug, Default)]
pub struct BelongsToMany {
    pub pivot_table: Option<String>,
    pub foreign_pivot_key: Option<String>,
    pub related_pivot_key: Option<String>,
    pub parent_key: Option<String>,
    pub related_key: Option<String>,
}

impl BelongsToMany {
    pub fn pivot_table(mut self, table: &str) -> Self {
        self.pivot_table = Some(table.to_string());
        self
    }

    pub fn foreign_pivot_key(mut self, column: &str) -> Self {
        self.foreign_pivot_key = Some(column.to_string());
        self
    }

    pub fn related_pivot_key(mut self, column: &str) -> Self {
        self.related_pivot_key = Some(column.to_string());
        self
    }

    pub fn parent_key(mut self, column: &str) -> Self {
        self.parent_key = Some(column.to_string());
        self
    }

    pub fn related_key(mut self, column: &str) -> Self {
        self.related_key = Some(column.to_string());
        self
    }
}

impl Record {
    fn local_value(&self, local_key: Option<&str>) -> Option<Value> {
        let key = local_key.unwrap_or(self.entity().primary_key_name());
        self.get(key).filter(|v| !v.is_null()).cloned()
    }

    fn related_query(&self, related: &Arc<Entity>) -> Model {
        Model::new(self.connection().clone(), related.clone())
    }

    /// First `related` row whose `foreign_key` equals this record's `local_key`
    /// (default: `<this model>_id` against the primary key).
    pub async fn has_one(
        &self,
        related: &Arc<Entity>,
        foreign_key: Option<&str>,
        local_key: Option<&str>,
    ) -> Result<Option<Record>, OrmError> {
        let Some(value) = self.local_value(local_key) else {
            return Ok(None);
        };
        let fk = foreign_key.map(str::to_string).unwrap_or_else(|| self.entity().foreign_key());
        let mut query = self.related_query(related);
        query.where_eq(&fk, value);
        query.first().await
    }

    /// All `related` rows pointing at this record; empty when the local key is unset.
    pub async fn has_many(
        &self,
        related: &Arc<Entity>,
        foreign_key: Option<&str>,
        local_key: Option<&str>,
    ) -> Result<Collection, OrmError> {
        let Some(value) = self.local_value(local_key) else {
            return Ok(Collection::default());
        };
        let fk = foreign_key.map(str::to_string).unwrap_or_else(|| self.entity().foreign_key());
        let mut query = self.related_query(related);
        query.where_eq(&fk, value);
        query.get().await
    }

    /// Related rows through a pivot table: one query for the related ids, then one lookup per id.
    /// Ids whose row has disappeared in between are skipped. Cost is 1 + N round trips.
    pub async fn belongs_to_many(&self, related: &Arc<Entity>, opts: BelongsToMany) -> Result<Collection, OrmError> {
        let Some(value) = self.local_value(opts.parent_key.as_deref()) else {
            return Ok(Collection::default());
        };
        let pivot = opts.pivot_table.unwrap_or_else(|| {
            format!(
                "{}{}",
                self.entity().table_prefix(),
                pivot_table_for(self.entity().name(), related.name())
            )
        });
        let foreign_pivot_key = opts.foreign_pivot_key.unwrap_or_else(|| self.entity().foreign_key());
        let related_pivot_key = opts.related_pivot_key.unwrap_or_else(|| related.foreign_key());
        let related_key = opts
            .related_key
            .unwrap_or_else(|| related.primary_key_name().to_string());

        let q = sql::select_pivot(&pivot, &related_pivot_key, &foreign_pivot_key, &value);
        let pivot_rows = self.connection().fetch_all(&q).await?;

        let mut out = Collection::default();
        for row in pivot_rows {
            let Some(id) = row.get(&related_pivot_key).filter(|v| !v.is_null()).cloned() else {
                continue;
            };
            let mut query = self.related_query(related);
            query.where_eq(&related_key, id);
            if let Some(record) = query.first().await? {
                out.push(record);
            }
        }
        Ok(out)
    }
}
