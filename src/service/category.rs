//! Category CRUD over the record layer.

use crate::db::SharedConnection;
use crate::error::OrmError;
use crate::orm::{Collection, Entity, Model, Page, Record};
use crate::sql::{Row, Value};
use std::sync::Arc;

pub struct CategoryResource;

impl CategoryResource {
    fn query(conn: &SharedConnection, entity: &Arc<Entity>) -> Model {
        Model::new(conn.clone(), entity.clone())
    }

    /// Insert one category from validated input. Returns the stored row.
    pub async fn store(conn: &SharedConnection, entity: &Arc<Entity>, data: &Row) -> Result<Record, OrmError> {
        let record = Self::query(conn, entity).create(data).await?;
        tracing::info!(id = ?record.key(), "category created");
        Ok(record)
    }

    /// Update by id and reload. `None` when no row matched.
    pub async fn update(
        conn: &SharedConnection,
        entity: &Arc<Entity>,
        id: i64,
        data: &Row,
    ) -> Result<Option<Record>, OrmError> {
        let mut query = Self::query(conn, entity);
        let affected = query.where_eq(entity.primary_key_name(), id).update(data).await?;
        if affected == 0 {
            return Ok(None);
        }
        tracing::info!(id, "category updated");
        query.find(id).await
    }

    /// Delete by id. Returns the number of rows removed.
    pub async fn delete(conn: &SharedConnection, entity: &Arc<Entity>, id: i64) -> Result<u64, OrmError> {
        let affected = Self::query(conn, entity)
            .where_eq(entity.primary_key_name(), id)
            .delete()
            .await?;
        if affected > 0 {
            tracing::info!(id, "category deleted");
        }
        Ok(affected)
    }

    pub async fn get(conn: &SharedConnection, entity: &Arc<Entity>, id: i64) -> Result<Option<Record>, OrmError> {
        Self::query(conn, entity).find(Value::Integer(id)).await
    }

    /// Every category, oldest first.
    pub async fn get_all(conn: &SharedConnection, entity: &Arc<Entity>) -> Result<Collection, OrmError> {
        Self::query(conn, entity)
            .order_by_asc(entity.primary_key_name())
            .get()
            .await
    }

    pub async fn paginate(
        conn: &SharedConnection,
        entity: &Arc<Entity>,
        per_page: u64,
        page: u64,
    ) -> Result<Page, OrmError> {
        Self::query(conn, entity)
            .order_by_asc(entity.primary_key_name())
            .paginate(per_page, page)
            .await
    }
}
