//! Shared application state for all routes.

use crate::db::SharedConnection;
use crate::error::OrmError;
use crate::models::Category;
use crate::orm::Entity;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub conn: SharedConnection,
    /// Category table metadata, resolved once with the configured prefix.
    pub categories: Arc<Entity>,
}

impl AppState {
    pub fn new(conn: SharedConnection, table_prefix: &str) -> Result<Self, OrmError> {
        Ok(AppState {
            conn,
            categories: Category::entity(table_prefix)?,
        })
    }
}
