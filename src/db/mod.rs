//! Storage connection: one injected handle per process, shared by models, records and handlers.

mod postgres;
mod sqlite;

pub use postgres::{ensure_database_exists, PgConnection};
pub use sqlite::SqliteConnection;

use crate::error::OrmError;
use crate::sql::{Dialect, QueryBuf, Row};
use async_trait::async_trait;
use std::sync::Arc;

/// Executes rendered statements. Implementations log each statement at debug level.
#[async_trait]
pub trait Connection: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Run a statement that returns rows (SELECT, INSERT ... RETURNING).
    async fn fetch_all(&self, query: &QueryBuf) -> Result<Vec<Row>, sqlx::Error>;

    /// Run a statement and return the number of affected rows.
    async fn execute(&self, query: &QueryBuf) -> Result<u64, sqlx::Error>;

    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.fetch_all(&QueryBuf::raw("SELECT 1")).await.map(|_| ())
    }
}

pub type SharedConnection = Arc<dyn Connection>;

/// Open a pool for `database_url`: `postgres://` / `postgresql://` or `sqlite:`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SharedConnection, OrmError> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        ensure_database_exists(database_url).await?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!("connected to postgres");
        Ok(Arc::new(PgConnection::new(pool)))
    } else if database_url.starts_with("sqlite:") {
        let conn = SqliteConnection::connect(database_url, max_connections).await?;
        tracing::info!("connected to sqlite");
        Ok(Arc::new(conn))
    } else {
        Err(OrmError::UnsupportedDatabase(database_url.to_string()))
    }
}
