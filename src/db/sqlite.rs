//! SQLite connection over a sqlx pool. `sqlite::memory:` is pinned to one connection so every
//! statement sees the same database.

use crate::db::Connection;
use crate::error::OrmError;
use crate::sql::{Dialect, QueryBuf, Row, Value};
use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;

#[derive(Clone)]
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteConnection { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, OrmError> {
        let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(opts)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(opts)
                .await?
        };
        Ok(SqliteConnection { pool })
    }

    /// Fresh private in-memory database.
    pub async fn memory() -> Result<Self, OrmError> {
        Self::connect("sqlite::memory:", 1).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Row>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(&q.sql, &q.params).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_values).collect()
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let result = bind_all(&q.sql, &q.params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn bind_all<'q>(sql: &'q str, params: &[Value]) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    let mut query = sqlx::query(sql);
    for p in params {
        query = match p {
            Value::Null => query.bind(None::<String>),
            Value::Integer(n) => query.bind(*n),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.clone()),
            Value::Blob(b) => query.bind(b.clone()),
        };
    }
    query
}

/// Decode by the runtime storage class of each cell.
fn row_to_values(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    use sqlx::{Column, Row as _, TypeInfo, ValueRef};
    let mut out = Row::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get::<i64, _>(idx)?),
                "REAL" => Value::Float(row.try_get::<f64, _>(idx)?),
                "BLOB" => Value::Blob(row.try_get::<Vec<u8>, _>(idx)?),
                _ => Value::Text(row.try_get::<String, _>(idx)?),
            }
        };
        out.insert(col.name().to_string(), value);
    }
    Ok(out)
}
