#![allow(dead_code)]

use async_trait::async_trait;
use restaurant_manager::db::{Connection, SharedConnection, SqliteConnection};
use restaurant_manager::sql::{Dialect, QueryBuf, Row, Value};
use restaurant_manager::{apply_migrations, AppState};
use std::sync::{Arc, Mutex};

pub const PREFIX: &str = "wp_";

/// Private in-memory database with every migration applied.
pub async fn database() -> SharedConnection {
    let conn: SharedConnection = Arc::new(SqliteConnection::memory().await.unwrap());
    apply_migrations(conn.as_ref(), PREFIX).await.unwrap();
    conn
}

pub async fn state() -> AppState {
    AppState::new(database().await, PREFIX).unwrap()
}

pub fn row(pairs: &[(&str, Value)]) -> Row {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Records every statement and returns nothing.
#[derive(Default)]
pub struct Recording {
    pub statements: Mutex<Vec<String>>,
}

impl Recording {
    pub fn issued(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for Recording {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn fetch_all(&self, query: &QueryBuf) -> Result<Vec<Row>, sqlx::Error> {
        self.statements.lock().unwrap().push(query.sql.clone());
        Ok(Vec::new())
    }

    async fn execute(&self, query: &QueryBuf) -> Result<u64, sqlx::Error> {
        self.statements.lock().unwrap().push(query.sql.clone());
        Ok(0)
    }
}
