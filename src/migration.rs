//! Schema: table blueprints rendered per dialect and the ordered list of migrations.

use crate::db::Connection;
use crate::error::OrmError;
use crate::models::{Category, Courier};
use crate::sql::{quoted, Dialect, QueryBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ColumnKind {
    Id,
    Integer,
    String(u32),
    Text,
    Timestamp,
}

#[derive(Clone, Debug)]
struct ColumnDef {
    name: String,
    kind: ColumnKind,
    nullable: bool,
}

impl ColumnDef {
    fn render(&self, dialect: Dialect) -> String {
        let ty = match (self.kind, dialect) {
            (ColumnKind::Id, Dialect::Postgres) => return format!("{} BIGSERIAL PRIMARY KEY", quoted(&self.name)),
            (ColumnKind::Id, Dialect::Sqlite) => {
                return format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted(&self.name))
            }
            (ColumnKind::Integer, Dialect::Postgres) => "BIGINT".to_string(),
            (ColumnKind::Integer, Dialect::Sqlite) => "INTEGER".to_string(),
            (ColumnKind::String(n), _) => format!("VARCHAR({})", n),
            (ColumnKind::Text, _) => "TEXT".to_string(),
            (ColumnKind::Timestamp, Dialect::Postgres) => "TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP".to_string(),
            (ColumnKind::Timestamp, Dialect::Sqlite) => "TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP".to_string(),
        };
        let null = match (self.kind, self.nullable) {
            (ColumnKind::Timestamp, _) => "",
            (_, true) => " NULL",
            (_, false) => " NOT NULL",
        };
        format!("{} {}{}", quoted(&self.name), ty, null)
    }
}

/// One `CREATE TABLE IF NOT EXISTS`. Columns are NOT NULL unless marked `nullable()`.
#[derive(Clone, Debug)]
pub struct Blueprint {
    table: String,
    columns: Vec<ColumnDef>,
    primary: Vec<String>,
}

impl Blueprint {
    /// `table` is the fully qualified (prefixed) name.
    pub fn create(table: &str) -> Self {
        Blueprint {
            table: table.to_string(),
            columns: Vec::new(),
            primary: Vec::new(),
        }
    }

    fn column(mut self, name: &str, kind: ColumnKind) -> Self {
        self.columns.push(ColumnDef {
            name: name.to_string(),
            kind,
            nullable: false,
        });
        self
    }

    /// Auto-increment `id` primary key.
    pub fn id(self) -> Self {
        self.column("id", ColumnKind::Id)
    }

    pub fn integer(self, name: &str) -> Self {
        self.column(name, ColumnKind::Integer)
    }

    pub fn string(self, name: &str, length: u32) -> Self {
        self.column(name, ColumnKind::String(length))
    }

    pub fn text(self, name: &str) -> Self {
        self.column(name, ColumnKind::Text)
    }

    /// `created_at` and `updated_at`, both defaulting to the current time.
    pub fn timestamps(self) -> Self {
        self.column("created_at", ColumnKind::Timestamp)
            .column("updated_at", ColumnKind::Timestamp)
    }

    /// Marks the last added column as nullable.
    pub fn nullable(mut self) -> Self {
        if let Some(col) = self.columns.last_mut() {
            col.nullable = true;
        }
        self
    }

    /// Composite primary key.
    pub fn primary(mut self, columns: &[&str]) -> Self {
        self.primary = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut defs: Vec<String> = self.columns.iter().map(|c| c.render(dialect)).collect();
        if !self.primary.is_empty() {
            let cols: Vec<String> = self.primary.iter().map(|c| quoted(c)).collect();
            defs.push(format!("PRIMARY KEY ({})", cols.join(", ")));
        }
        format!("CREATE TABLE IF NOT EXISTS {} ({})", quoted(&self.table), defs.join(", "))
    }
}

/// A named schema step; `up` receives the table prefix.
pub struct Migration {
    pub name: &'static str,
    pub up: fn(&str) -> Blueprint,
}

fn create_menu_categories_table(prefix: &str) -> Blueprint {
    Blueprint::create(&format!("{}{}", prefix, Category::TABLE))
        .id()
        .integer("branch_id")
        .nullable()
        .string("name", 255)
        .text("description")
        .nullable()
        .timestamps()
}

fn create_couriers_table(prefix: &str) -> Blueprint {
    Blueprint::create(&format!("{}{}", prefix, Courier::TABLE))
        .id()
        .string("courier_name", 255)
        .string("api_endpoint", 255)
        .nullable()
        .string("api_key", 255)
        .nullable()
        .string("tracking_url", 255)
        .nullable()
        .string("status", 32)
        .nullable()
}

fn create_category_courier_table(prefix: &str) -> Blueprint {
    Blueprint::create(&format!("{}category_courier", prefix))
        .integer("category_id")
        .integer("courier_id")
        .primary(&["category_id", "courier_id"])
}

/// Applied in order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_menu_categories_table",
        up: create_menu_categories_table,
    },
    Migration {
        name: "create_couriers_table",
        up: create_couriers_table,
    },
    Migration {
        name: "create_category_courier_table",
        up: create_category_courier_table,
    },
];

/// Run every migration. Safe to call on every start: tables are only created if missing.
pub async fn apply_migrations(conn: &dyn Connection, prefix: &str) -> Result<(), OrmError> {
    let dialect = conn.dialect();
    for migration in MIGRATIONS {
        let blueprint = (migration.up)(prefix);
        conn.execute(&QueryBuf::raw(blueprint.to_sql(dialect))).await?;
        tracing::info!(migration = migration.name, table = blueprint.table(), "migration applied");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn categories_table_sqlite() {
        assert_eq!(
            create_menu_categories_table("wp_").to_sql(Dialect::Sqlite),
            "CREATE TABLE IF NOT EXISTS \"wp_ehxd_menu_categories\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \
             \"branch_id\" INTEGER NULL, \"name\" VARCHAR(255) NOT NULL, \"description\" TEXT NULL, \
             \"created_at\" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP, \"updated_at\" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP)"
        );
    }

    #[test]
    fn pivot_table_postgres() {
        assert_eq!(
            create_category_courier_table("wp_").to_sql(Dialect::Postgres),
            "CREATE TABLE IF NOT EXISTS \"wp_category_courier\" (\"category_id\" BIGINT NOT NULL, \
             \"courier_id\" BIGINT NOT NULL, PRIMARY KEY (\"category_id\", \"courier_id\"))"
        );
    }

    #[test]
    fn postgres_id_and_timestamps() {
        let sql = Blueprint::create("t").id().timestamps().to_sql(Dialect::Postgres);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"t\" (\"id\" BIGSERIAL PRIMARY KEY, \
             \"created_at\" TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP, \
             \"updated_at\" TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP)"
        );
    }
}
