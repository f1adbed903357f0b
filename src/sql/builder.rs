//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE from an entity and accumulated query state.

use crate::error::OrmError;
use crate::orm::Entity;
use crate::sql::params::{ColumnType, Row, Value};
use std::fmt;
use std::str::FromStr;

/// SQL flavour of the connected database. Both use `$n` placeholders; Postgres adds type casts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    fn placeholder(self, n: usize, cast: Option<ColumnType>) -> String {
        match (self, cast) {
            (Dialect::Postgres, Some(ty)) => format!("${}::{}", n, ty.pg_cast()),
            _ => format!("${}", n),
        }
    }
}

/// Double-quoted identifier; embedded quotes are doubled.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Statement without parameters (DDL, probes).
    pub fn raw(sql: impl Into<String>) -> Self {
        QueryBuf {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Operator {
    fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
        }
    }
}

impl FromStr for Operator {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_uppercase().as_str() {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "LIKE" => Operator::Like,
            other => return Err(OrmError::InvalidOperator(other.to_string())),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(OrmError::InvalidDirection(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Compare {
        column: String,
        op: Operator,
        value: Value,
    },
    Between {
        column: String,
        low: Value,
        high: Value,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub connector: Connector,
    pub predicate: Predicate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// Filter, sort and window state accumulated by a query chain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryState {
    pub conditions: Vec<Condition>,
    pub orders: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryState {
    pub fn push(&mut self, connector: Connector, predicate: Predicate) {
        self.conditions.push(Condition { connector, predicate });
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }
}

fn predicate_sql(entity: &Entity, predicate: &Predicate, dialect: Dialect, q: &mut QueryBuf) -> String {
    match predicate {
        Predicate::Compare { column, op, value } => {
            let col = quoted(column);
            match (op, value) {
                (Operator::Eq, Value::Null) => format!("{} IS NULL", col),
                (Operator::Ne, Value::Null) => format!("{} IS NOT NULL", col),
                _ => {
                    let n = q.push_param(entity.cast_value(column, value.clone()));
                    let ph = dialect.placeholder(n, entity.cast_of(column));
                    format!("{} {} {}", col, op, ph)
                }
            }
        }
        Predicate::Between { column, low, high } => {
            let cast = entity.cast_of(column);
            let lo = q.push_param(entity.cast_value(column, low.clone()));
            let lo = dialect.placeholder(lo, cast);
            let hi = q.push_param(entity.cast_value(column, high.clone()));
            let hi = dialect.placeholder(hi, cast);
            format!("{} BETWEEN {} AND {}", quoted(column), lo, hi)
        }
    }
}

/// WHERE clause in insertion order. Each OR starts a new group of AND-joined predicates;
/// when there is more than one group, multi-predicate groups are parenthesized, so
/// `a AND b OR c` renders as `(a AND b) OR c`.
fn where_clause(entity: &Entity, state: &QueryState, dialect: Dialect, q: &mut QueryBuf) -> String {
    if state.conditions.is_empty() {
        return String::new();
    }
    let mut groups: Vec<Vec<String>> = Vec::new();
    for (i, cond) in state.conditions.iter().enumerate() {
        let sql = predicate_sql(entity, &cond.predicate, dialect, q);
        match groups.last_mut() {
            Some(group) if i > 0 && cond.connector == Connector::And => group.push(sql),
            _ => groups.push(vec![sql]),
        }
    }
    let grouped = groups.len() > 1;
    let parts: Vec<String> = groups
        .into_iter()
        .map(|g| {
            if grouped && g.len() > 1 {
                format!("({})", g.join(" AND "))
            } else {
                g.join(" AND ")
            }
        })
        .collect();
    format!(" WHERE {}", parts.join(" OR "))
}

fn order_clause(state: &QueryState) -> String {
    if state.orders.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = state
        .orders
        .iter()
        .map(|o| {
            let dir = match o.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("{} {}", quoted(&o.column), dir)
        })
        .collect();
    format!(" ORDER BY {}", parts.join(", "))
}

fn window_clause(state: &QueryState, dialect: Dialect) -> String {
    let mut out = String::new();
    match (state.limit, state.offset) {
        (Some(n), _) => out.push_str(&format!(" LIMIT {}", n)),
        (None, Some(_)) if dialect == Dialect::Sqlite => out.push_str(" LIMIT -1"),
        _ => {}
    }
    if let Some(m) = state.offset {
        out.push_str(&format!(" OFFSET {}", m));
    }
    out
}

/// SELECT * with WHERE, ORDER BY, LIMIT/OFFSET from state.
pub fn select(entity: &Entity, state: &QueryState, dialect: Dialect) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&entity.qualified_table());
    let where_sql = where_clause(entity, state, dialect, &mut q);
    q.sql = format!(
        "SELECT * FROM {}{}{}{}",
        table,
        where_sql,
        order_clause(state),
        window_clause(state, dialect)
    );
    q
}

/// SELECT COUNT(*) with the state's conditions; ordering and window are ignored.
pub fn count(entity: &Entity, state: &QueryState, dialect: Dialect) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&entity.qualified_table());
    let where_sql = where_clause(entity, state, dialect, &mut q);
    q.sql = format!("SELECT COUNT(*) AS {} FROM {}{}", quoted("aggregate"), table, where_sql);
    q
}

/// INSERT of the fillable attributes present, in fillable order. Returns the stored row.
pub fn insert(entity: &Entity, attributes: &Row, dialect: Dialect) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&entity.qualified_table());
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for name in entity.fillable_fields() {
        if name == entity.primary_key_name() {
            continue;
        }
        let Some(val) = attributes.get(name) else { continue };
        let n = q.push_param(entity.cast_value(name, val.clone()));
        cols.push(quoted(name));
        placeholders.push(dialect.placeholder(n, entity.cast_of(name)));
    }
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING *", table)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            table,
            cols.join(", "),
            placeholders.join(", ")
        )
    };
    q
}

/// UPDATE ... SET fillable fields from data WHERE state conditions.
/// Refuses to render without a condition so a table is never rewritten wholesale.
pub fn update(entity: &Entity, state: &QueryState, data: &Row, dialect: Dialect) -> Result<QueryBuf, OrmError> {
    if !state.has_conditions() {
        return Err(OrmError::MissingFilter);
    }
    let mut q = QueryBuf::new();
    let table = quoted(&entity.qualified_table());
    let mut sets = Vec::new();
    for name in entity.fillable_fields() {
        if name == entity.primary_key_name() {
            continue;
        }
        let Some(val) = data.get(name) else { continue };
        let n = q.push_param(entity.cast_value(name, val.clone()));
        sets.push(format!("{} = {}", quoted(name), dialect.placeholder(n, entity.cast_of(name))));
    }
    if entity.has_timestamps() && !entity.is_fillable("updated_at") {
        sets.push(format!("{} = CURRENT_TIMESTAMP", quoted("updated_at")));
    }
    if sets.is_empty() {
        return Err(OrmError::NothingToUpdate);
    }
    let where_sql = where_clause(entity, state, dialect, &mut q);
    q.sql = format!("UPDATE {} SET {}{}", table, sets.join(", "), where_sql);
    Ok(q)
}

/// DELETE FROM ... WHERE state conditions. Refuses to render without a condition.
pub fn delete(entity: &Entity, state: &QueryState, dialect: Dialect) -> Result<QueryBuf, OrmError> {
    if !state.has_conditions() {
        return Err(OrmError::MissingFilter);
    }
    let mut q = QueryBuf::new();
    let table = quoted(&entity.qualified_table());
    let where_sql = where_clause(entity, state, dialect, &mut q);
    q.sql = format!("DELETE FROM {}{}", table, where_sql);
    Ok(q)
}

/// SELECT related_key FROM pivot WHERE foreign_key = $1, used for many-to-many lookups.
pub fn select_pivot(pivot_table: &str, related_key: &str, foreign_key: &str, value: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(value.clone());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        quoted(related_key),
        quoted(pivot_table),
        quoted(foreign_key),
        n
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn categories() -> Entity {
        Entity::new("Category")
            .table("menu_categories")
            .prefix("wp_")
            .fillable(["branch_id", "name", "description"])
            .cast("id", ColumnType::Integer)
            .cast("branch_id", ColumnType::Integer)
    }

    fn eq(column: &str, value: impl Into<Value>) -> Predicate {
        Predicate::Compare {
            column: column.into(),
            op: Operator::Eq,
            value: value.into(),
        }
    }

    #[test]
    fn select_renders_clauses_in_order() {
        let e = categories();
        let mut state = QueryState::default();
        state.push(Connector::And, eq("name", "Drinks"));
        state.push(
            Connector::Or,
            Predicate::Compare {
                column: "branch_id".into(),
                op: Operator::Gt,
                value: Value::from("2"),
            },
        );
        state.orders.push(OrderBy {
            column: "name".into(),
            direction: Direction::Desc,
        });
        state.limit = Some(5);

        let q = select(&e, &state, Dialect::Sqlite);
        assert_eq!(
            q.sql,
            r#"SELECT * FROM "wp_menu_categories" WHERE "name" = $1 OR "branch_id" > $2 ORDER BY "name" DESC LIMIT 5"#
        );
        assert_eq!(q.params, vec![Value::from("Drinks"), Value::Integer(2)]);
    }

    #[test]
    fn mixed_and_or_groups_are_parenthesized() {
        let e = categories();
        let mut state = QueryState::default();
        state.push(Connector::And, eq("name", "A"));
        state.push(Connector::And, eq("branch_id", 1));
        state.push(Connector::Or, eq("name", "B"));
        let q = select(&e, &state, Dialect::Sqlite);
        assert_eq!(
            q.sql,
            r#"SELECT * FROM "wp_menu_categories" WHERE ("name" = $1 AND "branch_id" = $2) OR "name" = $3"#
        );
    }

    #[test]
    fn postgres_placeholders_carry_casts() {
        let e = categories();
        let mut state = QueryState::default();
        state.push(
            Connector::And,
            Predicate::Between {
                column: "id".into(),
                low: Value::Integer(1),
                high: Value::Integer(9),
            },
        );
        let q = select(&e, &state, Dialect::Postgres);
        assert_eq!(
            q.sql,
            r#"SELECT * FROM "wp_menu_categories" WHERE "id" BETWEEN $1::BIGINT AND $2::BIGINT"#
        );
    }

    #[test]
    fn null_equality_renders_is_null() {
        let e = categories();
        let mut state = QueryState::default();
        state.push(Connector::And, eq("branch_id", Value::Null));
        let q = count(&e, &state, Dialect::Sqlite);
        assert_eq!(
            q.sql,
            r#"SELECT COUNT(*) AS "aggregate" FROM "wp_menu_categories" WHERE "branch_id" IS NULL"#
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn offset_without_limit_on_sqlite() {
        let e = categories();
        let state = QueryState {
            offset: Some(10),
            ..Default::default()
        };
        let q = select(&e, &state, Dialect::Sqlite);
        assert_eq!(q.sql, r#"SELECT * FROM "wp_menu_categories" LIMIT -1 OFFSET 10"#);
    }

    #[test]
    fn insert_uses_fillable_fields_only() {
        let e = categories();
        let mut row = Row::new();
        row.insert("name".into(), Value::from("Drinks"));
        row.insert("secret".into(), Value::from("x"));
        row.insert("branch_id".into(), Value::from("1"));
        let q = insert(&e, &row, Dialect::Postgres);
        assert_eq!(
            q.sql,
            r#"INSERT INTO "wp_menu_categories" ("branch_id", "name") VALUES ($1::BIGINT, $2) RETURNING *"#
        );
        assert_eq!(q.params, vec![Value::Integer(1), Value::from("Drinks")]);
    }

    #[test]
    fn update_requires_condition() {
        let e = categories();
        let mut row = Row::new();
        row.insert("name".into(), Value::from("x"));
        let err = update(&e, &QueryState::default(), &row, Dialect::Sqlite).unwrap_err();
        assert!(matches!(err, OrmError::MissingFilter));
    }

    #[test]
    fn update_skips_primary_key_and_unknown_fields() {
        let e = categories().with_timestamps();
        let mut state = QueryState::default();
        state.push(Connector::And, eq("id", 3));
        let mut row = Row::new();
        row.insert("id".into(), Value::Integer(99));
        row.insert("description".into(), Value::from("Cold"));
        row.insert("owner".into(), Value::from("nobody"));
        let q = update(&e, &state, &row, Dialect::Sqlite).unwrap();
        assert_eq!(
            q.sql,
            r#"UPDATE "wp_menu_categories" SET "description" = $1, "updated_at" = CURRENT_TIMESTAMP WHERE "id" = $2"#
        );
        assert_eq!(q.params, vec![Value::from("Cold"), Value::Integer(3)]);
    }

    #[test]
    fn update_without_settable_fields_is_rejected() {
        let e = categories();
        let mut state = QueryState::default();
        state.push(Connector::And, eq("id", 3));
        let err = update(&e, &state, &Row::new(), Dialect::Sqlite).unwrap_err();
        assert!(matches!(err, OrmError::NothingToUpdate));
    }

    #[test]
    fn delete_requires_condition() {
        let e = categories();
        assert!(matches!(
            delete(&e, &QueryState::default(), Dialect::Sqlite),
            Err(OrmError::MissingFilter)
        ));
        let mut state = QueryState::default();
        state.push(Connector::And, eq("id", 3));
        let q = delete(&e, &state, Dialect::Sqlite).unwrap();
        assert_eq!(q.sql, r#"DELETE FROM "wp_menu_categories" WHERE "id" = $1"#);
    }

    #[test]
    fn operators_parse_from_text() {
        assert_eq!("<>".parse::<Operator>().unwrap(), Operator::Ne);
        assert_eq!("like".parse::<Operator>().unwrap(), Operator::Like);
        assert!("~".parse::<Operator>().is_err());
        assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Desc);
    }
}
