//! Query builder bound to one entity and connection. Filter, sort and limit state accumulates
//! across chained calls and is consumed by exactly one terminal operation.

use crate::db::SharedConnection;
use crate::error::OrmError;
use crate::orm::{Collection, Entity, Record};
use crate::sql::{self, Connector, Direction, Operator, OrderBy, Predicate, QueryBuf, QueryState, Row, Value};
use serde::Serialize;
use std::sync::Arc;

/// One window of a paginated query.
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    pub data: Collection,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
}

/// Number of pages needed for `total` rows; 0 when there are no rows.
pub fn last_page(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page.max(1))
}

/// Not safe to share between callers composing different queries: state is per instance.
pub struct Model {
    conn: SharedConnection,
    entity: Arc<Entity>,
    state: QueryState,
}

impl Model {
    pub fn new(conn: SharedConnection, entity: Arc<Entity>) -> Self {
        Model {
            conn,
            entity,
            state: QueryState::default(),
        }
    }

    pub fn entity(&self) -> &Arc<Entity> {
        &self.entity
    }

    /// Empty record on this model's table.
    pub fn make(&self) -> Record {
        Record::new(self.conn.clone(), self.entity.clone())
    }

    /// `column = value`, AND-joined.
    pub fn where_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.and_where(column, Operator::Eq, value)
    }

    pub fn and_where(&mut self, column: &str, op: Operator, value: impl Into<Value>) -> &mut Self {
        self.state.push(Connector::And, compare(column, op, value.into()));
        self
    }

    /// OR-joined predicate; the first condition of a chain is plain regardless.
    /// Each OR starts a new AND-group: `a AND b OR c` renders as `(a AND b) OR c`.
    pub fn or_where(&mut self, column: &str, op: Operator, value: impl Into<Value>) -> &mut Self {
        let connector = if self.state.has_conditions() {
            Connector::Or
        } else {
            Connector::And
        };
        self.state.push(connector, compare(column, op, value.into()));
        self
    }

    pub fn or_where_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.or_where(column, Operator::Eq, value)
    }

    /// `column BETWEEN low AND high`; `range` must hold exactly two values.
    pub fn where_between(&mut self, column: &str, range: &[Value]) -> Result<&mut Self, OrmError> {
        let [low, high] = range else {
            return Err(OrmError::InvalidRange(range.len()));
        };
        self.state.push(
            Connector::And,
            Predicate::Between {
                column: column.to_string(),
                low: low.clone(),
                high: high.clone(),
            },
        );
        Ok(self)
    }

    pub fn order_by(&mut self, column: &str, direction: Direction) -> &mut Self {
        self.state.orders.push(OrderBy {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn order_by_asc(&mut self, column: &str) -> &mut Self {
        self.order_by(column, Direction::Asc)
    }

    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.state.limit = Some(n);
        self
    }

    pub fn has_conditions(&self) -> bool {
        self.state.has_conditions()
    }

    /// SELECT the current state would run, without consuming it.
    pub fn to_sql(&self) -> QueryBuf {
        sql::select(&self.entity, &self.state, self.conn.dialect())
    }

    fn take_state(&mut self) -> QueryState {
        std::mem::take(&mut self.state)
    }

    fn hydrate(&self, rows: Vec<Row>) -> Collection {
        rows.into_iter()
            .map(|row| Record::from_row(self.conn.clone(), self.entity.clone(), row))
            .collect()
    }

    pub async fn get(&mut self) -> Result<Collection, OrmError> {
        let state = self.take_state();
        let q = sql::select(&self.entity, &state, self.conn.dialect());
        let rows = self.conn.fetch_all(&q).await?;
        Ok(self.hydrate(rows))
    }

    pub async fn first(&mut self) -> Result<Option<Record>, OrmError> {
        self.state.limit = Some(1);
        Ok(self.get().await?.into_iter().next())
    }

    /// `where(primary_key, id).first()`.
    pub async fn find(&mut self, id: impl Into<Value>) -> Result<Option<Record>, OrmError> {
        let pk = self.entity.primary_key_name().to_string();
        self.where_eq(&pk, id);
        self.first().await
    }

    /// Every row, ignoring any accumulated filters.
    pub async fn all(&mut self) -> Result<Collection, OrmError> {
        self.state = QueryState::default();
        self.get().await
    }

    pub async fn count(&mut self) -> Result<u64, OrmError> {
        let state = self.take_state();
        let q = sql::count(&self.entity, &state, self.conn.dialect());
        self.fetch_count(&q).await
    }

    async fn fetch_count(&self, q: &QueryBuf) -> Result<u64, OrmError> {
        let rows = self.conn.fetch_all(q).await?;
        let total = rows
            .first()
            .and_then(|r| r.get("aggregate"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(u64::try_from(total).unwrap_or(0))
    }

    /// UPDATE fillable fields of `data` on matching rows. Requires at least one condition.
    pub async fn update(&mut self, data: &Row) -> Result<u64, OrmError> {
        let state = self.take_state();
        let q = sql::update(&self.entity, &state, data, self.conn.dialect())?;
        Ok(self.conn.execute(&q).await?)
    }

    /// DELETE matching rows. Requires at least one condition.
    pub async fn delete(&mut self) -> Result<u64, OrmError> {
        let state = self.take_state();
        let q = sql::delete(&self.entity, &state, self.conn.dialect())?;
        Ok(self.conn.execute(&q).await?)
    }

    /// Window of `per_page` rows starting at 1-based `page`, plus the total count.
    /// Zero values for either argument are treated as 1.
    pub async fn paginate(&mut self, per_page: u64, page: u64) -> Result<Page, OrmError> {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let state = self.take_state();
        let dialect = self.conn.dialect();

        let total = self.fetch_count(&sql::count(&self.entity, &state, dialect)).await?;

        let mut window = state;
        window.limit = Some(per_page);
        window.offset = Some((page - 1).saturating_mul(per_page));
        let rows = self.conn.fetch_all(&sql::select(&self.entity, &window, dialect)).await?;

        Ok(Page {
            data: self.hydrate(rows),
            total,
            per_page,
            current_page: page,
            last_page: last_page(total, per_page),
        })
    }

    /// New record filled from `data` (fillable keys only) and inserted.
    pub async fn create(&self, data: &Row) -> Result<Record, OrmError> {
        let mut record = self.make();
        record.fill(data);
        record.save().await?;
        Ok(record)
    }
}

fn compare(column: &str, op: Operator, value: Value) -> Predicate {
    Predicate::Compare {
        column: column.to_string(),
        op,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::last_page;

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(last_page(25, 10), 3);
        assert_eq!(last_page(20, 10), 2);
        assert_eq!(last_page(1, 10), 1);
        assert_eq!(last_page(0, 10), 0);
        assert_eq!(last_page(5, 0), 5);
    }
}
