//! Ordered result set of records.

use crate::orm::Record;
use crate::sql::Value;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::ops::Index;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collection {
    items: Vec<Record>,
}

impl Collection {
    pub fn new(items: Vec<Record>) -> Self {
        Collection { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&Record> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Record> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.items.iter()
    }

    pub fn push(&mut self, record: Record) {
        self.items.push(record);
    }

    /// Records matching `predicate`, order kept.
    pub fn filter<F>(&self, mut predicate: F) -> Collection
    where
        F: FnMut(&Record) -> bool,
    {
        self.items.iter().filter(|r| predicate(r)).cloned().collect()
    }

    /// Value of `column` for each record (`Null` where absent).
    pub fn pluck(&self, column: &str) -> Vec<Value> {
        self.items
            .iter()
            .map(|r| r.get(column).cloned().unwrap_or(Value::Null))
            .collect()
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.items
    }

    /// JSON array of plain objects, nested relations included.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.items.iter().map(Record::to_json).collect())
    }
}

impl Index<usize> for Collection {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.items[index]
    }
}

impl IntoIterator for Collection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Record> for Collection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Collection {
            items: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for r in &self.items {
            seq.serialize_element(r)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Connection, SharedConnection};
    use crate::orm::{Entity, Related};
    use crate::sql::{Dialect, QueryBuf, Row};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    struct Offline;

    #[async_trait]
    impl Connection for Offline {
        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }

        async fn fetch_all(&self, _query: &QueryBuf) -> Result<Vec<Row>, sqlx::Error> {
            Ok(Vec::new())
        }

        async fn execute(&self, _query: &QueryBuf) -> Result<u64, sqlx::Error> {
            Ok(0)
        }
    }

    fn record(id: i64, name: &str) -> Record {
        let conn: SharedConnection = Arc::new(Offline);
        let entity = Entity::new("Category").fillable(["name"]).build().unwrap();
        let mut row = Row::new();
        row.insert("id".into(), Value::Integer(id));
        row.insert("name".into(), Value::from(name));
        Record::from_row(conn, entity, row)
    }

    #[test]
    fn converts_to_ordered_plain_objects() {
        let c: Collection = vec![record(2, "Drinks"), record(1, "Starters")].into_iter().collect();
        assert_eq!(
            c.to_json(),
            json!([{ "id": 2, "name": "Drinks" }, { "id": 1, "name": "Starters" }])
        );
        let keys: Vec<&str> = c[0].attributes().keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "name"]);
    }

    #[test]
    fn nested_relations_serialize_recursively() {
        let mut parent = record(1, "Drinks");
        parent.set_relation("children", Related::Many(Collection::new(vec![record(5, "Juice")])));
        parent.set_relation("parent", Related::One(None));
        assert_eq!(
            parent.to_json(),
            json!({ "id": 1, "name": "Drinks", "children": [{ "id": 5, "name": "Juice" }], "parent": null })
        );
    }

    #[test]
    fn lookup_helpers() {
        let c = Collection::new(vec![record(1, "a"), record(2, "b"), record(3, "c")]);
        assert_eq!(c.len(), 3);
        assert_eq!(c.first().and_then(|r| r.key()), Some(&Value::Integer(1)));
        assert_eq!(c.last().and_then(|r| r.key()), Some(&Value::Integer(3)));
        assert!(c.get(3).is_none());
        assert_eq!(c.pluck("name"), vec![Value::from("a"), Value::from("b"), Value::from("c")]);
        let odd = c.filter(|r| r.key().and_then(Value::as_i64).is_some_and(|n| n % 2 == 1));
        assert_eq!(odd.len(), 2);
        assert!(Collection::default().first().is_none());
    }
}
