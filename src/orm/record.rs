//! One row of a table held in memory: attribute map, persistence and loaded relations.

use crate::db::SharedConnection;
use crate::error::OrmError;
use crate::orm::{Collection, Entity, Model};
use crate::sql::{self, Row, Value};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;

/// A relation loaded onto a record and serialized under its name.
#[derive(Clone, Debug)]
pub enum Related {
    One(Option<Record>),
    Many(Collection),
}

impl Serialize for Related {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Related::One(r) => r.serialize(serializer),
            Related::Many(c) => c.serialize(serializer),
        }
    }
}

#[derive(Clone)]
pub struct Record {
    conn: SharedConnection,
    entity: Arc<Entity>,
    attributes: Row,
    relations: IndexMap<String, Related>,
}

impl Record {
    pub fn new(conn: SharedConnection, entity: Arc<Entity>) -> Self {
        Record {
            conn,
            entity,
            attributes: Row::new(),
            relations: IndexMap::new(),
        }
    }

    /// Record backed by a raw row; every column is kept, including the primary key.
    pub fn from_row(conn: SharedConnection, entity: Arc<Entity>, row: Row) -> Self {
        Record {
            conn,
            entity,
            attributes: row,
            relations: IndexMap::new(),
        }
    }

    /// Mass assignment: copy only fillable keys; others are dropped.
    pub fn fill(&mut self, data: &Row) -> &mut Self {
        for (key, value) in data {
            if self.entity.is_fillable(key) {
                let v = self.entity.cast_value(key, value.clone());
                self.attributes.insert(key.clone(), v);
            }
        }
        self
    }

    /// Set one fillable field. Returns false when the field is not fillable.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> bool {
        if !self.entity.is_fillable(field) {
            return false;
        }
        let v = self.entity.cast_value(field, value.into());
        self.attributes.insert(field.to_string(), v);
        true
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// Primary key value, if set and non-null.
    pub fn key(&self) -> Option<&Value> {
        self.attributes
            .get(self.entity.primary_key_name())
            .filter(|v| !v.is_null())
    }

    pub fn is_persisted(&self) -> bool {
        self.key().is_some()
    }

    pub fn attributes(&self) -> &Row {
        &self.attributes
    }

    pub fn into_attributes(self) -> Row {
        self.attributes
    }

    pub fn entity(&self) -> &Arc<Entity> {
        &self.entity
    }

    pub(crate) fn connection(&self) -> &SharedConnection {
        &self.conn
    }

    /// Fresh query handle on this record's table.
    pub fn query(&self) -> Model {
        Model::new(self.conn.clone(), self.entity.clone())
    }

    /// INSERT when not persisted (merging the stored row back, so the generated key and
    /// column defaults become visible), otherwise UPDATE of the fillable fields by primary key.
    pub async fn save(&mut self) -> Result<&mut Self, OrmError> {
        let dialect = self.conn.dialect();
        match self.key().cloned() {
            Some(id) => {
                let mut state = sql::QueryState::default();
                state.push(
                    sql::Connector::And,
                    sql::Predicate::Compare {
                        column: self.entity.primary_key_name().to_string(),
                        op: sql::Operator::Eq,
                        value: id,
                    },
                );
                match sql::update(&self.entity, &state, &self.attributes, dialect) {
                    Ok(q) => {
                        self.conn.execute(&q).await?;
                    }
                    Err(OrmError::NothingToUpdate) => {}
                    Err(e) => return Err(e),
                }
            }
            None => {
                let q = sql::insert(&self.entity, &self.attributes, dialect);
                let rows = self.conn.fetch_all(&q).await?;
                if let Some(row) = rows.into_iter().next() {
                    self.attributes.extend(row);
                }
            }
        }
        Ok(self)
    }

    /// Delete this row by primary key. Without a key there is no filter, so nothing is issued.
    pub async fn delete(&self) -> Result<u64, OrmError> {
        let id = self.key().cloned().ok_or(OrmError::MissingFilter)?;
        let mut query = self.query();
        query.where_eq(self.entity.primary_key_name(), id);
        query.delete().await
    }

    /// Reload attributes from the database. Returns false if the row no longer exists.
    pub async fn refresh(&mut self) -> Result<bool, OrmError> {
        let Some(id) = self.key().cloned() else {
            return Ok(false);
        };
        match self.query().find(id).await? {
            Some(fresh) => {
                self.attributes = fresh.attributes;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn set_relation(&mut self, name: &str, related: Related) -> &mut Self {
        self.relations.insert(name.to_string(), related);
        self
    }

    pub fn relation(&self, name: &str) -> Option<&Related> {
        self.relations.get(name)
    }

    /// Plain JSON object of attributes and loaded relations.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len() + self.relations.len()))?;
        for (k, v) in &self.attributes {
            map.serialize_entry(k, v)?;
        }
        for (k, r) in &self.relations {
            map.serialize_entry(k, r)?;
        }
        map.end()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("entity", &self.entity.name())
            .field("attributes", &self.attributes)
            .field("relations", &self.relations)
            .finish()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.entity.qualified_table() == other.entity.qualified_table() && self.attributes == other.attributes
    }
}
