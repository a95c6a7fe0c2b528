//! Record store port - Generic transactional CRUD over schema-described rows
//!
//! The core never issues query text. Every read or write names the
//! [`Schema`] of the entity kind it touches; adapters turn schema + row into
//! whatever their backing store needs.

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::value_objects::{DungeonId, DungeonInstanceId};

/// A persisted row: field name to JSON value
pub type Row = Map<String, Value>;

/// Storage kind of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Uuid,
    Text,
    Integer,
    Boolean,
    Timestamp,
}

/// One field of a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// Statically declared shape of one entity kind
///
/// Every schema has a required `id` UUID field and a `created_at` timestamp
/// used for creation ordering.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub table: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Keep only the declared fields of `row`, filling missing ones with null
    pub fn project(&self, row: &Row) -> Row {
        self.fields
            .iter()
            .map(|f| {
                (
                    f.name.to_string(),
                    row.get(f.name).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }
}

/// Row locking requested by a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Plain read
    None,
    /// Lock the row, waiting for (or failing on) a competing lock
    ForUpdate,
    /// Lock the row, treating a row locked elsewhere as absent
    ForUpdateSkipLocked,
}

/// Predicate applied by `get_many`
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    /// Field value is one of the given values
    In(&'static str, Vec<Value>),
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(field, value.into())
    }

    pub fn any_of<V: Into<Value>>(field: &'static str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(field, values.into_iter().map(Into::into).collect())
    }

    pub fn field(&self) -> &'static str {
        match self {
            Filter::Eq(field, _) | Filter::In(field, _) => field,
        }
    }

    /// Evaluate against a row held in memory
    pub fn matches(&self, row: &Row) -> bool {
        let value = row.get(self.field()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq(_, expected) => value == expected,
            Filter::In(_, candidates) => candidates.iter().any(|c| c == value),
        }
    }
}

/// Capacity of one dungeon instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceCapacity {
    pub dungeon_instance_id: DungeonInstanceId,
    pub dungeon_id: DungeonId,
    pub location_count: i64,
    pub character_count: i64,
}

impl InstanceCapacity {
    pub fn has_room(&self) -> bool {
        self.character_count < self.location_count
    }
}

/// Errors raised by record store adapters
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{table} {id} is locked by another transaction")]
    Locked { table: &'static str, id: Uuid },

    #[error("{table} {id} not found")]
    NotFound { table: &'static str, id: Uuid },

    #[error("{table} {id} already exists")]
    Conflict { table: &'static str, id: Uuid },

    #[error("Invalid row for {table}: {message}")]
    InvalidRow {
        table: &'static str,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),
}

/// Entry point of a record store: opens transactions
#[async_trait]
pub trait StorePort: Send + Sync {
    type Tx: TransactionPort;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// One unit of work against the record store
///
/// Writes become visible to other transactions on `commit`. Dropping a
/// transaction without committing discards its writes and releases its locks.
#[async_trait]
pub trait TransactionPort: Send {
    async fn get_one(
        &mut self,
        schema: &'static Schema,
        id: Uuid,
        lock: LockMode,
    ) -> Result<Option<Row>, StoreError>;

    /// Rows matching every filter, oldest first
    async fn get_many(
        &mut self,
        schema: &'static Schema,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError>;

    async fn create_one(&mut self, schema: &'static Schema, row: Row) -> Result<Row, StoreError>;

    async fn update_one(&mut self, schema: &'static Schema, row: Row) -> Result<Row, StoreError>;

    async fn delete_one(&mut self, schema: &'static Schema, id: Uuid) -> Result<(), StoreError>;

    /// Live character count against location count for every instance of a dungeon
    async fn instance_capacities(
        &mut self,
        dungeon_id: DungeonId,
    ) -> Result<Vec<InstanceCapacity>, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

/// Read the `id` field of a row
pub fn row_id(table: &'static str, row: &Row) -> Result<Uuid, StoreError> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| StoreError::InvalidRow {
            table,
            message: "missing or malformed id".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static THING: Schema = Schema {
        table: "thing",
        fields: &[
            Field::required("id", FieldKind::Uuid),
            Field::optional("owner_id", FieldKind::Uuid),
            Field::required("turn_number", FieldKind::Integer),
        ],
    };

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_project_drops_unknown_and_fills_missing() {
        let projected = THING.project(&row(json!({"id": "x", "extra": 1})));
        assert_eq!(projected.len(), 3);
        assert_eq!(projected["owner_id"], Value::Null);
        assert!(!projected.contains_key("extra"));
    }

    #[test]
    fn test_filters() {
        let r = row(json!({"id": "a", "owner_id": null, "turn_number": 3}));
        assert!(Filter::eq("turn_number", 3i64).matches(&r));
        assert!(!Filter::eq("turn_number", 4i64).matches(&r));
        assert!(!Filter::eq("owner_id", "a").matches(&r));
        assert!(Filter::any_of("id", ["b", "a"]).matches(&r));
        assert!(!Filter::any_of("id", Vec::<String>::new()).matches(&r));
    }
}
