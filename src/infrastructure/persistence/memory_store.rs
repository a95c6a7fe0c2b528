//! In-memory record store
//!
//! Rows live in per-table vectors behind a mutex. Each transaction buffers
//! its writes and overlays them on committed rows when reading. Row locks are
//! tracked per `(table, id)`, which emulates `FOR UPDATE [SKIP LOCKED]`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use uuid::Uuid;

use crate::application::ports::outbound::{
    row_id, Filter, InstanceCapacity, LockMode, Row, Schema, StoreError, StorePort,
    TransactionPort,
};
use crate::application::repositories::records::{CHARACTER_INSTANCE, DUNGEON_INSTANCE, LOCATION};
use crate::domain::value_objects::{DungeonId, DungeonInstanceId};

type RowKey = (&'static str, Uuid);

#[derive(Default)]
struct StoreState {
    tables: HashMap<&'static str, Vec<Row>>,
    locks: HashMap<RowKey, u64>,
    next_transaction: u64,
}

impl StoreState {
    /// Take the row lock for `transaction`, false when another holds it
    fn try_lock(&mut self, key: RowKey, transaction: u64) -> bool {
        match self.locks.get(&key) {
            Some(owner) if *owner != transaction => false,
            _ => {
                self.locks.insert(key, transaction);
                true
            }
        }
    }

    fn release(&mut self, transaction: u64) {
        self.locks.retain(|_, owner| *owner != transaction);
    }
}

/// A buffered write; `None` deletes the row
#[derive(Debug, Clone)]
struct PendingWrite {
    table: &'static str,
    id: Uuid,
    row: Option<Row>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorePort for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let mut state = lock(&self.state)?;
        state.next_transaction += 1;
        Ok(InMemoryTransaction {
            id: state.next_transaction,
            state: Arc::clone(&self.state),
            writes: Vec::new(),
            finished: false,
        })
    }
}

pub struct InMemoryTransaction {
    id: u64,
    state: Arc<Mutex<StoreState>>,
    writes: Vec<PendingWrite>,
    finished: bool,
}

impl InMemoryTransaction {
    fn locked(table: &'static str, id: Uuid) -> StoreError {
        StoreError::Locked { table, id }
    }

    fn write(&mut self, schema: &'static Schema, row: Row) -> Result<Row, StoreError> {
        let id = row_id(schema.table, &row)?;
        self.writes.push(PendingWrite {
            table: schema.table,
            id,
            row: Some(row.clone()),
        });
        Ok(row)
    }
}

#[async_trait]
impl TransactionPort for InMemoryTransaction {
    async fn get_one(
        &mut self,
        schema: &'static Schema,
        id: Uuid,
        lock_mode: LockMode,
    ) -> Result<Option<Row>, StoreError> {
        let mut state = lock(&self.state)?;
        let row = visible_rows(&state, &self.writes, schema.table)
            .into_iter()
            .find(|r| row_id(schema.table, r).ok() == Some(id));
        let Some(row) = row else {
            return Ok(None);
        };

        match lock_mode {
            LockMode::None => Ok(Some(row)),
            LockMode::ForUpdate if state.try_lock((schema.table, id), self.id) => Ok(Some(row)),
            LockMode::ForUpdate => Err(Self::locked(schema.table, id)),
            LockMode::ForUpdateSkipLocked if state.try_lock((schema.table, id), self.id) => {
                Ok(Some(row))
            }
            LockMode::ForUpdateSkipLocked => Ok(None),
        }
    }

    async fn get_many(
        &mut self,
        schema: &'static Schema,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError> {
        for filter in filters {
            if schema.field(filter.field()).is_none() {
                return Err(StoreError::InvalidRow {
                    table: schema.table,
                    message: format!("unknown filter field {}", filter.field()),
                });
            }
        }
        let state = lock(&self.state)?;
        Ok(visible_rows(&state, &self.writes, schema.table)
            .into_iter()
            .filter(|row| filters.iter().all(|f| f.matches(row)))
            .collect())
    }

    async fn create_one(&mut self, schema: &'static Schema, row: Row) -> Result<Row, StoreError> {
        let row = validate(schema, row)?;
        let id = row_id(schema.table, &row)?;
        {
            let mut state = lock(&self.state)?;
            let exists = visible_rows(&state, &self.writes, schema.table)
                .iter()
                .any(|r| row_id(schema.table, r).ok() == Some(id));
            if exists {
                return Err(StoreError::Conflict {
                    table: schema.table,
                    id,
                });
            }
            if !state.try_lock((schema.table, id), self.id) {
                return Err(Self::locked(schema.table, id));
            }
        }
        self.write(schema, row)
    }

    async fn update_one(&mut self, schema: &'static Schema, row: Row) -> Result<Row, StoreError> {
        let row = validate(schema, row)?;
        let id = row_id(schema.table, &row)?;
        {
            let mut state = lock(&self.state)?;
            let exists = visible_rows(&state, &self.writes, schema.table)
                .iter()
                .any(|r| row_id(schema.table, r).ok() == Some(id));
            if !exists {
                return Err(StoreError::NotFound {
                    table: schema.table,
                    id,
                });
            }
            if !state.try_lock((schema.table, id), self.id) {
                return Err(Self::locked(schema.table, id));
            }
        }
        self.write(schema, row)
    }

    async fn delete_one(&mut self, schema: &'static Schema, id: Uuid) -> Result<(), StoreError> {
        {
            let mut state = lock(&self.state)?;
            let exists = visible_rows(&state, &self.writes, schema.table)
                .iter()
                .any(|r| row_id(schema.table, r).ok() == Some(id));
            if !exists {
                return Err(StoreError::NotFound {
                    table: schema.table,
                    id,
                });
            }
            if !state.try_lock((schema.table, id), self.id) {
                return Err(Self::locked(schema.table, id));
            }
        }
        self.writes.push(PendingWrite {
            table: schema.table,
            id,
            row: None,
        });
        Ok(())
    }

    async fn instance_capacities(
        &mut self,
        dungeon_id: DungeonId,
    ) -> Result<Vec<InstanceCapacity>, StoreError> {
        let state = lock(&self.state)?;
        let dungeon_value = Value::from(dungeon_id);

        let location_count = visible_rows(&state, &self.writes, LOCATION.table)
            .iter()
            .filter(|r| r.get("dungeon_id") == Some(&dungeon_value))
            .count() as i64;
        let characters = visible_rows(&state, &self.writes, CHARACTER_INSTANCE.table);

        visible_rows(&state, &self.writes, DUNGEON_INSTANCE.table)
            .iter()
            .filter(|r| r.get("dungeon_id") == Some(&dungeon_value))
            .map(|instance| {
                let id = row_id(DUNGEON_INSTANCE.table, instance)?;
                let id_value = Value::String(id.to_string());
                let character_count = characters
                    .iter()
                    .filter(|c| c.get("dungeon_instance_id") == Some(&id_value))
                    .count() as i64;
                Ok(InstanceCapacity {
                    dungeon_instance_id: DungeonInstanceId::from_uuid(id),
                    dungeon_id,
                    location_count,
                    character_count,
                })
            })
            .collect()
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        let writes = std::mem::take(&mut self.writes);
        let mut state = lock(&self.state)?;
        for write in &writes {
            let table = state.tables.entry(write.table).or_default();
            apply(table, write);
        }
        state.release(self.id);
        self.finished = true;
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), StoreError> {
        self.writes.clear();
        let mut state = lock(&self.state)?;
        state.release(self.id);
        self.finished = true;
        Ok(())
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            state.release(self.id);
        }
    }
}

fn lock(state: &Mutex<StoreState>) -> Result<MutexGuard<'_, StoreState>, StoreError> {
    state
        .lock()
        .map_err(|_| StoreError::Database("in-memory store lock poisoned".to_string()))
}

/// Committed rows of `table` with the transaction's own writes applied,
/// oldest first
fn visible_rows(state: &StoreState, writes: &[PendingWrite], table: &'static str) -> Vec<Row> {
    let mut rows = state.tables.get(table).cloned().unwrap_or_default();
    for write in writes.iter().filter(|w| w.table == table) {
        apply(&mut rows, write);
    }
    rows.sort_by_key(created_at);
    rows
}

fn apply(rows: &mut Vec<Row>, write: &PendingWrite) {
    let position = rows
        .iter()
        .position(|r| row_id(write.table, r).ok() == Some(write.id));
    match (&write.row, position) {
        (Some(row), Some(index)) => rows[index] = row.clone(),
        (Some(row), None) => rows.push(row.clone()),
        (None, Some(index)) => {
            rows.remove(index);
        }
        (None, None) => {}
    }
}

fn created_at(row: &Row) -> Option<DateTime<FixedOffset>> {
    row.get("created_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

/// Project onto the schema and reject nulls in required fields
fn validate(schema: &'static Schema, row: Row) -> Result<Row, StoreError> {
    let row = schema.project(&row);
    for field in schema.fields {
        if !field.nullable && row.get(field.name).map_or(true, Value::is_null) {
            return Err(StoreError::InvalidRow {
                table: schema.table,
                message: format!("{} is required", field.name),
            });
        }
    }
    Ok(row)
}
