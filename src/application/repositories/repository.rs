//! Typed repositories composed from a schema descriptor and the record store port

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::application::ports::outbound::{
    Filter, LockMode, Row, Schema, StoreError, TransactionPort,
};

/// An entity kind that can be stored as a row
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    type Id: Into<Uuid> + Copy + Send;

    const SCHEMA: &'static Schema;
}

/// CRUD access for one entity kind
///
/// Holds the entity's schema and delegates every call to the transaction it
/// is handed, converting rows to and from the entity type.
pub struct Repository<E: Record> {
    schema: &'static Schema,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Record> Default for Repository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Record> Repository<E> {
    pub fn new() -> Self {
        Self {
            schema: E::SCHEMA,
            _entity: PhantomData,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub async fn get_one<T: TransactionPort>(
        &self,
        tx: &mut T,
        id: E::Id,
        lock: LockMode,
    ) -> Result<Option<E>, StoreError> {
        tx.get_one(self.schema, id.into(), lock)
            .await?
            .map(|row| self.from_row(row))
            .transpose()
    }

    /// Like `get_one`, but a missing row is an error
    pub async fn require<T: TransactionPort>(
        &self,
        tx: &mut T,
        id: E::Id,
        lock: LockMode,
    ) -> Result<E, StoreError> {
        let uuid: Uuid = id.into();
        self.get_one(tx, id, lock)
            .await?
            .ok_or(StoreError::NotFound {
                table: self.schema.table,
                id: uuid,
            })
    }

    pub async fn get_many<T: TransactionPort>(
        &self,
        tx: &mut T,
        filters: &[Filter],
    ) -> Result<Vec<E>, StoreError> {
        tx.get_many(self.schema, filters)
            .await?
            .into_iter()
            .map(|row| self.from_row(row))
            .collect()
    }

    pub async fn create<T: TransactionPort>(&self, tx: &mut T, entity: &E) -> Result<E, StoreError> {
        let row = self.to_row(entity)?;
        let created = tx.create_one(self.schema, row).await?;
        self.from_row(created)
    }

    pub async fn update<T: TransactionPort>(&self, tx: &mut T, entity: &E) -> Result<E, StoreError> {
        let row = self.to_row(entity)?;
        let updated = tx.update_one(self.schema, row).await?;
        self.from_row(updated)
    }

    pub async fn delete<T: TransactionPort>(&self, tx: &mut T, id: E::Id) -> Result<(), StoreError> {
        tx.delete_one(self.schema, id.into()).await
    }

    fn to_row(&self, entity: &E) -> Result<Row, StoreError> {
        match serde_json::to_value(entity)? {
            Value::Object(row) => Ok(self.schema.project(&row)),
            _ => Err(StoreError::InvalidRow {
                table: self.schema.table,
                message: "entity did not serialize to an object".to_string(),
            }),
        }
    }

    fn from_row(&self, row: Row) -> Result<E, StoreError> {
        Ok(serde_json::from_value(Value::Object(row))?)
    }
}
