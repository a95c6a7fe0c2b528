//! Record store adapters
//!
//! Two backends implement the record store port: an in-memory store for
//! development and tests, and PostgreSQL. [`StoreBackend`] selects one at
//! runtime while keeping services generic over a single concrete type.

mod memory_store;
mod postgres_store;

pub use memory_store::{InMemoryStore, InMemoryTransaction};
pub use postgres_store::{PostgresStore, PostgresTransaction};

use anyhow::{Context, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::outbound::{
    Filter, InstanceCapacity, LockMode, Row, Schema, StoreError, StorePort, TransactionPort,
};
use crate::domain::value_objects::DungeonId;
use crate::infrastructure::config::{StoreConfig, StoreKind};

/// Enum wrapper for store backends to enable runtime selection
#[derive(Clone)]
pub enum StoreBackend {
    Memory(InMemoryStore),
    Postgres(PostgresStore),
}

impl StoreBackend {
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        match config.kind {
            StoreKind::Memory => {
                tracing::info!("Using in-memory record store");
                Ok(StoreBackend::Memory(InMemoryStore::new()))
            }
            StoreKind::Postgres => {
                let store = PostgresStore::connect(&config.database_url, config.max_connections)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                store
                    .initialize_schema()
                    .await
                    .context("Failed to initialize database schema")?;
                tracing::info!("Connected to PostgreSQL record store");
                Ok(StoreBackend::Postgres(store))
            }
        }
    }
}

pub enum TransactionBackend {
    Memory(InMemoryTransaction),
    Postgres(PostgresTransaction),
}

#[async_trait]
impl StorePort for StoreBackend {
    type Tx = TransactionBackend;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        match self {
            StoreBackend::Memory(s) => s.begin().await.map(TransactionBackend::Memory),
            StoreBackend::Postgres(s) => s.begin().await.map(TransactionBackend::Postgres),
        }
    }
}

#[async_trait]
impl TransactionPort for TransactionBackend {
    async fn get_one(
        &mut self,
        schema: &'static Schema,
        id: Uuid,
        lock: LockMode,
    ) -> Result<Option<Row>, StoreError> {
        match self {
            TransactionBackend::Memory(tx) => tx.get_one(schema, id, lock).await,
            TransactionBackend::Postgres(tx) => tx.get_one(schema, id, lock).await,
        }
    }

    async fn get_many(
        &mut self,
        schema: &'static Schema,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError> {
        match self {
            TransactionBackend::Memory(tx) => tx.get_many(schema, filters).await,
            TransactionBackend::Postgres(tx) => tx.get_many(schema, filters).await,
        }
    }

    async fn create_one(&mut self, schema: &'static Schema, row: Row) -> Result<Row, StoreError> {
        match self {
            TransactionBackend::Memory(tx) => tx.create_one(schema, row).await,
            TransactionBackend::Postgres(tx) => tx.create_one(schema, row).await,
        }
    }

    async fn update_one(&mut self, schema: &'static Schema, row: Row) -> Result<Row, StoreError> {
        match self {
            TransactionBackend::Memory(tx) => tx.update_one(schema, row).await,
            TransactionBackend::Postgres(tx) => tx.update_one(schema, row).await,
        }
    }

    async fn delete_one(&mut self, schema: &'static Schema, id: Uuid) -> Result<(), StoreError> {
        match self {
            TransactionBackend::Memory(tx) => tx.delete_one(schema, id).await,
            TransactionBackend::Postgres(tx) => tx.delete_one(schema, id).await,
        }
    }

    async fn instance_capacities(
        &mut self,
        dungeon_id: DungeonId,
    ) -> Result<Vec<InstanceCapacity>, StoreError> {
        match self {
            TransactionBackend::Memory(tx) => tx.instance_capacities(dungeon_id).await,
            TransactionBackend::Postgres(tx) => tx.instance_capacities(dungeon_id).await,
        }
    }

    async fn commit(self) -> Result<(), StoreError> {
        match self {
            TransactionBackend::Memory(tx) => tx.commit().await,
            TransactionBackend::Postgres(tx) => tx.commit().await,
        }
    }

    async fn rollback(self) -> Result<(), StoreError> {
        match self {
            TransactionBackend::Memory(tx) => tx.rollback().await,
            TransactionBackend::Postgres(tx) => tx.rollback().await,
        }
    }
}
