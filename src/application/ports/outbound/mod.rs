//! Outbound ports - Interfaces that the application requires from external systems

mod record_store_port;

pub use record_store_port::{
    row_id, Field, FieldKind, Filter, InstanceCapacity, LockMode, Row, Schema, StoreError,
    StorePort, TransactionPort,
};
