//! Application services - Use case implementations
//!
//! Services are generic over the record store they are handed and run every
//! use case inside a single store transaction.

pub mod action_record_builder;
pub mod action_resolver;
pub mod action_service;
pub mod actor;
pub mod dungeon_instance_service;
pub mod target_resolver;
pub mod turn_coordinator;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use action_service::{ActionRequest, ActionService, ActionServiceImpl};
pub use actor::ActorRef;
pub use dungeon_instance_service::{DungeonInstanceService, DungeonInstanceServiceImpl};
