//! Errors raised while resolving actions and managing dungeon instances

use crate::application::ports::outbound::StoreError;
use crate::domain::services::CommandError;
use crate::domain::value_objects::{Direction, DungeonInstanceId};

/// Failure of an engine operation
///
/// Every variant aborts the surrounding transaction.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("There is no exit {0}")]
    NoExit(Direction),

    #[error("{0}")]
    Ownership(String),

    #[error("{actor} has already acted in turn {turn_number}")]
    DuplicateAction { actor: String, turn_number: i64 },

    #[error(
        "Dungeon instance {dungeon_instance_id} holds {character_count} characters \
         but only has {location_count} locations"
    )]
    CapacityInvariant {
        dungeon_instance_id: DungeonInstanceId,
        character_count: i64,
        location_count: i64,
    },

    #[error("{0} is busy in another transaction")]
    Concurrency(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ActionError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        ActionError::NotFound(what.to_string())
    }

    pub fn ownership(message: impl Into<String>) -> Self {
        ActionError::Ownership(message.into())
    }
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Locked { table, id } => ActionError::Concurrency(format!("{} {}", table, id)),
            StoreError::NotFound { table, id } => ActionError::NotFound(format!("{} {}", table, id)),
            other => ActionError::Persistence(other.to_string()),
        }
    }
}
