//! Dungeon and Location templates - author-defined maps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Direction, DungeonId, Exits, LocationId};

/// A dungeon template: a named collection of locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dungeon {
    pub id: DungeonId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Dungeon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DungeonId::new(),
            name: name.into(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A location template within a dungeon
///
/// Exits reference other locations of the same dungeon. Exactly one location
/// per dungeon is flagged as the default entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub dungeon_id: DungeonId,
    pub name: String,
    pub description: String,
    pub is_default: bool,
    #[serde(flatten)]
    pub exits: Exits<LocationId>,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(dungeon_id: DungeonId, name: impl Into<String>) -> Self {
        Self {
            id: LocationId::new(),
            dungeon_id,
            name: name.into(),
            description: String::new(),
            is_default: false,
            exits: Exits::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_exit(mut self, direction: Direction, to: LocationId) -> Self {
        self.exits.set(direction, Some(to));
        self
    }
}
