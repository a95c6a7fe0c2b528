//! Live dungeon playthroughs and their cloned locations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Dungeon, Location};
use crate::domain::value_objects::{
    DungeonId, DungeonInstanceId, Exits, LocationId, LocationInstanceId,
};

/// One running playthrough of a dungeon template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonInstance {
    pub id: DungeonInstanceId,
    pub dungeon_id: DungeonId,
    pub name: String,
    /// Current turn; entities may act once while this value holds
    pub turn_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DungeonInstance {
    pub fn new(dungeon: &Dungeon) -> Self {
        Self {
            id: DungeonInstanceId::new(),
            dungeon_id: dungeon.id,
            name: dungeon.name.clone(),
            turn_number: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn advance_turn(&mut self) {
        self.turn_number += 1;
        self.updated_at = Some(Utc::now());
    }
}

/// A location template cloned into a dungeon instance
///
/// Exits point at the sibling location instances cloned from the template's
/// exits and are never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInstance {
    pub id: LocationInstanceId,
    pub dungeon_instance_id: DungeonInstanceId,
    pub location_id: LocationId,
    pub name: String,
    pub description: String,
    pub is_default: bool,
    #[serde(flatten)]
    pub exits: Exits<LocationInstanceId>,
    pub created_at: DateTime<Utc>,
}

impl LocationInstance {
    /// Clone a location template, translating its exits with `exits`
    pub fn from_template(
        dungeon_instance_id: DungeonInstanceId,
        id: LocationInstanceId,
        location: &Location,
        exits: Exits<LocationInstanceId>,
    ) -> Self {
        Self {
            id,
            dungeon_instance_id,
            location_id: location.id,
            name: location.name.clone(),
            description: location.description.clone(),
            is_default: location.is_default,
            exits,
            created_at: Utc::now(),
        }
    }
}
