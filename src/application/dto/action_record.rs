use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{
    Action, ActionCharacter, ActionCharacterObject, ActionMonster, ActionMonsterObject,
    ActionObject,
};
use crate::domain::value_objects::{Direction, LocationInstanceId};

/// Everything an action touched, as returned to the player
///
/// Exactly one of `character` / `monster` is set. At most one `target_*`
/// field is set, and at most one of `equipped_object`, `stashed_object` and
/// `dropped_object`.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRecordSet {
    pub action: Action,
    pub character: Option<ActionCharacterRecord>,
    pub monster: Option<ActionMonsterRecord>,
    pub location: ActionLocationRecord,
    pub target_location: Option<ActionLocationRecord>,
    pub target_character: Option<ActionCharacterRecord>,
    pub target_monster: Option<ActionMonsterRecord>,
    pub target_object: Option<ActionObject>,
    pub equipped_object: Option<ActionObject>,
    pub stashed_object: Option<ActionObject>,
    pub dropped_object: Option<ActionObject>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionCharacterRecord {
    #[serde(flatten)]
    pub record: ActionCharacter,
    pub objects: Vec<ActionCharacterObject>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionMonsterRecord {
    #[serde(flatten)]
    pub record: ActionMonster,
    pub objects: Vec<ActionMonsterObject>,
}

/// Contents of a location instance at action time
#[derive(Debug, Clone, Serialize)]
pub struct ActionLocationRecord {
    pub location_instance_id: LocationInstanceId,
    pub name: String,
    pub description: String,
    /// Direction travelled or looked in to reach this location, if any
    pub direction: Option<Direction>,
    /// Exits leading out of this location
    pub directions: Vec<Direction>,
    pub characters: Vec<LocationOccupant>,
    pub monsters: Vec<LocationOccupant>,
    pub objects: Vec<LocationOccupant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationOccupant {
    pub id: Uuid,
    pub name: String,
}

impl LocationOccupant {
    pub fn new(id: impl Into<Uuid>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

