//! Character and monster placements inside a dungeon instance

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Character, Monster};
use crate::domain::services::naming::instance_name;
use crate::domain::value_objects::{
    Attributes, CharacterId, CharacterInstanceId, DungeonInstanceId, LocationInstanceId,
    MonsterId, MonsterInstanceId,
};

/// A character placed in exactly one dungeon instance and location instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterInstance {
    pub id: CharacterInstanceId,
    pub character_id: CharacterId,
    pub dungeon_instance_id: DungeonInstanceId,
    pub location_instance_id: LocationInstanceId,
    pub name: String,
    /// Current attribute values
    #[serde(flatten)]
    pub attributes: Attributes,
    pub coins: i64,
    pub experience_points: i64,
    pub attribute_points: i64,
    /// The next turn this character may act in
    pub turn_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CharacterInstance {
    pub fn new(
        character: &Character,
        dungeon_instance_id: DungeonInstanceId,
        location_instance_id: LocationInstanceId,
        turn_number: i64,
    ) -> Self {
        let id = CharacterInstanceId::new();
        Self {
            id,
            character_id: character.id,
            dungeon_instance_id,
            location_instance_id,
            name: instance_name(&character.name, &id.short_token()),
            attributes: character.attributes,
            coins: character.coins,
            experience_points: character.experience_points,
            attribute_points: character.attribute_points,
            turn_number,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// A monster placed in exactly one dungeon instance and location instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterInstance {
    pub id: MonsterInstanceId,
    pub monster_id: MonsterId,
    pub dungeon_instance_id: DungeonInstanceId,
    pub location_instance_id: LocationInstanceId,
    pub name: String,
    #[serde(flatten)]
    pub attributes: Attributes,
    pub coins: i64,
    pub experience_points: i64,
    pub attribute_points: i64,
    pub turn_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MonsterInstance {
    pub fn new(
        monster: &Monster,
        dungeon_instance_id: DungeonInstanceId,
        location_instance_id: LocationInstanceId,
    ) -> Self {
        let id = MonsterInstanceId::new();
        Self {
            id,
            monster_id: monster.id,
            dungeon_instance_id,
            location_instance_id,
            name: instance_name(&monster.name, &id.short_token()),
            attributes: monster.attributes,
            coins: 0,
            experience_points: 0,
            attribute_points: 0,
            turn_number: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}
