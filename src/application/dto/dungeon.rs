use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{CharacterInstance, DungeonInstance};

#[derive(Debug, Deserialize)]
pub struct ActionRequestDto {
    #[serde(default)]
    pub character_instance_id: Option<Uuid>,
    #[serde(default)]
    pub monster_instance_id: Option<Uuid>,
    pub sentence: String,
}

#[derive(Debug, Serialize)]
pub struct CharacterInstanceResponseDto {
    pub id: String,
    pub character_id: String,
    pub dungeon_instance_id: String,
    pub location_instance_id: String,
    pub name: String,
    pub strength: i64,
    pub dexterity: i64,
    pub intelligence: i64,
    pub health: i64,
    pub fatigue: i64,
    pub coins: i64,
    pub experience_points: i64,
    pub attribute_points: i64,
    pub turn_number: i64,
}

impl From<CharacterInstance> for CharacterInstanceResponseDto {
    fn from(c: CharacterInstance) -> Self {
        Self {
            id: c.id.to_string(),
            character_id: c.character_id.to_string(),
            dungeon_instance_id: c.dungeon_instance_id.to_string(),
            location_instance_id: c.location_instance_id.to_string(),
            name: c.name,
            strength: c.attributes.strength,
            dexterity: c.attributes.dexterity,
            intelligence: c.attributes.intelligence,
            health: c.attributes.health,
            fatigue: c.attributes.fatigue,
            coins: c.coins,
            experience_points: c.experience_points,
            attribute_points: c.attribute_points,
            turn_number: c.turn_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DungeonInstanceResponseDto {
    pub id: String,
    pub dungeon_id: String,
    pub name: String,
    pub turn_number: i64,
}

impl From<DungeonInstance> for DungeonInstanceResponseDto {
    fn from(d: DungeonInstance) -> Self {
        Self {
            id: d.id.to_string(),
            dungeon_id: d.dungeon_id.to_string(),
            name: d.name,
            turn_number: d.turn_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExitDungeonResponseDto {
    pub character_instance_id: String,
    /// Objects left behind at the character's last location
    pub dropped_objects: Vec<String>,
}
