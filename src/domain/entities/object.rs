//! Object template and the placement templates that seed instances

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    CharacterId, CharacterObjectId, LocationId, LocationMonsterId, LocationObjectId, MonsterId,
    MonsterObjectId, ObjectId,
};

/// An object template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub name: String,
    /// Short description shown in location listings
    pub description: String,
    /// Detailed description shown when the object is looked at
    pub description_detail: String,
    pub created_at: DateTime<Utc>,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            description: String::new(),
            description_detail: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_description(
        mut self,
        description: impl Into<String>,
        description_detail: impl Into<String>,
    ) -> Self {
        self.description = description.into();
        self.description_detail = description_detail.into();
        self
    }
}

/// An object lying at a location when a dungeon instance is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationObject {
    pub id: LocationObjectId,
    pub location_id: LocationId,
    pub object_id: ObjectId,
    pub created_at: DateTime<Utc>,
}

impl LocationObject {
    pub fn new(location_id: LocationId, object_id: ObjectId) -> Self {
        Self {
            id: LocationObjectId::new(),
            location_id,
            object_id,
            created_at: Utc::now(),
        }
    }
}

/// A monster stationed at a location when a dungeon instance is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMonster {
    pub id: LocationMonsterId,
    pub location_id: LocationId,
    pub monster_id: MonsterId,
    pub created_at: DateTime<Utc>,
}

impl LocationMonster {
    pub fn new(location_id: LocationId, monster_id: MonsterId) -> Self {
        Self {
            id: LocationMonsterId::new(),
            location_id,
            monster_id,
            created_at: Utc::now(),
        }
    }
}

/// Starting inventory entry for a monster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterObject {
    pub id: MonsterObjectId,
    pub monster_id: MonsterId,
    pub object_id: ObjectId,
    pub is_equipped: bool,
    pub is_stashed: bool,
    pub created_at: DateTime<Utc>,
}

impl MonsterObject {
    pub fn equipped(monster_id: MonsterId, object_id: ObjectId) -> Self {
        Self {
            id: MonsterObjectId::new(),
            monster_id,
            object_id,
            is_equipped: true,
            is_stashed: false,
            created_at: Utc::now(),
        }
    }

    pub fn stashed(monster_id: MonsterId, object_id: ObjectId) -> Self {
        Self {
            is_equipped: false,
            is_stashed: true,
            ..Self::equipped(monster_id, object_id)
        }
    }
}

/// Starting inventory entry for a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterObject {
    pub id: CharacterObjectId,
    pub character_id: CharacterId,
    pub object_id: ObjectId,
    pub is_equipped: bool,
    pub is_stashed: bool,
    pub created_at: DateTime<Utc>,
}

impl CharacterObject {
    pub fn equipped(character_id: CharacterId, object_id: ObjectId) -> Self {
        Self {
            id: CharacterObjectId::new(),
            character_id,
            object_id,
            is_equipped: true,
            is_stashed: false,
            created_at: Utc::now(),
        }
    }

    pub fn stashed(character_id: CharacterId, object_id: ObjectId) -> Self {
        Self {
            is_equipped: false,
            is_stashed: true,
            ..Self::equipped(character_id, object_id)
        }
    }
}
