//! Strongly-typed identifiers for templates, instances and action records

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short token used to disambiguate instance names
            pub fn short_token(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        impl From<$name> for serde_json::Value {
            fn from(id: $name) -> serde_json::Value {
                serde_json::Value::String(id.0.to_string())
            }
        }
    };
}

// Templates
define_id!(DungeonId);
define_id!(LocationId);
define_id!(CharacterId);
define_id!(MonsterId);
define_id!(ObjectId);
define_id!(LocationObjectId);
define_id!(LocationMonsterId);
define_id!(MonsterObjectId);
define_id!(CharacterObjectId);

// Instances
define_id!(DungeonInstanceId);
define_id!(LocationInstanceId);
define_id!(CharacterInstanceId);
define_id!(MonsterInstanceId);
define_id!(ObjectInstanceId);

// Action history
define_id!(ActionId);
define_id!(ActionCharacterId);
define_id!(ActionMonsterId);
define_id!(ActionCharacterObjectId);
define_id!(ActionMonsterObjectId);
define_id!(ActionObjectId);
