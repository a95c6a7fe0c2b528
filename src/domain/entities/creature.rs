//! Character and Monster templates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Attributes, CharacterId, MonsterId};

/// A player character template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub description: String,
    /// Base attribute values, copied onto every instance
    #[serde(flatten)]
    pub attributes: Attributes,
    pub coins: i64,
    pub experience_points: i64,
    pub attribute_points: i64,
    pub created_at: DateTime<Utc>,
}

impl Character {
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            description: String::new(),
            attributes,
            coins: 0,
            experience_points: 0,
            attribute_points: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_coins(mut self, coins: i64) -> Self {
        self.coins = coins;
        self
    }
}

/// A monster template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub attributes: Attributes,
    pub created_at: DateTime<Utc>,
}

impl Monster {
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: MonsterId::new(),
            name: name.into(),
            description: String::new(),
            attributes,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
