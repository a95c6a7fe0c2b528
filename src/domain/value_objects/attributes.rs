//! Combat-relevant attributes shared by characters and monsters

use serde::{Deserialize, Serialize};

/// Strength, dexterity, intelligence, health and fatigue
///
/// Templates carry the base values; instances carry the current values,
/// which diverge as combat wears a creature down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i64,
    pub dexterity: i64,
    pub intelligence: i64,
    pub health: i64,
    pub fatigue: i64,
}

impl Attributes {
    pub fn new(strength: i64, dexterity: i64, intelligence: i64, health: i64, fatigue: i64) -> Self {
        Self {
            strength,
            dexterity,
            intelligence,
            health,
            fatigue,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}
