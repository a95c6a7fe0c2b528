//! Action history - append-only records of resolved commands

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::ObjectInstance;
use crate::domain::value_objects::{
    ActionCharacterId, ActionCharacterObjectId, ActionId, ActionMonsterId, ActionMonsterObjectId,
    ActionObjectId, Attributes, CharacterInstanceId, Direction, DungeonInstanceId,
    LocationInstanceId, MonsterInstanceId, ObjectInstanceId, Verb,
};

/// One resolved command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub dungeon_instance_id: DungeonInstanceId,
    /// Where the actor stood when the command was issued
    pub location_instance_id: LocationInstanceId,
    pub character_instance_id: Option<CharacterInstanceId>,
    pub monster_instance_id: Option<MonsterInstanceId>,
    pub turn_number: i64,
    /// The sentence exactly as submitted
    pub sentence: String,
    pub command: Verb,
    /// Normalised command with every phrase resolved to an entity name
    pub resolved_command: String,
    pub equipped_object_instance_id: Option<ObjectInstanceId>,
    pub stashed_object_instance_id: Option<ObjectInstanceId>,
    pub dropped_object_instance_id: Option<ObjectInstanceId>,
    pub target_object_instance_id: Option<ObjectInstanceId>,
    pub target_character_instance_id: Option<CharacterInstanceId>,
    pub target_monster_instance_id: Option<MonsterInstanceId>,
    pub target_location_instance_id: Option<LocationInstanceId>,
    pub target_location_direction: Option<Direction>,
    pub created_at: DateTime<Utc>,
}

impl Action {
    pub fn new(
        dungeon_instance_id: DungeonInstanceId,
        location_instance_id: LocationInstanceId,
        turn_number: i64,
        sentence: impl Into<String>,
        command: Verb,
    ) -> Self {
        Self {
            id: ActionId::new(),
            dungeon_instance_id,
            location_instance_id,
            character_instance_id: None,
            monster_instance_id: None,
            turn_number,
            sentence: sentence.into(),
            command,
            resolved_command: String::new(),
            equipped_object_instance_id: None,
            stashed_object_instance_id: None,
            dropped_object_instance_id: None,
            target_object_instance_id: None,
            target_character_instance_id: None,
            target_monster_instance_id: None,
            target_location_instance_id: None,
            target_location_direction: None,
            created_at: Utc::now(),
        }
    }
}

/// Role of a combatant snapshot within an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionRecordType {
    /// The entity that issued the command
    Source,
    /// The entity the command was aimed at
    Target,
}

/// Attribute snapshot of a character or monster taking part in an action
///
/// `strength` .. `fatigue` are the template's base values, the `current_*`
/// values are the instance's after the action, and `previous_*` hold health
/// and fatigue as they were before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub name: String,
    pub location_instance_id: LocationInstanceId,
    pub strength: i64,
    pub dexterity: i64,
    pub intelligence: i64,
    pub health: i64,
    pub fatigue: i64,
    pub current_strength: i64,
    pub current_dexterity: i64,
    pub current_intelligence: i64,
    pub current_health: i64,
    pub current_fatigue: i64,
    pub previous_health: i64,
    pub previous_fatigue: i64,
    pub coins: i64,
    pub experience_points: i64,
    pub attribute_points: i64,
}

impl CombatantSnapshot {
    pub fn base_attributes(&self) -> Attributes {
        Attributes::new(
            self.strength,
            self.dexterity,
            self.intelligence,
            self.health,
            self.fatigue,
        )
    }

    pub fn current_attributes(&self) -> Attributes {
        Attributes::new(
            self.current_strength,
            self.current_dexterity,
            self.current_intelligence,
            self.current_health,
            self.current_fatigue,
        )
    }
}

/// Inputs for a [`CombatantSnapshot`]
pub struct CombatantState<'a> {
    pub name: &'a str,
    pub location_instance_id: LocationInstanceId,
    pub base: Attributes,
    pub before: Attributes,
    pub after: Attributes,
    pub coins: i64,
    pub experience_points: i64,
    pub attribute_points: i64,
}

impl From<CombatantState<'_>> for CombatantSnapshot {
    fn from(state: CombatantState<'_>) -> Self {
        Self {
            name: state.name.to_string(),
            location_instance_id: state.location_instance_id,
            strength: state.base.strength,
            dexterity: state.base.dexterity,
            intelligence: state.base.intelligence,
            health: state.base.health,
            fatigue: state.base.fatigue,
            current_strength: state.after.strength,
            current_dexterity: state.after.dexterity,
            current_intelligence: state.after.intelligence,
            current_health: state.after.health,
            current_fatigue: state.after.fatigue,
            previous_health: state.before.health,
            previous_fatigue: state.before.fatigue,
            coins: state.coins,
            experience_points: state.experience_points,
            attribute_points: state.attribute_points,
        }
    }
}

/// Character snapshot recorded against an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCharacter {
    pub id: ActionCharacterId,
    pub action_id: ActionId,
    pub character_instance_id: CharacterInstanceId,
    pub record_type: ActionRecordType,
    #[serde(flatten)]
    pub snapshot: CombatantSnapshot,
    pub created_at: DateTime<Utc>,
}

impl ActionCharacter {
    pub fn new(
        action_id: ActionId,
        character_instance_id: CharacterInstanceId,
        record_type: ActionRecordType,
        snapshot: CombatantSnapshot,
    ) -> Self {
        Self {
            id: ActionCharacterId::new(),
            action_id,
            character_instance_id,
            record_type,
            snapshot,
            created_at: Utc::now(),
        }
    }
}

/// Monster snapshot recorded against an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMonster {
    pub id: ActionMonsterId,
    pub action_id: ActionId,
    pub monster_instance_id: MonsterInstanceId,
    pub record_type: ActionRecordType,
    #[serde(flatten)]
    pub snapshot: CombatantSnapshot,
    pub created_at: DateTime<Utc>,
}

impl ActionMonster {
    pub fn new(
        action_id: ActionId,
        monster_instance_id: MonsterInstanceId,
        record_type: ActionRecordType,
        snapshot: CombatantSnapshot,
    ) -> Self {
        Self {
            id: ActionMonsterId::new(),
            action_id,
            monster_instance_id,
            record_type,
            snapshot,
            created_at: Utc::now(),
        }
    }
}

/// Carried-object row belonging to an [`ActionCharacter`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCharacterObject {
    pub id: ActionCharacterObjectId,
    pub action_id: ActionId,
    pub action_character_id: ActionCharacterId,
    pub object_instance_id: ObjectInstanceId,
    pub name: String,
    pub is_equipped: bool,
    pub is_stashed: bool,
    pub created_at: DateTime<Utc>,
}

impl ActionCharacterObject {
    pub fn new(action_character: &ActionCharacter, object: &ObjectInstance) -> Self {
        Self {
            id: ActionCharacterObjectId::new(),
            action_id: action_character.action_id,
            action_character_id: action_character.id,
            object_instance_id: object.id,
            name: object.name.clone(),
            is_equipped: object.is_equipped(),
            is_stashed: object.is_stashed(),
            created_at: Utc::now(),
        }
    }
}

/// Carried-object row belonging to an [`ActionMonster`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMonsterObject {
    pub id: ActionMonsterObjectId,
    pub action_id: ActionId,
    pub action_monster_id: ActionMonsterId,
    pub object_instance_id: ObjectInstanceId,
    pub name: String,
    pub is_equipped: bool,
    pub is_stashed: bool,
    pub created_at: DateTime<Utc>,
}

impl ActionMonsterObject {
    pub fn new(action_monster: &ActionMonster, object: &ObjectInstance) -> Self {
        Self {
            id: ActionMonsterObjectId::new(),
            action_id: action_monster.action_id,
            action_monster_id: action_monster.id,
            object_instance_id: object.id,
            name: object.name.clone(),
            is_equipped: object.is_equipped(),
            is_stashed: object.is_stashed(),
            created_at: Utc::now(),
        }
    }
}

/// Why an object snapshot was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionObjectRecordType {
    Equipped,
    Stashed,
    Dropped,
    Target,
}

/// Object snapshot recorded against an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionObject {
    pub id: ActionObjectId,
    pub action_id: ActionId,
    pub object_instance_id: ObjectInstanceId,
    pub record_type: ActionObjectRecordType,
    pub name: String,
    pub description: String,
    pub is_equipped: bool,
    pub is_stashed: bool,
    pub location_instance_id: Option<LocationInstanceId>,
    pub character_instance_id: Option<CharacterInstanceId>,
    pub monster_instance_id: Option<MonsterInstanceId>,
    pub created_at: DateTime<Utc>,
}

impl ActionObject {
    pub fn new(
        action_id: ActionId,
        record_type: ActionObjectRecordType,
        object: &ObjectInstance,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ActionObjectId::new(),
            action_id,
            object_instance_id: object.id,
            record_type,
            name: object.name.clone(),
            description: description.into(),
            is_equipped: object.is_equipped(),
            is_stashed: object.is_stashed(),
            location_instance_id: object.location_instance_id(),
            character_instance_id: object.character_instance_id(),
            monster_instance_id: object.monster_instance_id(),
            created_at: Utc::now(),
        }
    }
}
