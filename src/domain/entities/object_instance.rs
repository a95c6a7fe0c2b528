//! Object placements and their ownership state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Object;
use crate::domain::services::naming::instance_name;
use crate::domain::value_objects::{
    CharacterInstanceId, DungeonInstanceId, LocationInstanceId, MonsterInstanceId, ObjectId,
    ObjectInstanceId,
};

/// Who currently holds an object instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectOwner {
    Location(LocationInstanceId),
    Character(CharacterInstanceId),
    Monster(MonsterInstanceId),
}

/// How a creature carries an object it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Carry {
    Equipped,
    Stashed,
}

/// An object placed in a dungeon instance
///
/// Owner references and carry flags are only changed through the methods
/// below, which keep exactly one owner set and never both flags raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInstance {
    pub id: ObjectInstanceId,
    pub object_id: ObjectId,
    pub dungeon_instance_id: DungeonInstanceId,
    pub name: String,
    location_instance_id: Option<LocationInstanceId>,
    character_instance_id: Option<CharacterInstanceId>,
    monster_instance_id: Option<MonsterInstanceId>,
    is_equipped: bool,
    is_stashed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ObjectInstance {
    /// Instantiate an object lying on the ground
    pub fn at_location(
        object: &Object,
        dungeon_instance_id: DungeonInstanceId,
        location_instance_id: LocationInstanceId,
    ) -> Self {
        Self::build(object, dungeon_instance_id, ObjectOwner::Location(location_instance_id), None)
    }

    /// Instantiate an object carried by a creature
    pub fn carried(
        object: &Object,
        dungeon_instance_id: DungeonInstanceId,
        owner: ObjectOwner,
        carry: Carry,
    ) -> Self {
        Self::build(object, dungeon_instance_id, owner, Some(carry))
    }

    fn build(
        object: &Object,
        dungeon_instance_id: DungeonInstanceId,
        owner: ObjectOwner,
        carry: Option<Carry>,
    ) -> Self {
        let id = ObjectInstanceId::new();
        let mut instance = Self {
            id,
            object_id: object.id,
            dungeon_instance_id,
            name: instance_name(&object.name, &id.short_token()),
            location_instance_id: None,
            character_instance_id: None,
            monster_instance_id: None,
            is_equipped: carry == Some(Carry::Equipped),
            is_stashed: carry == Some(Carry::Stashed),
            created_at: Utc::now(),
            updated_at: None,
        };
        instance.set_owner(owner);
        instance
    }

    /// Current owner, `None` only for a row that lost its owner reference
    pub fn owner(&self) -> Option<ObjectOwner> {
        match (
            self.location_instance_id,
            self.character_instance_id,
            self.monster_instance_id,
        ) {
            (_, Some(character), _) => Some(ObjectOwner::Character(character)),
            (_, _, Some(monster)) => Some(ObjectOwner::Monster(monster)),
            (Some(location), _, _) => Some(ObjectOwner::Location(location)),
            (None, None, None) => None,
        }
    }

    pub fn location_instance_id(&self) -> Option<LocationInstanceId> {
        self.location_instance_id
    }

    pub fn character_instance_id(&self) -> Option<CharacterInstanceId> {
        self.character_instance_id
    }

    pub fn monster_instance_id(&self) -> Option<MonsterInstanceId> {
        self.monster_instance_id
    }

    pub fn is_equipped(&self) -> bool {
        self.is_equipped
    }

    pub fn is_stashed(&self) -> bool {
        self.is_stashed
    }

    pub fn carry(&self) -> Option<Carry> {
        match (self.is_equipped, self.is_stashed) {
            (true, _) => Some(Carry::Equipped),
            (_, true) => Some(Carry::Stashed),
            _ => None,
        }
    }

    pub fn is_owned_by(&self, owner: ObjectOwner) -> bool {
        self.owner() == Some(owner)
    }

    /// Hand the object to `owner`, carried as `carry`
    pub fn take(&mut self, owner: ObjectOwner, carry: Carry) {
        self.set_owner(owner);
        self.is_equipped = carry == Carry::Equipped;
        self.is_stashed = carry == Carry::Stashed;
        self.updated_at = Some(Utc::now());
    }

    /// Put the object down at a location, clearing both carry flags
    pub fn drop_at(&mut self, location_instance_id: LocationInstanceId) {
        self.set_owner(ObjectOwner::Location(location_instance_id));
        self.is_equipped = false;
        self.is_stashed = false;
        self.updated_at = Some(Utc::now());
    }

    fn set_owner(&mut self, owner: ObjectOwner) {
        self.location_instance_id = None;
        self.character_instance_id = None;
        self.monster_instance_id = None;
        match owner {
            ObjectOwner::Location(id) => self.location_instance_id = Some(id),
            ObjectOwner::Character(id) => self.character_instance_id = Some(id),
            ObjectOwner::Monster(id) => self.monster_instance_id = Some(id),
        }
    }

    /// True when exactly one owner is set and the carry flags are exclusive
    pub fn is_consistent(&self) -> bool {
        let owners = [
            self.location_instance_id.is_some(),
            self.character_instance_id.is_some(),
            self.monster_instance_id.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        let carried = self.character_instance_id.is_some() || self.monster_instance_id.is_some();
        owners == 1 && !(self.is_equipped && self.is_stashed) && (carried || self.carry().is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Object {
        Object::new("Dull Bronze Ring")
    }

    #[test]
    fn test_take_and_drop_keep_single_owner() {
        let location = LocationInstanceId::new();
        let character = CharacterInstanceId::new();
        let mut instance = ObjectInstance::at_location(&ring(), DungeonInstanceId::new(), location);
        assert_eq!(instance.owner(), Some(ObjectOwner::Location(location)));

        instance.take(ObjectOwner::Character(character), Carry::Equipped);
        assert_eq!(instance.owner(), Some(ObjectOwner::Character(character)));
        assert!(instance.location_instance_id().is_none());
        assert!(instance.is_equipped() && !instance.is_stashed());
        assert!(instance.is_consistent());

        instance.take(ObjectOwner::Character(character), Carry::Stashed);
        assert!(!instance.is_equipped() && instance.is_stashed());

        instance.drop_at(location);
        assert_eq!(instance.owner(), Some(ObjectOwner::Location(location)));
        assert_eq!(instance.carry(), None);
        assert!(instance.is_consistent());
    }

    #[test]
    fn test_carried_constructor_sets_monster_owner() {
        let monster = MonsterInstanceId::new();
        let instance = ObjectInstance::carried(
            &ring(),
            DungeonInstanceId::new(),
            ObjectOwner::Monster(monster),
            Carry::Stashed,
        );
        assert_eq!(instance.owner(), Some(ObjectOwner::Monster(monster)));
        assert_eq!(instance.carry(), Some(Carry::Stashed));
        assert!(instance.is_consistent());
    }

    #[test]
    fn test_name_carries_unique_suffix() {
        let instance =
            ObjectInstance::at_location(&ring(), DungeonInstanceId::new(), LocationInstanceId::new());
        assert!(instance.name.starts_with("Dull Bronze Ring ("));
        assert!(instance.name.ends_with(')'));
    }
}
