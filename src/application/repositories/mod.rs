//! Typed repositories over the record store port

pub mod records;
mod repository;

pub use repository::{Record, Repository};

use crate::domain::entities::{
    Action, ActionCharacter, ActionCharacterObject, ActionMonster, ActionMonsterObject,
    ActionObject, Character, CharacterInstance, CharacterObject, Dungeon, DungeonInstance,
    Location, LocationInstance, LocationMonster, LocationObject, Monster, MonsterInstance,
    MonsterObject, Object, ObjectInstance,
};

/// One repository per stored entity kind
#[derive(Default)]
pub struct Repositories {
    pub dungeons: Repository<Dungeon>,
    pub locations: Repository<Location>,
    pub characters: Repository<Character>,
    pub monsters: Repository<Monster>,
    pub objects: Repository<Object>,
    pub location_objects: Repository<LocationObject>,
    pub location_monsters: Repository<LocationMonster>,
    pub monster_objects: Repository<MonsterObject>,
    pub character_objects: Repository<CharacterObject>,
    pub dungeon_instances: Repository<DungeonInstance>,
    pub location_instances: Repository<LocationInstance>,
    pub character_instances: Repository<CharacterInstance>,
    pub monster_instances: Repository<MonsterInstance>,
    pub object_instances: Repository<ObjectInstance>,
    pub actions: Repository<Action>,
    pub action_characters: Repository<ActionCharacter>,
    pub action_monsters: Repository<ActionMonster>,
    pub action_character_objects: Repository<ActionCharacterObject>,
    pub action_monster_objects: Repository<ActionMonsterObject>,
    pub action_objects: Repository<ActionObject>,
}

impl Repositories {
    pub fn new() -> Self {
        Self::default()
    }
}
