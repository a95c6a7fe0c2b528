//! Domain entities - Templates, live instances and action history

mod action;
mod creature;
mod creature_instance;
mod dungeon;
mod dungeon_instance;
mod object;
mod object_instance;

pub use action::{
    Action, ActionCharacter, ActionCharacterObject, ActionMonster, ActionMonsterObject,
    ActionObject, ActionObjectRecordType, ActionRecordType, CombatantState,
};
pub use creature::{Character, Monster};
pub use creature_instance::{CharacterInstance, MonsterInstance};
pub use dungeon::{Dungeon, Location};
pub use dungeon_instance::{DungeonInstance, LocationInstance};
pub use object::{CharacterObject, LocationMonster, LocationObject, MonsterObject, Object};
pub use object_instance::{Carry, ObjectInstance, ObjectOwner};
