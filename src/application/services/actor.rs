//! The entity issuing a command: a character or a monster instance

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::outbound::{Filter, StoreError, TransactionPort};
use crate::application::repositories::Repositories;
use crate::domain::entities::{CharacterInstance, MonsterInstance, ObjectOwner};
use crate::domain::value_objects::{
    Attributes, CharacterInstanceId, DungeonInstanceId, LocationInstanceId, MonsterInstanceId,
};

/// Reference to an actor by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRef {
    Character(CharacterInstanceId),
    Monster(MonsterInstanceId),
}

impl ActorRef {
    pub fn uuid(&self) -> Uuid {
        match self {
            ActorRef::Character(id) => (*id).into(),
            ActorRef::Monster(id) => (*id).into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ActorRef::Character(_) => "character instance",
            ActorRef::Monster(_) => "monster instance",
        }
    }

    pub fn owner(&self) -> ObjectOwner {
        match self {
            ActorRef::Character(id) => ObjectOwner::Character(*id),
            ActorRef::Monster(id) => ObjectOwner::Monster(*id),
        }
    }

    /// Filter selecting rows that reference this actor
    pub fn filter(&self) -> Filter {
        match self {
            ActorRef::Character(id) => Filter::eq("character_instance_id", *id),
            ActorRef::Monster(id) => Filter::eq("monster_instance_id", *id),
        }
    }
}

impl std::fmt::Display for ActorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.uuid())
    }
}

/// A loaded actor
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Character(CharacterInstance),
    Monster(MonsterInstance),
}

impl Actor {
    pub fn reference(&self) -> ActorRef {
        match self {
            Actor::Character(c) => ActorRef::Character(c.id),
            Actor::Monster(m) => ActorRef::Monster(m.id),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Actor::Character(c) => &c.name,
            Actor::Monster(m) => &m.name,
        }
    }

    pub fn dungeon_instance_id(&self) -> DungeonInstanceId {
        match self {
            Actor::Character(c) => c.dungeon_instance_id,
            Actor::Monster(m) => m.dungeon_instance_id,
        }
    }

    pub fn location_instance_id(&self) -> LocationInstanceId {
        match self {
            Actor::Character(c) => c.location_instance_id,
            Actor::Monster(m) => m.location_instance_id,
        }
    }

    pub fn attributes(&self) -> Attributes {
        match self {
            Actor::Character(c) => c.attributes,
            Actor::Monster(m) => m.attributes,
        }
    }

    pub fn turn_number(&self) -> i64 {
        match self {
            Actor::Character(c) => c.turn_number,
            Actor::Monster(m) => m.turn_number,
        }
    }

    pub fn owner(&self) -> ObjectOwner {
        self.reference().owner()
    }

    pub fn move_to(&mut self, location_instance_id: LocationInstanceId) {
        match self {
            Actor::Character(c) => c.location_instance_id = location_instance_id,
            Actor::Monster(m) => m.location_instance_id = location_instance_id,
        }
    }

    pub fn set_attributes(&mut self, attributes: Attributes) {
        match self {
            Actor::Character(c) => c.attributes = attributes,
            Actor::Monster(m) => m.attributes = attributes,
        }
    }

    /// Mark the actor as having acted in `turn_number`
    pub fn finish_turn(&mut self, turn_number: i64) {
        let now = Some(Utc::now());
        match self {
            Actor::Character(c) => {
                c.turn_number = turn_number + 1;
                c.updated_at = now;
            }
            Actor::Monster(m) => {
                m.turn_number = turn_number + 1;
                m.updated_at = now;
            }
        }
    }

    pub async fn save<T: TransactionPort>(
        &self,
        repositories: &Repositories,
        tx: &mut T,
    ) -> Result<(), StoreError> {
        match self {
            Actor::Character(c) => {
                repositories.character_instances.update(tx, c).await?;
            }
            Actor::Monster(m) => {
                repositories.monster_instances.update(tx, m).await?;
            }
        }
        Ok(())
    }
}
