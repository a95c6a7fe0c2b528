//! Seeded "Cave" dungeon shared by service tests

use std::sync::Arc;

use crate::application::dto::ActionRecordSet;
use crate::application::errors::ActionError;
use crate::application::ports::outbound::{Filter, LockMode, StorePort, TransactionPort};
use crate::application::repositories::{Record, Repositories, Repository};
use crate::application::services::{
    ActionRequest, ActionService, ActionServiceImpl, ActorRef, DungeonInstanceService,
    DungeonInstanceServiceImpl,
};
use crate::domain::entities::{
    Action, Character, CharacterInstance, CharacterObject, Dungeon, Location, LocationInstance,
    LocationMonster, LocationObject, Monster, MonsterInstance, MonsterObject, Object,
    ObjectInstance,
};
use crate::domain::value_objects::{Attributes, Direction, DungeonInstanceId};
use crate::infrastructure::persistence::InMemoryStore;

pub(crate) const CHARACTER_STATS: Attributes = Attributes {
    strength: 10,
    dexterity: 10,
    intelligence: 10,
    health: 20,
    fatigue: 10,
};

pub(crate) const DWARF_STATS: Attributes = Attributes {
    strength: 8,
    dexterity: 8,
    intelligence: 8,
    health: 15,
    fatigue: 8,
};

/// Two-room cave: the entrance (default) leads north into a tunnel
///
/// The entrance holds a Stone Mace and a Grumpy Dwarf carrying a Rusty
/// Dagger. Barricade starts with a Dull Bronze Ring equipped.
pub(crate) struct CaveFixture {
    pub store: Arc<InMemoryStore>,
    pub dungeon: Dungeon,
    pub entrance: Location,
    pub tunnel: Location,
    pub barricade: Character,
    pub legislate: Character,
    pub vanguard: Character,
    pub dwarf: Monster,
}

impl CaveFixture {
    pub async fn seed() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let repos = Repositories::new();
        let mut tx = store.begin().await.unwrap();

        let dungeon = Dungeon::new("Cave").with_description("A damp cave");
        let mut entrance = Location::new(dungeon.id, "Cave Entrance")
            .with_description("Daylight fades behind you")
            .as_default();
        let tunnel = Location::new(dungeon.id, "Cave Tunnel")
            .with_description("A narrow tunnel")
            .with_exit(Direction::South, entrance.id);
        entrance = entrance.with_exit(Direction::North, tunnel.id);

        let barricade = Character::new("Barricade", CHARACTER_STATS);
        let legislate = Character::new("Legislate", CHARACTER_STATS);
        let vanguard = Character::new("Vanguard", CHARACTER_STATS);
        let dwarf = Monster::new("Grumpy Dwarf", DWARF_STATS);

        let mace = Object::new("Stone Mace").with_description("A heavy mace", "Chipped stone on oak");
        let ring = Object::new("Dull Bronze Ring").with_description("A ring", "Green with age");
        let dagger = Object::new("Rusty Dagger").with_description("A dagger", "More rust than blade");

        repos.dungeons.create(&mut tx, &dungeon).await.unwrap();
        repos.locations.create(&mut tx, &entrance).await.unwrap();
        repos.locations.create(&mut tx, &tunnel).await.unwrap();
        for character in [&barricade, &legislate, &vanguard] {
            repos.characters.create(&mut tx, character).await.unwrap();
        }
        repos.monsters.create(&mut tx, &dwarf).await.unwrap();
        for object in [&mace, &ring, &dagger] {
            repos.objects.create(&mut tx, object).await.unwrap();
        }
        repos
            .location_objects
            .create(&mut tx, &LocationObject::new(entrance.id, mace.id))
            .await
            .unwrap();
        repos
            .location_monsters
            .create(&mut tx, &LocationMonster::new(entrance.id, dwarf.id))
            .await
            .unwrap();
        repos
            .monster_objects
            .create(&mut tx, &MonsterObject::equipped(dwarf.id, dagger.id))
            .await
            .unwrap();
        repos
            .character_objects
            .create(&mut tx, &CharacterObject::equipped(barricade.id, ring.id))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        Self {
            store,
            dungeon,
            entrance,
            tunnel,
            barricade,
            legislate,
            vanguard,
            dwarf,
        }
    }

    pub fn actions(&self) -> ActionServiceImpl<InMemoryStore> {
        ActionServiceImpl::new(Arc::clone(&self.store))
    }

    pub fn instances(&self) -> DungeonInstanceServiceImpl<InMemoryStore> {
        DungeonInstanceServiceImpl::new(Arc::clone(&self.store))
    }

    pub async fn enter(&self, character: &Character) -> CharacterInstance {
        self.instances()
            .character_enter_dungeon(self.dungeon.id, character.id)
            .await
            .unwrap()
    }

    pub async fn act(
        &self,
        actor: &CharacterInstance,
        sentence: &str,
    ) -> Result<ActionRecordSet, ActionError> {
        self.actions()
            .process_action(ActionRequest::new(
                actor.dungeon_instance_id,
                ActorRef::Character(actor.id),
                sentence,
            ))
            .await
    }

    pub async fn advance(&self, dungeon_instance_id: DungeonInstanceId) {
        self.instances()
            .advance_turn(dungeon_instance_id)
            .await
            .unwrap();
    }

    /// Committed state of one record
    pub async fn reload<E: Record>(&self, id: E::Id) -> Option<E> {
        let mut tx = self.store.begin().await.unwrap();
        let found = Repository::<E>::new()
            .get_one(&mut tx, id, LockMode::None)
            .await
            .unwrap();
        tx.rollback().await.unwrap();
        found
    }

    /// Committed records matching all filters
    pub async fn find<E: Record>(&self, filters: &[Filter]) -> Vec<E> {
        let mut tx = self.store.begin().await.unwrap();
        let found = Repository::<E>::new().get_many(&mut tx, filters).await.unwrap();
        tx.rollback().await.unwrap();
        found
    }

    pub async fn actions_in(&self, dungeon_instance_id: DungeonInstanceId) -> Vec<Action> {
        self.find(&[Filter::eq("dungeon_instance_id", dungeon_instance_id)])
            .await
    }

    pub async fn location_instance(
        &self,
        dungeon_instance_id: DungeonInstanceId,
        template: &Location,
    ) -> LocationInstance {
        self.find(&[
            Filter::eq("dungeon_instance_id", dungeon_instance_id),
            Filter::eq("location_id", template.id),
        ])
        .await
        .into_iter()
        .next()
        .unwrap()
    }

    pub async fn dwarf_in(&self, dungeon_instance_id: DungeonInstanceId) -> MonsterInstance {
        self.find(&[
            Filter::eq("dungeon_instance_id", dungeon_instance_id),
            Filter::eq("monster_id", self.dwarf.id),
        ])
        .await
        .into_iter()
        .next()
        .unwrap()
    }

    /// The single object instance in a dungeon instance whose name starts with `name`
    pub async fn object_named(
        &self,
        dungeon_instance_id: DungeonInstanceId,
        name: &str,
    ) -> ObjectInstance {
        let prefix = format!("{} (", name);
        self.find::<ObjectInstance>(&[Filter::eq("dungeon_instance_id", dungeon_instance_id)])
            .await
            .into_iter()
            .find(|o| o.name.starts_with(&prefix))
            .unwrap()
    }
}
