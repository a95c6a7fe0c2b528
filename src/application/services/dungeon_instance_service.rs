//! Dungeon Instance Service - Entering, leaving and advancing playthroughs
//!
//! Characters entering a dungeon join the oldest instance that still has
//! room, or a freshly populated one. An instance never holds more live
//! characters than its dungeon has locations.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::application::errors::ActionError;
use crate::application::ports::outbound::{
    Filter, InstanceCapacity, LockMode, StorePort, TransactionPort,
};
use crate::application::repositories::Repositories;
use crate::domain::entities::{
    Carry, CharacterInstance, DungeonInstance, LocationInstance, MonsterInstance, Object,
    ObjectInstance, ObjectOwner,
};
use crate::domain::value_objects::{
    CharacterId, CharacterInstanceId, DungeonId, DungeonInstanceId, LocationId,
    LocationInstanceId, ObjectId,
};

/// Dungeon instance use cases
#[async_trait]
pub trait DungeonInstanceService: Send + Sync {
    /// Place a character in an instance of a dungeon, creating one if needed
    async fn character_enter_dungeon(
        &self,
        dungeon_id: DungeonId,
        character_id: CharacterId,
    ) -> Result<CharacterInstance, ActionError>;

    /// Remove a character from its instance, leaving its objects behind
    async fn character_exit_dungeon(
        &self,
        dungeon_instance_id: DungeonInstanceId,
        character_instance_id: CharacterInstanceId,
    ) -> Result<Vec<ObjectInstance>, ActionError>;

    /// Move a dungeon instance on to its next turn
    async fn advance_turn(
        &self,
        dungeon_instance_id: DungeonInstanceId,
    ) -> Result<DungeonInstance, ActionError>;
}

pub struct DungeonInstanceServiceImpl<S: StorePort> {
    store: Arc<S>,
    repositories: Repositories,
}

impl<S: StorePort> DungeonInstanceServiceImpl<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            repositories: Repositories::new(),
        }
    }

    async fn enter<T: TransactionPort>(
        &self,
        tx: &mut T,
        dungeon_id: DungeonId,
        character_id: CharacterId,
    ) -> Result<CharacterInstance, ActionError> {
        let repos = &self.repositories;
        let character = repos
            .characters
            .get_one(tx, character_id, LockMode::None)
            .await?
            .ok_or_else(|| ActionError::not_found(format!("character {}", character_id)))?;

        if let Some(existing) = self.live_instance(tx, dungeon_id, character_id).await? {
            debug!(character_instance_id = %existing.id, "Character already inside dungeon");
            return Ok(existing);
        }

        let capacities = tx.instance_capacities(dungeon_id).await?;
        let dungeon_instance = match self.instance_with_room(tx, capacities).await? {
            Some(instance) => instance,
            None => self.create_instance(tx, dungeon_id).await?,
        };

        let entrance = repos
            .location_instances
            .get_many(
                tx,
                &[
                    Filter::eq("dungeon_instance_id", dungeon_instance.id),
                    Filter::eq("is_default", true),
                ],
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ActionError::not_found(format!(
                    "default location in dungeon instance {}",
                    dungeon_instance.id
                ))
            })?;

        let instance = CharacterInstance::new(
            &character,
            dungeon_instance.id,
            entrance.id,
            dungeon_instance.turn_number,
        );
        let instance = repos.character_instances.create(tx, &instance).await?;

        let mut objects = ObjectCache::default();
        let inventory = repos
            .character_objects
            .get_many(tx, &[Filter::eq("character_id", character_id)])
            .await?;
        for entry in inventory {
            let object = objects.get(repos, tx, entry.object_id).await?;
            let carry = carry_for(entry.is_equipped);
            let owned = ObjectInstance::carried(
                &object,
                dungeon_instance.id,
                ObjectOwner::Character(instance.id),
                carry,
            );
            repos.object_instances.create(tx, &owned).await?;
        }

        info!(
            character_instance_id = %instance.id,
            dungeon_instance_id = %dungeon_instance.id,
            location = %entrance.name,
            "Character entered dungeon"
        );
        Ok(instance)
    }

    /// The character's existing instance inside any instance of the dungeon
    async fn live_instance<T: TransactionPort>(
        &self,
        tx: &mut T,
        dungeon_id: DungeonId,
        character_id: CharacterId,
    ) -> Result<Option<CharacterInstance>, ActionError> {
        let instance_ids: HashSet<DungeonInstanceId> = self
            .repositories
            .dungeon_instances
            .get_many(tx, &[Filter::eq("dungeon_id", dungeon_id)])
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect();
        if instance_ids.is_empty() {
            return Ok(None);
        }

        Ok(self
            .repositories
            .character_instances
            .get_many(
                tx,
                &[
                    Filter::eq("character_id", character_id),
                    Filter::any_of("dungeon_instance_id", instance_ids),
                ],
            )
            .await?
            .into_iter()
            .next())
    }

    /// Lock the oldest instance that still has room
    ///
    /// `capacities` may be stale by the time a row lock is held, so every
    /// candidate is recounted under its lock. One that filled up in the
    /// meantime is skipped; one holding more characters than locations
    /// breaks the capacity invariant.
    async fn instance_with_room<T: TransactionPort>(
        &self,
        tx: &mut T,
        capacities: Vec<InstanceCapacity>,
    ) -> Result<Option<DungeonInstance>, ActionError> {
        for capacity in capacities.into_iter().filter(|c| c.has_room()) {
            let Some(instance) = self
                .repositories
                .dungeon_instances
                .get_one(tx, capacity.dungeon_instance_id, LockMode::ForUpdateSkipLocked)
                .await?
            else {
                debug!(dungeon_instance_id = %capacity.dungeon_instance_id, "Instance busy, skipping");
                continue;
            };

            let character_count = self
                .repositories
                .character_instances
                .get_many(tx, &[Filter::eq("dungeon_instance_id", instance.id)])
                .await?
                .len() as i64;
            if character_count > capacity.location_count {
                return Err(ActionError::CapacityInvariant {
                    dungeon_instance_id: instance.id,
                    character_count,
                    location_count: capacity.location_count,
                });
            }
            if character_count == capacity.location_count {
                warn!(
                    dungeon_instance_id = %instance.id,
                    character_count,
                    location_count = capacity.location_count,
                    "Instance filled up under lock, trying the next one"
                );
                continue;
            }
            return Ok(Some(instance));
        }

        Ok(None)
    }

    /// Clone the dungeon template into a new, populated instance
    async fn create_instance<T: TransactionPort>(
        &self,
        tx: &mut T,
        dungeon_id: DungeonId,
    ) -> Result<DungeonInstance, ActionError> {
        let repos = &self.repositories;
        let dungeon = repos
            .dungeons
            .get_one(tx, dungeon_id, LockMode::None)
            .await?
            .ok_or_else(|| ActionError::not_found(format!("dungeon {}", dungeon_id)))?;
        let locations = repos
            .locations
            .get_many(tx, &[Filter::eq("dungeon_id", dungeon_id)])
            .await?;
        if !locations.iter().any(|l| l.is_default) {
            return Err(ActionError::not_found(format!(
                "default location in dungeon {}",
                dungeon.name
            )));
        }

        let instance = repos
            .dungeon_instances
            .create(tx, &DungeonInstance::new(&dungeon))
            .await?;

        let location_ids: HashMap<LocationId, LocationInstanceId> = locations
            .iter()
            .map(|l| (l.id, LocationInstanceId::new()))
            .collect();
        for location in &locations {
            let exits = location.exits.try_map(|to| {
                location_ids.get(&to).copied().ok_or_else(|| {
                    ActionError::not_found(format!("location {} linked from {}", to, location.name))
                })
            })?;
            let location_instance =
                LocationInstance::from_template(instance.id, location_ids[&location.id], location, exits);
            repos.location_instances.create(tx, &location_instance).await?;
        }

        let template_ids = location_ids.keys().copied();
        let mut objects = ObjectCache::default();

        let placed_objects = repos
            .location_objects
            .get_many(tx, &[Filter::any_of("location_id", template_ids.clone())])
            .await?;
        for placement in placed_objects {
            let object = objects.get(repos, tx, placement.object_id).await?;
            let object_instance =
                ObjectInstance::at_location(&object, instance.id, location_ids[&placement.location_id]);
            repos.object_instances.create(tx, &object_instance).await?;
        }

        let placed_monsters = repos
            .location_monsters
            .get_many(tx, &[Filter::any_of("location_id", template_ids)])
            .await?;
        for placement in placed_monsters {
            let monster = repos
                .monsters
                .get_one(tx, placement.monster_id, LockMode::None)
                .await?
                .ok_or_else(|| ActionError::not_found(format!("monster {}", placement.monster_id)))?;
            let monster_instance = MonsterInstance::new(
                &monster,
                instance.id,
                location_ids[&placement.location_id],
            );
            let monster_instance = repos.monster_instances.create(tx, &monster_instance).await?;

            let inventory = repos
                .monster_objects
                .get_many(tx, &[Filter::eq("monster_id", monster.id)])
                .await?;
            for entry in inventory {
                let object = objects.get(repos, tx, entry.object_id).await?;
                let owned = ObjectInstance::carried(
                    &object,
                    instance.id,
                    ObjectOwner::Monster(monster_instance.id),
                    carry_for(entry.is_equipped),
                );
                repos.object_instances.create(tx, &owned).await?;
            }
        }

        info!(
            dungeon_instance_id = %instance.id,
            dungeon = %dungeon.name,
            locations = locations.len(),
            "Dungeon instance created"
        );
        Ok(instance)
    }

    async fn exit<T: TransactionPort>(
        &self,
        tx: &mut T,
        dungeon_instance_id: DungeonInstanceId,
        character_instance_id: CharacterInstanceId,
    ) -> Result<Vec<ObjectInstance>, ActionError> {
        let repos = &self.repositories;
        let character = repos
            .character_instances
            .get_one(tx, character_instance_id, LockMode::ForUpdate)
            .await?
            .filter(|c| c.dungeon_instance_id == dungeon_instance_id)
            .ok_or_else(|| {
                ActionError::not_found(format!(
                    "character instance {} in dungeon instance {}",
                    character_instance_id, dungeon_instance_id
                ))
            })?;

        let carried = repos
            .object_instances
            .get_many(tx, &[Filter::eq("character_instance_id", character.id)])
            .await?;
        let mut dropped = Vec::with_capacity(carried.len());
        for mut object in carried {
            object.drop_at(character.location_instance_id);
            dropped.push(repos.object_instances.update(tx, &object).await?);
        }

        repos.character_instances.delete(tx, character.id).await?;
        info!(
            character_instance_id = %character.id,
            dropped = dropped.len(),
            "Character left dungeon"
        );
        Ok(dropped)
    }

    async fn advance<T: TransactionPort>(
        &self,
        tx: &mut T,
        dungeon_instance_id: DungeonInstanceId,
    ) -> Result<DungeonInstance, ActionError> {
        let repos = &self.repositories;
        let locked = repos
            .dungeon_instances
            .get_one(tx, dungeon_instance_id, LockMode::ForUpdateSkipLocked)
            .await?;
        let mut instance = match locked {
            Some(instance) => instance,
            None => {
                let exists = repos
                    .dungeon_instances
                    .get_one(tx, dungeon_instance_id, LockMode::None)
                    .await?
                    .is_some();
                return Err(if exists {
                    ActionError::Concurrency(format!("dungeon instance {}", dungeon_instance_id))
                } else {
                    ActionError::not_found(format!("dungeon instance {}", dungeon_instance_id))
                });
            }
        };

        instance.advance_turn();
        let instance = repos.dungeon_instances.update(tx, &instance).await?;
        info!(
            dungeon_instance_id = %instance.id,
            turn_number = instance.turn_number,
            "Turn advanced"
        );
        Ok(instance)
    }
}

#[async_trait]
impl<S: StorePort> DungeonInstanceService for DungeonInstanceServiceImpl<S> {
    #[instrument(skip(self), fields(dungeon_id = %dungeon_id, character_id = %character_id))]
    async fn character_enter_dungeon(
        &self,
        dungeon_id: DungeonId,
        character_id: CharacterId,
    ) -> Result<CharacterInstance, ActionError> {
        let mut tx = self.store.begin().await?;
        match self.enter(&mut tx, dungeon_id, character_id).await {
            Ok(instance) => {
                tx.commit().await?;
                Ok(instance)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(dungeon_instance_id = %dungeon_instance_id))]
    async fn character_exit_dungeon(
        &self,
        dungeon_instance_id: DungeonInstanceId,
        character_instance_id: CharacterInstanceId,
    ) -> Result<Vec<ObjectInstance>, ActionError> {
        let mut tx = self.store.begin().await?;
        match self
            .exit(&mut tx, dungeon_instance_id, character_instance_id)
            .await
        {
            Ok(dropped) => {
                tx.commit().await?;
                Ok(dropped)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(dungeon_instance_id = %dungeon_instance_id))]
    async fn advance_turn(
        &self,
        dungeon_instance_id: DungeonInstanceId,
    ) -> Result<DungeonInstance, ActionError> {
        let mut tx = self.store.begin().await?;
        match self.advance(&mut tx, dungeon_instance_id).await {
            Ok(instance) => {
                tx.commit().await?;
                Ok(instance)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }
}

/// Carry state for a starting inventory entry; unflagged entries are stashed
fn carry_for(is_equipped: bool) -> Carry {
    if is_equipped {
        Carry::Equipped
    } else {
        Carry::Stashed
    }
}

/// Object templates read during one allocation
#[derive(Default)]
struct ObjectCache {
    objects: HashMap<ObjectId, Object>,
}

impl ObjectCache {
    async fn get<T: TransactionPort>(
        &mut self,
        repositories: &Repositories,
        tx: &mut T,
        id: ObjectId,
    ) -> Result<Object, ActionError> {
        if let Some(object) = self.objects.get(&id) {
            return Ok(object.clone());
        }
        let object = repositories
            .objects
            .get_one(tx, id, LockMode::None)
            .await?
            .ok_or_else(|| ActionError::not_found(format!("object {}", id)))?;
        self.objects.insert(id, object.clone());
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_fixtures::CaveFixture;
    use crate::domain::value_objects::Direction;

    #[tokio::test]
    async fn test_enter_populates_new_instance() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let di = barricade.dungeon_instance_id;

        assert!(barricade.name.starts_with("Barricade ("));
        assert_eq!(barricade.turn_number, 0);

        let entrance = cave.location_instance(di, &cave.entrance).await;
        let tunnel = cave.location_instance(di, &cave.tunnel).await;
        assert_eq!(barricade.location_instance_id, entrance.id);
        assert!(entrance.is_default);
        assert_eq!(entrance.exits.get(Direction::North), Some(tunnel.id));
        assert_eq!(tunnel.exits.get(Direction::South), Some(entrance.id));

        let dwarf = cave.dwarf_in(di).await;
        assert_eq!(dwarf.location_instance_id, entrance.id);

        let mace = cave.object_named(di, "Stone Mace").await;
        assert_eq!(mace.owner(), Some(ObjectOwner::Location(entrance.id)));
        let ring = cave.object_named(di, "Dull Bronze Ring").await;
        assert_eq!(ring.owner(), Some(ObjectOwner::Character(barricade.id)));
        assert!(ring.is_equipped());
        let dagger = cave.object_named(di, "Rusty Dagger").await;
        assert_eq!(dagger.owner(), Some(ObjectOwner::Monster(dwarf.id)));
    }

    #[tokio::test]
    async fn test_enter_twice_returns_existing_instance() {
        let cave = CaveFixture::seed().await;
        let first = cave.enter(&cave.barricade).await;
        let second = cave.enter(&cave.barricade).await;

        assert_eq!(first.id, second.id);
        let instances: Vec<CharacterInstance> = cave
            .find(&[Filter::eq("character_id", cave.barricade.id)])
            .await;
        assert_eq!(instances.len(), 1);
    }

    #[tokio::test]
    async fn test_full_instance_spills_into_new_one() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let legislate = cave.enter(&cave.legislate).await;
        let vanguard = cave.enter(&cave.vanguard).await;

        // Two locations, so two characters fit
        assert_eq!(barricade.dungeon_instance_id, legislate.dungeon_instance_id);
        assert_ne!(barricade.dungeon_instance_id, vanguard.dungeon_instance_id);

        let instances: Vec<DungeonInstance> = cave
            .find(&[Filter::eq("dungeon_id", cave.dungeon.id)])
            .await;
        assert_eq!(instances.len(), 2);

        // Each instance gets its own dwarf
        let first = cave.dwarf_in(barricade.dungeon_instance_id).await;
        let second = cave.dwarf_in(vanguard.dungeon_instance_id).await;
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_exit_frees_room_and_leaves_objects_behind() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let legislate = cave.enter(&cave.legislate).await;
        let di = barricade.dungeon_instance_id;

        let dropped = cave
            .instances()
            .character_exit_dungeon(di, barricade.id)
            .await
            .unwrap();
        assert_eq!(dropped.len(), 1);
        assert!(dropped[0].name.starts_with("Dull Bronze Ring ("));

        let ring = cave.object_named(di, "Dull Bronze Ring").await;
        assert_eq!(
            ring.owner(),
            Some(ObjectOwner::Location(barricade.location_instance_id))
        );
        assert!(cave
            .reload::<CharacterInstance>(barricade.id)
            .await
            .is_none());

        let vanguard = cave.enter(&cave.vanguard).await;
        assert_eq!(vanguard.dungeon_instance_id, legislate.dungeon_instance_id);
    }

    #[tokio::test]
    async fn test_exit_from_wrong_instance_is_not_found() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let err = cave
            .instances()
            .character_exit_dungeon(DungeonInstanceId::new(), barricade.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
        assert!(cave
            .reload::<CharacterInstance>(barricade.id)
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_advance_turn() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let instance = cave
            .instances()
            .advance_turn(barricade.dungeon_instance_id)
            .await
            .unwrap();
        assert_eq!(instance.turn_number, 1);

        // Late arrivals join at the current turn
        let legislate = cave.enter(&cave.legislate).await;
        assert_eq!(legislate.turn_number, 1);

        let err = cave
            .instances()
            .advance_turn(DungeonInstanceId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_dungeon_or_character_is_not_found() {
        let cave = CaveFixture::seed().await;

        let err = cave
            .instances()
            .character_enter_dungeon(DungeonId::new(), cave.barricade.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));

        let err = cave
            .instances()
            .character_enter_dungeon(cave.dungeon.id, CharacterId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_instance_filled_after_capacity_read_is_skipped() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let service = cave.instances();

        let mut tx = cave.store.begin().await.unwrap();
        let capacities = tx.instance_capacities(cave.dungeon.id).await.unwrap();
        assert_eq!(capacities.len(), 1);
        assert!(capacities[0].has_room());

        let legislate = cave.enter(&cave.legislate).await;
        assert_eq!(legislate.dungeon_instance_id, barricade.dungeon_instance_id);

        let chosen = service.instance_with_room(&mut tx, capacities).await.unwrap();
        assert!(chosen.is_none());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_overfull_instance_breaks_capacity_invariant() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let di = barricade.dungeon_instance_id;
        let service = cave.instances();
        let repositories = Repositories::new();

        let mut tx = cave.store.begin().await.unwrap();
        let capacities = tx.instance_capacities(cave.dungeon.id).await.unwrap();
        for character in [&cave.legislate, &cave.vanguard] {
            let extra = CharacterInstance::new(character, di, barricade.location_instance_id, 0);
            repositories.character_instances.create(&mut tx, &extra).await.unwrap();
        }

        let err = service.instance_with_room(&mut tx, capacities).await.unwrap_err();
        assert!(matches!(
            err,
            ActionError::CapacityInvariant {
                character_count: 3,
                location_count: 2,
                ..
            }
        ));
        tx.rollback().await.unwrap();
    }

    #[test]
    fn test_unflagged_inventory_is_stashed() {
        assert_eq!(carry_for(true), Carry::Equipped);
        assert_eq!(carry_for(false), Carry::Stashed);
    }
}
