//! Action Service - Resolves one player or monster command per call
//!
//! Each call runs in a single transaction: parse, lock the actor, read its
//! surroundings, apply the verb, snapshot the result. Any failure rolls the
//! whole transaction back.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::application::dto::ActionRecordSet;
use crate::application::errors::ActionError;
use crate::application::ports::outbound::{StorePort, TransactionPort};
use crate::application::repositories::Repositories;
use crate::application::services::action_record_builder::ActionRecordBuilder;
use crate::application::services::action_resolver::ActionResolver;
use crate::application::services::actor::ActorRef;
use crate::application::services::target_resolver::LocationSnapshot;
use crate::application::services::turn_coordinator::TurnCoordinator;
use crate::domain::services::{parse_command, Command};
use crate::domain::value_objects::DungeonInstanceId;

/// A command submitted for an actor
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub dungeon_instance_id: DungeonInstanceId,
    pub actor: ActorRef,
    pub sentence: String,
}

impl ActionRequest {
    pub fn new(
        dungeon_instance_id: DungeonInstanceId,
        actor: ActorRef,
        sentence: impl Into<String>,
    ) -> Self {
        Self {
            dungeon_instance_id,
            actor,
            sentence: sentence.into(),
        }
    }
}

#[async_trait]
pub trait ActionService: Send + Sync {
    /// Resolve a sentence for an actor and return what it touched
    async fn process_action(&self, request: ActionRequest) -> Result<ActionRecordSet, ActionError>;
}

pub struct ActionServiceImpl<S: StorePort> {
    store: Arc<S>,
    repositories: Repositories,
}

impl<S: StorePort> ActionServiceImpl<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            repositories: Repositories::new(),
        }
    }

    async fn run<T: TransactionPort>(
        &self,
        tx: &mut T,
        request: &ActionRequest,
        command: &Command,
    ) -> Result<ActionRecordSet, ActionError> {
        let turns = TurnCoordinator::new(&self.repositories);
        let mut context = turns
            .begin_turn(tx, request.dungeon_instance_id, request.actor, command.verb)
            .await?;

        let snapshot = LocationSnapshot::load(&self.repositories, tx, &context.actor).await?;
        let resolution = ActionResolver::new(&self.repositories)
            .resolve(tx, &mut context, command, &snapshot)
            .await?;

        turns.complete_turn(tx, &mut context, command.verb).await?;

        ActionRecordBuilder::new(&self.repositories)
            .build(tx, &context, &request.sentence, &resolution)
            .await
    }
}

#[async_trait]
impl<S: StorePort> ActionService for ActionServiceImpl<S> {
    #[instrument(skip(self), fields(dungeon_instance_id = %request.dungeon_instance_id, actor = %request.actor))]
    async fn process_action(&self, request: ActionRequest) -> Result<ActionRecordSet, ActionError> {
        let command = parse_command(&request.sentence)?;

        let mut tx = self.store.begin().await?;
        let result = self.run(&mut tx, &request, &command).await;

        match result {
            Ok(record_set) if command.verb.consumes_turn() => {
                tx.commit().await?;
                info!(
                    action_id = %record_set.action.id,
                    turn_number = record_set.action.turn_number,
                    resolved = %record_set.action.resolved_command,
                    "Action committed"
                );
                Ok(record_set)
            }
            Ok(record_set) => {
                // Free actions leave nothing behind
                tx.rollback().await?;
                Ok(record_set)
            }
            Err(e) => {
                tx.rollback().await?;
                info!(error = %e, "Action rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::LockMode;
    use crate::application::repositories::records::CHARACTER_INSTANCE;
    use crate::application::services::test_fixtures::{CaveFixture, CHARACTER_STATS, DWARF_STATS};
    use crate::domain::entities::{CharacterInstance, MonsterInstance, ObjectOwner};
    use crate::domain::value_objects::{CharacterInstanceId, Direction};

    #[tokio::test]
    async fn test_look_describes_location_and_persists_nothing() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let record_set = cave.act(&barricade, "look").await.unwrap();

        assert_eq!(record_set.location.name, "Cave Entrance");
        assert!(record_set
            .location
            .characters
            .iter()
            .any(|c| c.name == barricade.name));
        assert!(record_set
            .location
            .monsters
            .iter()
            .any(|m| m.name.starts_with("Grumpy Dwarf (")));
        assert!(record_set
            .location
            .objects
            .iter()
            .any(|o| o.name.starts_with("Stone Mace (")));
        assert_eq!(record_set.location.directions, vec![Direction::North]);
        assert_eq!(record_set.action.resolved_command, "look");
        let source = record_set.character.unwrap();
        assert_eq!(source.record.snapshot.name, barricade.name);
        assert_eq!(source.objects.len(), 1);

        assert!(cave.actions_in(barricade.dungeon_instance_id).await.is_empty());
        let after: CharacterInstance = cave.reload(barricade.id).await.unwrap();
        assert_eq!(after.turn_number, 0);
    }

    #[tokio::test]
    async fn test_look_direction_describes_neighbour() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let record_set = cave.act(&barricade, "look north").await.unwrap();

        let target = record_set.target_location.unwrap();
        assert_eq!(target.name, "Cave Tunnel");
        assert_eq!(target.direction, Some(Direction::North));
        assert_eq!(record_set.action.resolved_command, "look north");
        assert_eq!(record_set.location.name, "Cave Entrance");

        // Looking is free, so the turn is still available
        cave.act(&barricade, "north").await.unwrap();
    }

    #[tokio::test]
    async fn test_look_at_monster_records_its_equipment() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let record_set = cave.act(&barricade, "look grumpy dwarf").await.unwrap();

        let monster = record_set.target_monster.unwrap();
        assert!(monster.record.snapshot.name.starts_with("Grumpy Dwarf ("));
        assert_eq!(monster.record.snapshot.current_health, DWARF_STATS.health);
        assert_eq!(monster.objects.len(), 1);
        assert!(monster.objects[0].name.starts_with("Rusty Dagger ("));
    }

    #[tokio::test]
    async fn test_move_changes_location_and_records_action() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let entrance = cave
            .location_instance(barricade.dungeon_instance_id, &cave.entrance)
            .await;
        let tunnel = cave
            .location_instance(barricade.dungeon_instance_id, &cave.tunnel)
            .await;

        let record_set = cave.act(&barricade, "north").await.unwrap();

        assert_eq!(record_set.action.location_instance_id, entrance.id);
        assert_eq!(record_set.action.target_location_instance_id, Some(tunnel.id));
        assert_eq!(
            record_set.action.target_location_direction,
            Some(Direction::North)
        );
        assert_eq!(record_set.action.resolved_command, "move north");
        assert_eq!(record_set.location.name, "Cave Tunnel");
        assert!(record_set
            .location
            .characters
            .iter()
            .any(|c| c.name == barricade.name));

        let after: CharacterInstance = cave.reload(barricade.id).await.unwrap();
        assert_eq!(after.location_instance_id, tunnel.id);
        assert_eq!(after.turn_number, 1);

        let actions = cave.actions_in(barricade.dungeon_instance_id).await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].character_instance_id, Some(barricade.id));
        assert_eq!(actions[0].sentence, "north");
    }

    #[tokio::test]
    async fn test_move_without_exit_is_rejected() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let err = cave.act(&barricade, "west").await.unwrap_err();
        assert!(matches!(err, ActionError::NoExit(Direction::West)));

        let after: CharacterInstance = cave.reload(barricade.id).await.unwrap();
        assert_eq!(after.location_instance_id, barricade.location_instance_id);
        assert_eq!(after.turn_number, 0);
    }

    #[tokio::test]
    async fn test_stash_then_equip_across_turns() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let di = barricade.dungeon_instance_id;

        let record_set = cave.act(&barricade, "stash stone mace").await.unwrap();
        let stashed = record_set.stashed_object.unwrap();
        assert!(stashed.is_stashed && !stashed.is_equipped);
        assert_eq!(stashed.character_instance_id, Some(barricade.id));
        assert_eq!(stashed.location_instance_id, None);
        assert!(record_set.equipped_object.is_none());

        let mace = cave.object_named(di, "Stone Mace").await;
        assert_eq!(mace.owner(), Some(ObjectOwner::Character(barricade.id)));
        assert!(mace.is_stashed());

        cave.advance(di).await;
        let record_set = cave.act(&barricade, "equip stone mace").await.unwrap();
        assert!(record_set.equipped_object.unwrap().is_equipped);

        let mace = cave.object_named(di, "Stone Mace").await;
        assert!(mace.is_equipped() && !mace.is_stashed());
        assert!(mace.is_consistent());
    }

    #[tokio::test]
    async fn test_drop_leaves_object_at_location() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let di = barricade.dungeon_instance_id;

        let record_set = cave.act(&barricade, "drop dull bronze ring").await.unwrap();
        let dropped = record_set.dropped_object.unwrap();
        assert_eq!(dropped.location_instance_id, Some(barricade.location_instance_id));
        assert!(!dropped.is_equipped && !dropped.is_stashed);
        assert!(record_set
            .location
            .objects
            .iter()
            .any(|o| o.name.starts_with("Dull Bronze Ring (")));

        let ring = cave.object_named(di, "Dull Bronze Ring").await;
        assert_eq!(
            ring.owner(),
            Some(ObjectOwner::Location(barricade.location_instance_id))
        );
        assert_eq!(ring.carry(), None);
    }

    #[tokio::test]
    async fn test_object_verbs_check_ownership() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let err = cave.act(&barricade, "drop stone mace").await.unwrap_err();
        assert!(matches!(err, ActionError::Ownership(_)));

        let err = cave.act(&barricade, "equip grumpy dwarf").await.unwrap_err();
        assert!(matches!(err, ActionError::Ownership(_)));

        let err = cave.act(&barricade, "equip golden crown").await.unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unarmed_attack_wears_down_both_sides() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let dwarf = cave.dwarf_in(barricade.dungeon_instance_id).await;

        let record_set = cave.act(&barricade, "attack grumpy dwarf").await.unwrap();

        let target = record_set.target_monster.unwrap();
        assert_eq!(target.record.snapshot.previous_health, 15);
        assert_eq!(target.record.snapshot.current_health, 12);
        assert_eq!(record_set.action.target_monster_instance_id, Some(dwarf.id));
        assert_eq!(
            record_set.action.resolved_command,
            format!("attack {}", dwarf.name)
        );

        let source = record_set.character.unwrap();
        assert_eq!(source.record.snapshot.fatigue, CHARACTER_STATS.fatigue);
        assert_eq!(source.record.snapshot.previous_fatigue, 10);
        assert_eq!(source.record.snapshot.current_fatigue, 9);

        let dwarf: MonsterInstance = cave.reload(dwarf.id).await.unwrap();
        assert_eq!(dwarf.attributes.health, 12);
        let after: CharacterInstance = cave.reload(barricade.id).await.unwrap();
        assert_eq!(after.attributes.fatigue, 9);
    }

    #[tokio::test]
    async fn test_attack_with_stashed_weapon_equips_it() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let di = barricade.dungeon_instance_id;

        cave.act(&barricade, "stash stone mace").await.unwrap();
        cave.advance(di).await;

        let record_set = cave
            .act(&barricade, "attack grumpy dwarf with stone mace")
            .await
            .unwrap();

        let equipped = record_set.equipped_object.unwrap();
        assert!(equipped.name.starts_with("Stone Mace ("));
        assert!(equipped.is_equipped);
        assert_eq!(record_set.target_monster.unwrap().record.snapshot.current_health, 10);

        let mace = cave.object_named(di, "Stone Mace").await;
        assert!(mace.is_equipped());
    }

    #[tokio::test]
    async fn test_attack_requires_creature_and_carried_weapon() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let err = cave.act(&barricade, "attack north").await.unwrap_err();
        assert!(matches!(err, ActionError::Command(_)));

        // The mace lies on the floor, not in hand
        let err = cave
            .act(&barricade, "attack grumpy dwarf with stone mace")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));

        let dwarf = cave.dwarf_in(barricade.dungeon_instance_id).await;
        assert_eq!(dwarf.attributes.health, DWARF_STATS.health);
        assert!(cave.actions_in(barricade.dungeon_instance_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_second_action_in_turn_is_duplicate() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let di = barricade.dungeon_instance_id;

        cave.act(&barricade, "north").await.unwrap();
        let err = cave.act(&barricade, "south").await.unwrap_err();
        assert!(matches!(
            err,
            ActionError::DuplicateAction { turn_number: 0, .. }
        ));

        // Still free to look around
        let record_set = cave.act(&barricade, "look").await.unwrap();
        assert_eq!(record_set.location.name, "Cave Tunnel");

        cave.advance(di).await;
        let record_set = cave.act(&barricade, "south").await.unwrap();
        assert_eq!(record_set.action.turn_number, 1);
        assert_eq!(cave.actions_in(di).await.len(), 2);
    }

    #[tokio::test]
    async fn test_locked_actor_is_busy_while_others_proceed() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let legislate = cave.enter(&cave.legislate).await;
        assert_eq!(barricade.dungeon_instance_id, legislate.dungeon_instance_id);

        let mut held = cave.store.begin().await.unwrap();
        held.get_one(&CHARACTER_INSTANCE, barricade.id.into(), LockMode::ForUpdate)
            .await
            .unwrap()
            .unwrap();

        let err = cave.act(&barricade, "north").await.unwrap_err();
        assert!(matches!(err, ActionError::Concurrency(_)));

        cave.act(&legislate, "north").await.unwrap();
        held.rollback().await.unwrap();

        cave.act(&barricade, "north").await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_actor_and_instance_are_not_found() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let err = cave
            .actions()
            .process_action(ActionRequest::new(
                DungeonInstanceId::new(),
                ActorRef::Character(barricade.id),
                "look",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));

        let err = cave
            .actions()
            .process_action(ActionRequest::new(
                barricade.dungeon_instance_id,
                ActorRef::Character(CharacterInstanceId::new()),
                "look",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_monster_can_act() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;
        let dwarf = cave.dwarf_in(barricade.dungeon_instance_id).await;

        let record_set = cave
            .actions()
            .process_action(ActionRequest::new(
                dwarf.dungeon_instance_id,
                ActorRef::Monster(dwarf.id),
                "attack barricade with rusty dagger",
            ))
            .await
            .unwrap();

        assert!(record_set.character.is_none());
        let source = record_set.monster.unwrap();
        assert_eq!(source.record.monster_instance_id, dwarf.id);
        assert_eq!(record_set.action.monster_instance_id, Some(dwarf.id));
        // Dagger already in hand, so nothing changes hands
        assert!(record_set.equipped_object.is_none());
        let target = record_set.target_character.unwrap();
        assert_eq!(target.record.snapshot.previous_health, 20);
        assert_eq!(target.record.snapshot.current_health, 16);

        let after: CharacterInstance = cave.reload(barricade.id).await.unwrap();
        assert_eq!(after.attributes.health, 16);
        let dwarf: MonsterInstance = cave.reload(dwarf.id).await.unwrap();
        assert_eq!(dwarf.turn_number, 1);
    }

    #[tokio::test]
    async fn test_unparseable_sentence_is_rejected_up_front() {
        let cave = CaveFixture::seed().await;
        let barricade = cave.enter(&cave.barricade).await;

        let err = cave.act(&barricade, "dance wildly").await.unwrap_err();
        assert!(matches!(err, ActionError::Command(_)));
        let err = cave.act(&barricade, "   ").await.unwrap_err();
        assert!(matches!(err, ActionError::Command(_)));
    }
}
