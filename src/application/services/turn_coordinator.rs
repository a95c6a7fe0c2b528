//! Turn coordinator - row locking and once-per-turn bookkeeping for actors
//!
//! An actor moves `Idle(N) -> Acting(N) -> Idle(N + 1)`, where N is the
//! dungeon instance's current turn. The actor row is read with a skip-locked
//! lock so two commands for the same actor can never interleave, and it is
//! written exactly once when the turn completes.

use tracing::debug;

use crate::application::errors::ActionError;
use crate::application::ports::outbound::{Filter, LockMode, TransactionPort};
use crate::application::repositories::Repositories;
use crate::application::services::actor::{Actor, ActorRef};
use crate::domain::entities::DungeonInstance;
use crate::domain::value_objects::{DungeonInstanceId, LocationInstanceId, Verb};

/// State held between `begin_turn` and `complete_turn`
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub dungeon_instance: DungeonInstance,
    pub actor: Actor,
    /// Where the actor stood when the command was issued
    pub origin: LocationInstanceId,
    /// The turn being acted in
    pub turn_number: i64,
}

pub struct TurnCoordinator<'a> {
    repositories: &'a Repositories,
}

impl<'a> TurnCoordinator<'a> {
    pub fn new(repositories: &'a Repositories) -> Self {
        Self { repositories }
    }

    /// Lock the actor and check it may act in the current turn
    pub async fn begin_turn<T: TransactionPort>(
        &self,
        tx: &mut T,
        dungeon_instance_id: DungeonInstanceId,
        actor_ref: ActorRef,
        verb: Verb,
    ) -> Result<TurnContext, ActionError> {
        let dungeon_instance = self
            .repositories
            .dungeon_instances
            .get_one(tx, dungeon_instance_id, LockMode::None)
            .await?
            .ok_or_else(|| {
                ActionError::not_found(format!("dungeon instance {}", dungeon_instance_id))
            })?;

        let actor = self.lock_actor(tx, actor_ref).await?;
        if actor.dungeon_instance_id() != dungeon_instance_id {
            return Err(ActionError::not_found(format!(
                "{} in dungeon instance {}",
                actor_ref, dungeon_instance_id
            )));
        }

        let turn_number = dungeon_instance.turn_number;
        if verb.consumes_turn() {
            self.check_not_acted(tx, &actor, dungeon_instance_id, turn_number)
                .await?;
        }

        debug!(actor = %actor_ref, turn_number, "Turn started");
        Ok(TurnContext {
            origin: actor.location_instance_id(),
            dungeon_instance,
            actor,
            turn_number,
        })
    }

    /// Write the actor back, advancing its turn when the verb consumed it
    pub async fn complete_turn<T: TransactionPort>(
        &self,
        tx: &mut T,
        context: &mut TurnContext,
        verb: Verb,
    ) -> Result<(), ActionError> {
        if !verb.consumes_turn() {
            return Ok(());
        }
        context.actor.finish_turn(context.turn_number);
        context.actor.save(self.repositories, tx).await?;
        debug!(
            actor = %context.actor.reference(),
            next_turn = context.actor.turn_number(),
            "Turn completed"
        );
        Ok(())
    }

    async fn lock_actor<T: TransactionPort>(
        &self,
        tx: &mut T,
        actor_ref: ActorRef,
    ) -> Result<Actor, ActionError> {
        let locked = match actor_ref {
            ActorRef::Character(id) => self
                .repositories
                .character_instances
                .get_one(tx, id, LockMode::ForUpdateSkipLocked)
                .await?
                .map(Actor::Character),
            ActorRef::Monster(id) => self
                .repositories
                .monster_instances
                .get_one(tx, id, LockMode::ForUpdateSkipLocked)
                .await?
                .map(Actor::Monster),
        };
        if let Some(actor) = locked {
            return Ok(actor);
        }

        // Skipped rows are either locked elsewhere or missing
        let exists = match actor_ref {
            ActorRef::Character(id) => self
                .repositories
                .character_instances
                .get_one(tx, id, LockMode::None)
                .await?
                .is_some(),
            ActorRef::Monster(id) => self
                .repositories
                .monster_instances
                .get_one(tx, id, LockMode::None)
                .await?
                .is_some(),
        };
        if exists {
            Err(ActionError::Concurrency(actor_ref.to_string()))
        } else {
            Err(ActionError::not_found(actor_ref))
        }
    }

    async fn check_not_acted<T: TransactionPort>(
        &self,
        tx: &mut T,
        actor: &Actor,
        dungeon_instance_id: DungeonInstanceId,
        turn_number: i64,
    ) -> Result<(), ActionError> {
        let duplicate = || ActionError::DuplicateAction {
            actor: actor.name().to_string(),
            turn_number,
        };

        if actor.turn_number() > turn_number {
            return Err(duplicate());
        }

        let existing = self
            .repositories
            .actions
            .get_many(
                tx,
                &[
                    Filter::eq("dungeon_instance_id", dungeon_instance_id),
                    Filter::eq("turn_number", turn_number),
                    actor.reference().filter(),
                ],
            )
            .await?;
        if existing.is_empty() {
            Ok(())
        } else {
            Err(duplicate())
        }
    }
}
