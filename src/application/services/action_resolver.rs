//! Action resolver - verb semantics
//!
//! Applies a parsed command to the actor and whatever it targets. The actor
//! itself is only mutated in memory; the turn coordinator writes it when the
//! turn completes. Objects and attacked creatures are re-read under a row
//! lock and written here.

use tracing::{debug, info};

use crate::application::errors::ActionError;
use crate::application::ports::outbound::{LockMode, TransactionPort};
use crate::application::repositories::Repositories;
use crate::application::services::target_resolver::{LocationSnapshot, Target};
use crate::application::services::turn_coordinator::TurnContext;
use crate::domain::entities::{
    ActionObjectRecordType, Carry, CharacterInstance, LocationInstance, MonsterInstance,
    ObjectInstance, ObjectOwner,
};
use crate::domain::services::{resolve_attack, Command, CommandError};
use crate::domain::value_objects::{Attributes, Direction, Verb};

/// What a target looked like around the action
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedTarget {
    Location {
        direction: Option<Direction>,
        location: LocationInstance,
    },
    Object(ObjectInstance),
    Character {
        instance: CharacterInstance,
        before: Attributes,
    },
    Monster {
        instance: MonsterInstance,
        before: Attributes,
    },
}

/// An object whose ownership or carry state the action changed
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectChange {
    pub record_type: ActionObjectRecordType,
    pub object: ObjectInstance,
}

/// Outcome of applying a command
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub verb: Verb,
    /// Command text with every phrase replaced by the entity it bound to
    pub resolved_command: String,
    /// Actor attributes before the action
    pub actor_before: Attributes,
    pub target: Option<ResolvedTarget>,
    pub object_change: Option<ObjectChange>,
}

pub struct ActionResolver<'a> {
    repositories: &'a Repositories,
}

impl<'a> ActionResolver<'a> {
    pub fn new(repositories: &'a Repositories) -> Self {
        Self { repositories }
    }

    pub async fn resolve<T: TransactionPort>(
        &self,
        tx: &mut T,
        context: &mut TurnContext,
        command: &Command,
        snapshot: &LocationSnapshot,
    ) -> Result<Resolution, ActionError> {
        let actor_before = context.actor.attributes();
        let mut resolution = Resolution {
            verb: command.verb,
            resolved_command: command.verb.to_string(),
            actor_before,
            target: None,
            object_change: None,
        };

        match command.verb {
            Verb::Look => self.look(command, snapshot, &mut resolution)?,
            Verb::Move => self.move_actor(context, command, snapshot, &mut resolution)?,
            Verb::Equip | Verb::Stash => {
                self.take_object(tx, context, command, snapshot, &mut resolution)
                    .await?
            }
            Verb::Drop => {
                self.drop_object(tx, context, command, snapshot, &mut resolution)
                    .await?
            }
            Verb::Attack => {
                self.attack(tx, context, command, snapshot, &mut resolution)
                    .await?
            }
        }

        debug!(resolved = %resolution.resolved_command, "Command resolved");
        Ok(resolution)
    }

    fn look(
        &self,
        command: &Command,
        snapshot: &LocationSnapshot,
        resolution: &mut Resolution,
    ) -> Result<(), ActionError> {
        let Some(phrase) = command.target.as_deref() else {
            resolution.target = Some(ResolvedTarget::Location {
                direction: None,
                location: snapshot.location.clone(),
            });
            return Ok(());
        };

        let target = snapshot.resolve_target(phrase)?;
        resolution.resolved_command = format!("look {}", target.name());
        resolution.target = Some(match target {
            Target::Location {
                direction,
                location,
            } => ResolvedTarget::Location {
                direction: Some(direction),
                location,
            },
            Target::Object(object) => ResolvedTarget::Object(object),
            Target::Character(instance) => ResolvedTarget::Character {
                before: instance.attributes,
                instance,
            },
            Target::Monster(instance) => ResolvedTarget::Monster {
                before: instance.attributes,
                instance,
            },
        });
        Ok(())
    }

    fn move_actor(
        &self,
        context: &mut TurnContext,
        command: &Command,
        snapshot: &LocationSnapshot,
        resolution: &mut Resolution,
    ) -> Result<(), ActionError> {
        let direction = command
            .direction()
            .ok_or(CommandError::MissingTarget(Verb::Move))?;
        let destination = snapshot
            .neighbours
            .get(&direction)
            .ok_or(ActionError::NoExit(direction))?;

        context.actor.move_to(destination.id);
        resolution.resolved_command = format!("move {}", direction);
        resolution.target = Some(ResolvedTarget::Location {
            direction: Some(direction),
            location: destination.clone(),
        });
        info!(
            actor = %context.actor.reference(),
            to = %destination.name,
            "Actor moved"
        );
        Ok(())
    }

    async fn take_object<T: TransactionPort>(
        &self,
        tx: &mut T,
        context: &TurnContext,
        command: &Command,
        snapshot: &LocationSnapshot,
        resolution: &mut Resolution,
    ) -> Result<(), ActionError> {
        let (carry, record_type) = match command.verb {
            Verb::Stash => (Carry::Stashed, ActionObjectRecordType::Stashed),
            _ => (Carry::Equipped, ActionObjectRecordType::Equipped),
        };
        let object = self.object_target(command, snapshot)?;
        let mut object = self.lock_object(tx, &object).await?;

        let owner = context.actor.owner();
        let reachable = object.is_owned_by(owner)
            || object.is_owned_by(ObjectOwner::Location(context.actor.location_instance_id()));
        if !reachable {
            return Err(ActionError::ownership(format!(
                "{} cannot {} {}",
                context.actor.name(),
                command.verb,
                object.name
            )));
        }

        object.take(owner, carry);
        let object = self
            .repositories
            .object_instances
            .update(tx, &object)
            .await?;

        resolution.resolved_command = format!("{} {}", command.verb, object.name);
        resolution.object_change = Some(ObjectChange {
            record_type,
            object,
        });
        Ok(())
    }

    async fn drop_object<T: TransactionPort>(
        &self,
        tx: &mut T,
        context: &TurnContext,
        command: &Command,
        snapshot: &LocationSnapshot,
        resolution: &mut Resolution,
    ) -> Result<(), ActionError> {
        let object = self.object_target(command, snapshot)?;
        let mut object = self.lock_object(tx, &object).await?;
        if !object.is_owned_by(context.actor.owner()) {
            return Err(ActionError::ownership(format!(
                "{} does not carry {}",
                context.actor.name(),
                object.name
            )));
        }

        object.drop_at(context.actor.location_instance_id());
        let object = self
            .repositories
            .object_instances
            .update(tx, &object)
            .await?;

        resolution.resolved_command = format!("drop {}", object.name);
        resolution.object_change = Some(ObjectChange {
            record_type: ActionObjectRecordType::Dropped,
            object,
        });
        Ok(())
    }

    async fn attack<T: TransactionPort>(
        &self,
        tx: &mut T,
        context: &mut TurnContext,
        command: &Command,
        snapshot: &LocationSnapshot,
        resolution: &mut Resolution,
    ) -> Result<(), ActionError> {
        let phrase = command
            .target
            .as_deref()
            .ok_or(CommandError::MissingTarget(Verb::Attack))?;
        let target = snapshot.resolve_target(phrase)?;

        let weapon = match command.with.as_deref() {
            Some(with) => Some(self.ready_weapon(tx, context, snapshot, with, resolution).await?),
            None => None,
        };

        let attacker = context.actor.attributes();
        let armed = weapon.is_some();
        let target = match target {
            Target::Monster(monster) => {
                let mut monster = self
                    .repositories
                    .monster_instances
                    .require(tx, monster.id, LockMode::ForUpdate)
                    .await?;
                let before = monster.attributes;
                let outcome = resolve_attack(attacker, before, armed);
                monster.attributes = outcome.defender;
                monster.updated_at = Some(chrono::Utc::now());
                let monster = self
                    .repositories
                    .monster_instances
                    .update(tx, &monster)
                    .await?;
                context.actor.set_attributes(outcome.attacker);
                info!(defender = %monster.name, damage = outcome.damage, "Attack landed");
                ResolvedTarget::Monster {
                    instance: monster,
                    before,
                }
            }
            Target::Character(character) => {
                let mut character = self
                    .repositories
                    .character_instances
                    .require(tx, character.id, LockMode::ForUpdate)
                    .await?;
                let before = character.attributes;
                let outcome = resolve_attack(attacker, before, armed);
                character.attributes = outcome.defender;
                character.updated_at = Some(chrono::Utc::now());
                let character = self
                    .repositories
                    .character_instances
                    .update(tx, &character)
                    .await?;
                context.actor.set_attributes(outcome.attacker);
                info!(defender = %character.name, damage = outcome.damage, "Attack landed");
                ResolvedTarget::Character {
                    instance: character,
                    before,
                }
            }
            other => return Err(CommandError::NotAttackable(other.name().to_string()).into()),
        };

        resolution.resolved_command = match &weapon {
            Some(weapon) => format!("attack {} with {}", target_name(&target), weapon.name),
            None => format!("attack {}", target_name(&target)),
        };
        resolution.target = Some(target);
        Ok(())
    }

    /// Equip the weapon named after "with" if it is not already equipped
    async fn ready_weapon<T: TransactionPort>(
        &self,
        tx: &mut T,
        context: &TurnContext,
        snapshot: &LocationSnapshot,
        phrase: &str,
        resolution: &mut Resolution,
    ) -> Result<ObjectInstance, ActionError> {
        let weapon = snapshot.resolve_with(phrase)?;
        let mut weapon = self.lock_object(tx, &weapon).await?;
        if !weapon.is_owned_by(context.actor.owner()) {
            return Err(ActionError::ownership(format!(
                "{} does not carry {}",
                context.actor.name(),
                weapon.name
            )));
        }
        if weapon.is_equipped() {
            return Ok(weapon);
        }

        weapon.take(context.actor.owner(), Carry::Equipped);
        let weapon = self
            .repositories
            .object_instances
            .update(tx, &weapon)
            .await?;
        resolution.object_change = Some(ObjectChange {
            record_type: ActionObjectRecordType::Equipped,
            object: weapon.clone(),
        });
        Ok(weapon)
    }

    /// Current state of an object, locked for the rest of the transaction
    async fn lock_object<T: TransactionPort>(
        &self,
        tx: &mut T,
        object: &ObjectInstance,
    ) -> Result<ObjectInstance, ActionError> {
        Ok(self
            .repositories
            .object_instances
            .require(tx, object.id, LockMode::ForUpdate)
            .await?)
    }

    /// The command's target, which must be an object
    fn object_target(
        &self,
        command: &Command,
        snapshot: &LocationSnapshot,
    ) -> Result<ObjectInstance, ActionError> {
        let phrase = command
            .target
            .as_deref()
            .ok_or(CommandError::MissingTarget(command.verb))?;
        match snapshot.resolve_target(phrase)? {
            Target::Object(object) => Ok(object),
            other => Err(ActionError::ownership(format!(
                "{} is not something you can {}",
                other.name(),
                command.verb
            ))),
        }
    }
}

fn target_name(target: &ResolvedTarget) -> &str {
    match target {
        ResolvedTarget::Location { location, .. } => &location.name,
        ResolvedTarget::Object(o) => &o.name,
        ResolvedTarget::Character { instance, .. } => &instance.name,
        ResolvedTarget::Monster { instance, .. } => &instance.name,
    }
}
