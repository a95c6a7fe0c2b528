//! Target resolution - binds the phrases of a command to live entities
//!
//! The resolver reads one [`LocationSnapshot`] per command and then matches
//! phrases against it without touching the store again.

use std::collections::HashMap;

use crate::application::errors::ActionError;
use crate::application::ports::outbound::{Filter, LockMode, TransactionPort};
use crate::application::repositories::Repositories;
use crate::application::services::actor::Actor;
use crate::domain::entities::{CharacterInstance, LocationInstance, MonsterInstance, ObjectInstance};
use crate::domain::services::naming::name_matches;
use crate::domain::value_objects::{CharacterInstanceId, Direction, MonsterInstanceId};

/// What the actor can see and reach from where it stands
#[derive(Debug, Clone)]
pub struct LocationSnapshot {
    pub location: LocationInstance,
    pub neighbours: HashMap<Direction, LocationInstance>,
    /// Objects lying at the location
    pub objects: Vec<ObjectInstance>,
    pub monsters: Vec<MonsterInstance>,
    /// Characters at the location other than the actor
    pub characters: Vec<CharacterInstance>,
    /// Objects the actor carries, equipped or stashed
    pub actor_objects: Vec<ObjectInstance>,
}

/// A phrase bound to an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Location {
        direction: Direction,
        location: LocationInstance,
    },
    Object(ObjectInstance),
    Monster(MonsterInstance),
    Character(CharacterInstance),
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Target::Location { direction, .. } => direction.as_str(),
            Target::Object(o) => &o.name,
            Target::Monster(m) => &m.name,
            Target::Character(c) => &c.name,
        }
    }
}

impl LocationSnapshot {
    /// Read the actor's surroundings inside the current transaction
    pub async fn load<T: TransactionPort>(
        repositories: &Repositories,
        tx: &mut T,
        actor: &Actor,
    ) -> Result<Self, ActionError> {
        let location_instance_id = actor.location_instance_id();
        let location = repositories
            .location_instances
            .get_one(tx, location_instance_id, LockMode::None)
            .await?
            .ok_or_else(|| {
                ActionError::not_found(format!("location instance {}", location_instance_id))
            })?;

        let exits: Vec<(Direction, _)> = location.exits.iter().collect();
        let neighbour_rows = if exits.is_empty() {
            Vec::new()
        } else {
            repositories
                .location_instances
                .get_many(tx, &[Filter::any_of("id", exits.iter().map(|(_, id)| *id))])
                .await?
        };
        let neighbours = exits
            .into_iter()
            .filter_map(|(direction, id)| {
                neighbour_rows
                    .iter()
                    .find(|l| l.id == id)
                    .map(|l| (direction, l.clone()))
            })
            .collect();

        let at_location = [Filter::eq("location_instance_id", location_instance_id)];
        let objects = repositories.object_instances.get_many(tx, &at_location).await?;
        let monsters = repositories
            .monster_instances
            .get_many(tx, &at_location)
            .await?
            .into_iter()
            .filter(|m| Some(m.id) != monster_id(actor))
            .collect();
        let characters = repositories
            .character_instances
            .get_many(tx, &at_location)
            .await?
            .into_iter()
            .filter(|c| Some(c.id) != character_id(actor))
            .collect();
        let actor_objects = repositories
            .object_instances
            .get_many(tx, &[actor.reference().filter()])
            .await?;

        Ok(Self {
            location,
            neighbours,
            objects,
            monsters,
            characters,
            actor_objects,
        })
    }

    /// Bind a target phrase
    ///
    /// Tried in order: direction, object carried by the actor, object at the
    /// location, monster, character. Within each group the oldest match wins.
    pub fn resolve_target(&self, phrase: &str) -> Result<Target, ActionError> {
        if let Some(direction) = Direction::parse(phrase) {
            return self
                .neighbours
                .get(&direction)
                .map(|location| Target::Location {
                    direction,
                    location: location.clone(),
                })
                .ok_or(ActionError::NoExit(direction));
        }

        if let Some(object) = find_named(&self.actor_objects, phrase, |o| &o.name) {
            return Ok(Target::Object(object.clone()));
        }
        if let Some(object) = find_named(&self.objects, phrase, |o| &o.name) {
            return Ok(Target::Object(object.clone()));
        }
        if let Some(monster) = find_named(&self.monsters, phrase, |m| &m.name) {
            return Ok(Target::Monster(monster.clone()));
        }
        if let Some(character) = find_named(&self.characters, phrase, |c| &c.name) {
            return Ok(Target::Character(character.clone()));
        }

        Err(ActionError::not_found(phrase))
    }

    /// Bind the phrase following "with", which must name a carried object
    pub fn resolve_with(&self, phrase: &str) -> Result<ObjectInstance, ActionError> {
        find_named(&self.actor_objects, phrase, |o| &o.name)
            .cloned()
            .ok_or_else(|| ActionError::not_found(phrase))
    }
}

fn find_named<'a, E>(
    candidates: &'a [E],
    phrase: &str,
    name: impl Fn(&E) -> &str,
) -> Option<&'a E> {
    candidates.iter().find(|c| name_matches(phrase, name(*c)))
}

fn character_id(actor: &Actor) -> Option<CharacterInstanceId> {
    match actor {
        Actor::Character(c) => Some(c.id),
        Actor::Monster(_) => None,
    }
}

fn monster_id(actor: &Actor) -> Option<MonsterInstanceId> {
    match actor {
        Actor::Monster(m) => Some(m.id),
        Actor::Character(_) => None,
    }
}
