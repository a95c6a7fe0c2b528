//! Action record set builder - snapshots of everything an action touched
//!
//! Builds the [`ActionRecordSet`] returned to the player and, for
//! turn-consuming verbs, appends its rows to the action history.

use tracing::debug;

use crate::application::dto::{
    ActionCharacterRecord, ActionLocationRecord, ActionMonsterRecord, ActionRecordSet,
    LocationOccupant,
};
use crate::application::errors::ActionError;
use crate::application::ports::outbound::{Filter, LockMode, TransactionPort};
use crate::application::repositories::Repositories;
use crate::application::services::action_resolver::{ObjectChange, Resolution, ResolvedTarget};
use crate::application::services::actor::Actor;
use crate::application::services::turn_coordinator::TurnContext;
use crate::domain::entities::{
    Action, ActionCharacter, ActionCharacterObject, ActionMonster, ActionMonsterObject,
    ActionObject, ActionObjectRecordType, ActionRecordType, CharacterInstance, CombatantState,
    LocationInstance, MonsterInstance, ObjectInstance,
};
use crate::domain::value_objects::{ActionId, Attributes, Direction};

pub struct ActionRecordBuilder<'a> {
    repositories: &'a Repositories,
}

impl<'a> ActionRecordBuilder<'a> {
    pub fn new(repositories: &'a Repositories) -> Self {
        Self { repositories }
    }

    /// Assemble the record set for a resolved command and persist it when
    /// the verb consumes the turn
    pub async fn build<T: TransactionPort>(
        &self,
        tx: &mut T,
        context: &TurnContext,
        sentence: &str,
        resolution: &Resolution,
    ) -> Result<ActionRecordSet, ActionError> {
        let action = self.action_header(context, sentence, resolution);

        let (character, monster) = match &context.actor {
            Actor::Character(c) => {
                let record = self
                    .character_record(
                        tx,
                        action.id,
                        ActionRecordType::Source,
                        c,
                        resolution.actor_before,
                        false,
                    )
                    .await?;
                (Some(record), None)
            }
            Actor::Monster(m) => {
                let record = self
                    .monster_record(
                        tx,
                        action.id,
                        ActionRecordType::Source,
                        m,
                        resolution.actor_before,
                        false,
                    )
                    .await?;
                (None, Some(record))
            }
        };

        let current_location_id = context.actor.location_instance_id();
        let current_location = self
            .repositories
            .location_instances
            .require(tx, current_location_id, LockMode::None)
            .await?;
        let location = self.location_record(tx, &current_location, None).await?;

        let mut record_set = ActionRecordSet {
            action,
            character,
            monster,
            location,
            target_location: None,
            target_character: None,
            target_monster: None,
            target_object: None,
            equipped_object: None,
            stashed_object: None,
            dropped_object: None,
        };

        match &resolution.target {
            Some(ResolvedTarget::Location {
                direction,
                location,
            }) => {
                record_set.target_location =
                    Some(self.location_record(tx, location, *direction).await?);
            }
            Some(ResolvedTarget::Object(object)) => {
                let detail = self.object_description(tx, object, true).await?;
                record_set.target_object = Some(ActionObject::new(
                    record_set.action.id,
                    ActionObjectRecordType::Target,
                    object,
                    detail,
                ));
            }
            Some(ResolvedTarget::Character { instance, before }) => {
                record_set.target_character = Some(
                    self.character_record(
                        tx,
                        record_set.action.id,
                        ActionRecordType::Target,
                        instance,
                        *before,
                        true,
                    )
                    .await?,
                );
            }
            Some(ResolvedTarget::Monster { instance, before }) => {
                record_set.target_monster = Some(
                    self.monster_record(
                        tx,
                        record_set.action.id,
                        ActionRecordType::Target,
                        instance,
                        *before,
                        true,
                    )
                    .await?,
                );
            }
            None => {}
        }

        if let Some(ObjectChange {
            record_type,
            object,
        }) = &resolution.object_change
        {
            let description = self.object_description(tx, object, false).await?;
            let snapshot =
                ActionObject::new(record_set.action.id, *record_type, object, description);
            match record_type {
                ActionObjectRecordType::Equipped => record_set.equipped_object = Some(snapshot),
                ActionObjectRecordType::Stashed => record_set.stashed_object = Some(snapshot),
                ActionObjectRecordType::Dropped => record_set.dropped_object = Some(snapshot),
                ActionObjectRecordType::Target => record_set.target_object = Some(snapshot),
            }
        }

        if resolution.verb.consumes_turn() {
            self.persist(tx, &record_set).await?;
        }
        Ok(record_set)
    }

    fn action_header(&self, context: &TurnContext, sentence: &str, resolution: &Resolution) -> Action {
        let mut action = Action::new(
            context.dungeon_instance.id,
            context.origin,
            context.turn_number,
            sentence,
            resolution.verb,
        );
        action.resolved_command = resolution.resolved_command.clone();
        match &context.actor {
            Actor::Character(c) => action.character_instance_id = Some(c.id),
            Actor::Monster(m) => action.monster_instance_id = Some(m.id),
        }

        match &resolution.target {
            Some(ResolvedTarget::Location {
                direction,
                location,
            }) => {
                action.target_location_instance_id = Some(location.id);
                action.target_location_direction = *direction;
            }
            Some(ResolvedTarget::Object(object)) => {
                action.target_object_instance_id = Some(object.id);
            }
            Some(ResolvedTarget::Character { instance, .. }) => {
                action.target_character_instance_id = Some(instance.id);
            }
            Some(ResolvedTarget::Monster { instance, .. }) => {
                action.target_monster_instance_id = Some(instance.id);
            }
            None => {}
        }

        if let Some(change) = &resolution.object_change {
            let id = Some(change.object.id);
            match change.record_type {
                ActionObjectRecordType::Equipped => action.equipped_object_instance_id = id,
                ActionObjectRecordType::Stashed => action.stashed_object_instance_id = id,
                ActionObjectRecordType::Dropped => action.dropped_object_instance_id = id,
                ActionObjectRecordType::Target => action.target_object_instance_id = id,
            }
        }
        action
    }

    async fn character_record<T: TransactionPort>(
        &self,
        tx: &mut T,
        action_id: ActionId,
        record_type: ActionRecordType,
        instance: &CharacterInstance,
        before: Attributes,
        equipped_only: bool,
    ) -> Result<ActionCharacterRecord, ActionError> {
        let template = self
            .repositories
            .characters
            .require(tx, instance.character_id, LockMode::None)
            .await?;
        let record = ActionCharacter::new(
            action_id,
            instance.id,
            record_type,
            CombatantState {
                name: &instance.name,
                location_instance_id: instance.location_instance_id,
                base: template.attributes,
                before,
                after: instance.attributes,
                coins: instance.coins,
                experience_points: instance.experience_points,
                attribute_points: instance.attribute_points,
            }
            .into(),
        );
        let objects = self
            .carried_objects(tx, Filter::eq("character_instance_id", instance.id), equipped_only)
            .await?
            .iter()
            .map(|o| ActionCharacterObject::new(&record, o))
            .collect();
        Ok(ActionCharacterRecord { record, objects })
    }

    async fn monster_record<T: TransactionPort>(
        &self,
        tx: &mut T,
        action_id: ActionId,
        record_type: ActionRecordType,
        instance: &MonsterInstance,
        before: Attributes,
        equipped_only: bool,
    ) -> Result<ActionMonsterRecord, ActionError> {
        let template = self
            .repositories
            .monsters
            .require(tx, instance.monster_id, LockMode::None)
            .await?;
        let record = ActionMonster::new(
            action_id,
            instance.id,
            record_type,
            CombatantState {
                name: &instance.name,
                location_instance_id: instance.location_instance_id,
                base: template.attributes,
                before,
                after: instance.attributes,
                coins: instance.coins,
                experience_points: instance.experience_points,
                attribute_points: instance.attribute_points,
            }
            .into(),
        );
        let objects = self
            .carried_objects(tx, Filter::eq("monster_instance_id", instance.id), equipped_only)
            .await?
            .iter()
            .map(|o| ActionMonsterObject::new(&record, o))
            .collect();
        Ok(ActionMonsterRecord { record, objects })
    }

    async fn carried_objects<T: TransactionPort>(
        &self,
        tx: &mut T,
        owner: Filter,
        equipped_only: bool,
    ) -> Result<Vec<ObjectInstance>, ActionError> {
        let mut filters = vec![owner];
        if equipped_only {
            filters.push(Filter::eq("is_equipped", true));
        }
        Ok(self
            .repositories
            .object_instances
            .get_many(tx, &filters)
            .await?)
    }

    async fn location_record<T: TransactionPort>(
        &self,
        tx: &mut T,
        location: &LocationInstance,
        direction: Option<Direction>,
    ) -> Result<ActionLocationRecord, ActionError> {
        let at_location = [Filter::eq("location_instance_id", location.id)];
        let characters = self
            .repositories
            .character_instances
            .get_many(tx, &at_location)
            .await?
            .into_iter()
            .map(|c| LocationOccupant::new(c.id, c.name))
            .collect();
        let monsters = self
            .repositories
            .monster_instances
            .get_many(tx, &at_location)
            .await?
            .into_iter()
            .map(|m| LocationOccupant::new(m.id, m.name))
            .collect();
        let objects = self
            .repositories
            .object_instances
            .get_many(tx, &at_location)
            .await?
            .into_iter()
            .map(|o| LocationOccupant::new(o.id, o.name))
            .collect();

        Ok(ActionLocationRecord {
            location_instance_id: location.id,
            name: location.name.clone(),
            description: location.description.clone(),
            direction,
            directions: location.exits.iter().map(|(d, _)| d).collect(),
            characters,
            monsters,
            objects,
        })
    }

    async fn object_description<T: TransactionPort>(
        &self,
        tx: &mut T,
        object: &ObjectInstance,
        detailed: bool,
    ) -> Result<String, ActionError> {
        let template = self
            .repositories
            .objects
            .require(tx, object.object_id, LockMode::None)
            .await?;
        Ok(if detailed {
            template.description_detail
        } else {
            template.description
        })
    }

    async fn persist<T: TransactionPort>(
        &self,
        tx: &mut T,
        record_set: &ActionRecordSet,
    ) -> Result<(), ActionError> {
        let repos = self.repositories;
        repos.actions.create(tx, &record_set.action).await?;

        for character in [&record_set.character, &record_set.target_character]
            .into_iter()
            .flatten()
        {
            repos.action_characters.create(tx, &character.record).await?;
            for object in &character.objects {
                repos.action_character_objects.create(tx, object).await?;
            }
        }

        for monster in [&record_set.monster, &record_set.target_monster]
            .into_iter()
            .flatten()
        {
            repos.action_monsters.create(tx, &monster.record).await?;
            for object in &monster.objects {
                repos.action_monster_objects.create(tx, object).await?;
            }
        }

        for object in [
            &record_set.target_object,
            &record_set.equipped_object,
            &record_set.stashed_object,
            &record_set.dropped_object,
        ]
        .into_iter()
        .flatten()
        {
            repos.action_objects.create(tx, object).await?;
        }

        debug!(action_id = %record_set.action.id, "Action history written");
        Ok(())
    }
}
