//! Schema descriptors for every stored entity kind

use crate::application::ports::outbound::{Field, FieldKind, Schema};
use crate::application::repositories::Record;
use crate::domain::entities::{
    Action, ActionCharacter, ActionCharacterObject, ActionMonster, ActionMonsterObject,
    ActionObject, Character, CharacterInstance, CharacterObject, Dungeon, DungeonInstance,
    Location, LocationInstance, LocationMonster, LocationObject, Monster, MonsterInstance,
    MonsterObject, Object, ObjectInstance,
};
use crate::domain::value_objects::{
    ActionCharacterId, ActionCharacterObjectId, ActionId, ActionMonsterId, ActionMonsterObjectId,
    ActionObjectId, CharacterId, CharacterInstanceId, CharacterObjectId, DungeonId,
    DungeonInstanceId, LocationId, LocationInstanceId, LocationMonsterId, LocationObjectId,
    MonsterId, MonsterInstanceId, MonsterObjectId, ObjectId, ObjectInstanceId,
};

const fn uuid(name: &'static str) -> Field {
    Field::required(name, FieldKind::Uuid)
}

const fn opt_uuid(name: &'static str) -> Field {
    Field::optional(name, FieldKind::Uuid)
}

const fn text(name: &'static str) -> Field {
    Field::required(name, FieldKind::Text)
}

const fn opt_text(name: &'static str) -> Field {
    Field::optional(name, FieldKind::Text)
}

const fn int(name: &'static str) -> Field {
    Field::required(name, FieldKind::Integer)
}

const fn boolean(name: &'static str) -> Field {
    Field::required(name, FieldKind::Boolean)
}

const fn created_at() -> Field {
    Field::required("created_at", FieldKind::Timestamp)
}

const fn updated_at() -> Field {
    Field::optional("updated_at", FieldKind::Timestamp)
}

macro_rules! record {
    ($entity:ty, $id:ty, $schema:ident) => {
        impl Record for $entity {
            type Id = $id;

            const SCHEMA: &'static Schema = &$schema;
        }
    };
}

// =============================================================================
// Templates
// =============================================================================

pub static DUNGEON: Schema = Schema {
    table: "dungeon",
    fields: &[uuid("id"), text("name"), text("description"), created_at()],
};

pub static LOCATION: Schema = Schema {
    table: "location",
    fields: &[
        uuid("id"),
        uuid("dungeon_id"),
        text("name"),
        text("description"),
        boolean("is_default"),
        opt_uuid("north"),
        opt_uuid("northeast"),
        opt_uuid("east"),
        opt_uuid("southeast"),
        opt_uuid("south"),
        opt_uuid("southwest"),
        opt_uuid("west"),
        opt_uuid("northwest"),
        opt_uuid("up"),
        opt_uuid("down"),
        created_at(),
    ],
};

pub static CHARACTER: Schema = Schema {
    table: "character",
    fields: &[
        uuid("id"),
        text("name"),
        text("description"),
        int("strength"),
        int("dexterity"),
        int("intelligence"),
        int("health"),
        int("fatigue"),
        int("coins"),
        int("experience_points"),
        int("attribute_points"),
        created_at(),
    ],
};

pub static MONSTER: Schema = Schema {
    table: "monster",
    fields: &[
        uuid("id"),
        text("name"),
        text("description"),
        int("strength"),
        int("dexterity"),
        int("intelligence"),
        int("health"),
        int("fatigue"),
        created_at(),
    ],
};

pub static OBJECT: Schema = Schema {
    table: "object",
    fields: &[
        uuid("id"),
        text("name"),
        text("description"),
        text("description_detail"),
        created_at(),
    ],
};

pub static LOCATION_OBJECT: Schema = Schema {
    table: "location_object",
    fields: &[uuid("id"), uuid("location_id"), uuid("object_id"), created_at()],
};

pub static LOCATION_MONSTER: Schema = Schema {
    table: "location_monster",
    fields: &[uuid("id"), uuid("location_id"), uuid("monster_id"), created_at()],
};

pub static MONSTER_OBJECT: Schema = Schema {
    table: "monster_object",
    fields: &[
        uuid("id"),
        uuid("monster_id"),
        uuid("object_id"),
        boolean("is_equipped"),
        boolean("is_stashed"),
        created_at(),
    ],
};

pub static CHARACTER_OBJECT: Schema = Schema {
    table: "character_object",
    fields: &[
        uuid("id"),
        uuid("character_id"),
        uuid("object_id"),
        boolean("is_equipped"),
        boolean("is_stashed"),
        created_at(),
    ],
};

// =============================================================================
// Instances
// =============================================================================

pub static DUNGEON_INSTANCE: Schema = Schema {
    table: "dungeon_instance",
    fields: &[
        uuid("id"),
        uuid("dungeon_id"),
        text("name"),
        int("turn_number"),
        created_at(),
        updated_at(),
    ],
};

pub static LOCATION_INSTANCE: Schema = Schema {
    table: "location_instance",
    fields: &[
        uuid("id"),
        uuid("dungeon_instance_id"),
        uuid("location_id"),
        text("name"),
        text("description"),
        boolean("is_default"),
        opt_uuid("north"),
        opt_uuid("northeast"),
        opt_uuid("east"),
        opt_uuid("southeast"),
        opt_uuid("south"),
        opt_uuid("southwest"),
        opt_uuid("west"),
        opt_uuid("northwest"),
        opt_uuid("up"),
        opt_uuid("down"),
        created_at(),
    ],
};

pub static CHARACTER_INSTANCE: Schema = Schema {
    table: "character_instance",
    fields: &[
        uuid("id"),
        uuid("character_id"),
        uuid("dungeon_instance_id"),
        uuid("location_instance_id"),
        text("name"),
        int("strength"),
        int("dexterity"),
        int("intelligence"),
        int("health"),
        int("fatigue"),
        int("coins"),
        int("experience_points"),
        int("attribute_points"),
        int("turn_number"),
        created_at(),
        updated_at(),
    ],
};

pub static MONSTER_INSTANCE: Schema = Schema {
    table: "monster_instance",
    fields: &[
        uuid("id"),
        uuid("monster_id"),
        uuid("dungeon_instance_id"),
        uuid("location_instance_id"),
        text("name"),
        int("strength"),
        int("dexterity"),
        int("intelligence"),
        int("health"),
        int("fatigue"),
        int("coins"),
        int("experience_points"),
        int("attribute_points"),
        int("turn_number"),
        created_at(),
        updated_at(),
    ],
};

pub static OBJECT_INSTANCE: Schema = Schema {
    table: "object_instance",
    fields: &[
        uuid("id"),
        uuid("object_id"),
        uuid("dungeon_instance_id"),
        text("name"),
        opt_uuid("location_instance_id"),
        opt_uuid("character_instance_id"),
        opt_uuid("monster_instance_id"),
        boolean("is_equipped"),
        boolean("is_stashed"),
        created_at(),
        updated_at(),
    ],
};

// =============================================================================
// Action history
// =============================================================================

pub static ACTION: Schema = Schema {
    table: "action",
    fields: &[
        uuid("id"),
        uuid("dungeon_instance_id"),
        uuid("location_instance_id"),
        opt_uuid("character_instance_id"),
        opt_uuid("monster_instance_id"),
        int("turn_number"),
        text("sentence"),
        text("command"),
        text("resolved_command"),
        opt_uuid("equipped_object_instance_id"),
        opt_uuid("stashed_object_instance_id"),
        opt_uuid("dropped_object_instance_id"),
        opt_uuid("target_object_instance_id"),
        opt_uuid("target_character_instance_id"),
        opt_uuid("target_monster_instance_id"),
        opt_uuid("target_location_instance_id"),
        opt_text("target_location_direction"),
        created_at(),
    ],
};

pub static ACTION_CHARACTER: Schema = Schema {
    table: "action_character",
    fields: &[
        uuid("id"),
        uuid("action_id"),
        uuid("character_instance_id"),
        text("record_type"),
        text("name"),
        uuid("location_instance_id"),
        int("strength"),
        int("dexterity"),
        int("intelligence"),
        int("health"),
        int("fatigue"),
        int("current_strength"),
        int("current_dexterity"),
        int("current_intelligence"),
        int("current_health"),
        int("current_fatigue"),
        int("previous_health"),
        int("previous_fatigue"),
        int("coins"),
        int("experience_points"),
        int("attribute_points"),
        created_at(),
    ],
};

pub static ACTION_MONSTER: Schema = Schema {
    table: "action_monster",
    fields: &[
        uuid("id"),
        uuid("action_id"),
        uuid("monster_instance_id"),
        text("record_type"),
        text("name"),
        uuid("location_instance_id"),
        int("strength"),
        int("dexterity"),
        int("intelligence"),
        int("health"),
        int("fatigue"),
        int("current_strength"),
        int("current_dexterity"),
        int("current_intelligence"),
        int("current_health"),
        int("current_fatigue"),
        int("previous_health"),
        int("previous_fatigue"),
        int("coins"),
        int("experience_points"),
        int("attribute_points"),
        created_at(),
    ],
};

pub static ACTION_CHARACTER_OBJECT: Schema = Schema {
    table: "action_character_object",
    fields: &[
        uuid("id"),
        uuid("action_id"),
        uuid("action_character_id"),
        uuid("object_instance_id"),
        text("name"),
        boolean("is_equipped"),
        boolean("is_stashed"),
        created_at(),
    ],
};

pub static ACTION_MONSTER_OBJECT: Schema = Schema {
    table: "action_monster_object",
    fields: &[
        uuid("id"),
        uuid("action_id"),
        uuid("action_monster_id"),
        uuid("object_instance_id"),
        text("name"),
        boolean("is_equipped"),
        boolean("is_stashed"),
        created_at(),
    ],
};

pub static ACTION_OBJECT: Schema = Schema {
    table: "action_object",
    fields: &[
        uuid("id"),
        uuid("action_id"),
        uuid("object_instance_id"),
        text("record_type"),
        text("name"),
        text("description"),
        boolean("is_equipped"),
        boolean("is_stashed"),
        opt_uuid("location_instance_id"),
        opt_uuid("character_instance_id"),
        opt_uuid("monster_instance_id"),
        created_at(),
    ],
};

/// Every schema, in foreign-key order
pub static ALL_SCHEMAS: [&Schema; 20] = [
    &DUNGEON,
    &LOCATION,
    &CHARACTER,
    &MONSTER,
    &OBJECT,
    &LOCATION_OBJECT,
    &LOCATION_MONSTER,
    &MONSTER_OBJECT,
    &CHARACTER_OBJECT,
    &DUNGEON_INSTANCE,
    &LOCATION_INSTANCE,
    &CHARACTER_INSTANCE,
    &MONSTER_INSTANCE,
    &OBJECT_INSTANCE,
    &ACTION,
    &ACTION_CHARACTER,
    &ACTION_MONSTER,
    &ACTION_CHARACTER_OBJECT,
    &ACTION_MONSTER_OBJECT,
    &ACTION_OBJECT,
];

record!(Dungeon, DungeonId, DUNGEON);
record!(Location, LocationId, LOCATION);
record!(Character, CharacterId, CHARACTER);
record!(Monster, MonsterId, MONSTER);
record!(Object, ObjectId, OBJECT);
record!(LocationObject, LocationObjectId, LOCATION_OBJECT);
record!(LocationMonster, LocationMonsterId, LOCATION_MONSTER);
record!(MonsterObject, MonsterObjectId, MONSTER_OBJECT);
record!(CharacterObject, CharacterObjectId, CHARACTER_OBJECT);
record!(DungeonInstance, DungeonInstanceId, DUNGEON_INSTANCE);
record!(LocationInstance, LocationInstanceId, LOCATION_INSTANCE);
record!(CharacterInstance, CharacterInstanceId, CHARACTER_INSTANCE);
record!(MonsterInstance, MonsterInstanceId, MONSTER_INSTANCE);
record!(ObjectInstance, ObjectInstanceId, OBJECT_INSTANCE);
record!(Action, ActionId, ACTION);
record!(ActionCharacter, ActionCharacterId, ACTION_CHARACTER);
record!(ActionMonster, ActionMonsterId, ACTION_MONSTER);
record!(ActionCharacterObject, ActionCharacterObjectId, ACTION_CHARACTER_OBJECT);
record!(ActionMonsterObject, ActionMonsterObjectId, ACTION_MONSTER_OBJECT);
record!(ActionObject, ActionObjectId, ACTION_OBJECT);
