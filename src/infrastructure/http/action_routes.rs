//! Action API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{error_response, parse_id};
use crate::application::dto::{ActionRecordSet, ActionRequestDto};
use crate::application::services::{ActionRequest, ActorRef};
use crate::domain::value_objects::{CharacterInstanceId, DungeonInstanceId, MonsterInstanceId};
use crate::infrastructure::state::AppState;

/// Submit a command sentence for a character or monster
pub async fn submit_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ActionRequestDto>,
) -> Result<Json<ActionRecordSet>, (StatusCode, String)> {
    let dungeon_instance_id = DungeonInstanceId::from_uuid(parse_id(&id, "dungeon instance")?);

    let actor = match (req.character_instance_id, req.monster_instance_id) {
        (Some(id), None) => ActorRef::Character(CharacterInstanceId::from_uuid(id)),
        (None, Some(id)) => ActorRef::Monster(MonsterInstanceId::from_uuid(id)),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "Exactly one of character_instance_id or monster_instance_id is required"
                    .to_string(),
            ))
        }
    };

    let record_set = state
        .action_service
        .process_action(ActionRequest::new(dungeon_instance_id, actor, req.sentence))
        .await
        .map_err(error_response)?;

    Ok(Json(record_set))
}
