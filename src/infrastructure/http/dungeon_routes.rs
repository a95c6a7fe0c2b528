//! Dungeon instance API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{error_response, parse_id};
use crate::application::dto::{
    CharacterInstanceResponseDto, DungeonInstanceResponseDto, ExitDungeonResponseDto,
};
use crate::domain::value_objects::{CharacterId, CharacterInstanceId, DungeonId, DungeonInstanceId};
use crate::infrastructure::state::AppState;

/// Enter a character into a dungeon
pub async fn enter_dungeon(
    State(state): State<Arc<AppState>>,
    Path((dungeon_id, character_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<CharacterInstanceResponseDto>), (StatusCode, String)> {
    let dungeon_id = DungeonId::from_uuid(parse_id(&dungeon_id, "dungeon")?);
    let character_id = CharacterId::from_uuid(parse_id(&character_id, "character")?);

    let instance = state
        .dungeon_instance_service
        .character_enter_dungeon(dungeon_id, character_id)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(CharacterInstanceResponseDto::from(instance)),
    ))
}

/// Remove a character from a dungeon instance
pub async fn exit_dungeon(
    State(state): State<Arc<AppState>>,
    Path((id, character_instance_id)): Path<(String, String)>,
) -> Result<Json<ExitDungeonResponseDto>, (StatusCode, String)> {
    let dungeon_instance_id = DungeonInstanceId::from_uuid(parse_id(&id, "dungeon instance")?);
    let character_instance_id =
        CharacterInstanceId::from_uuid(parse_id(&character_instance_id, "character instance")?);

    let dropped = state
        .dungeon_instance_service
        .character_exit_dungeon(dungeon_instance_id, character_instance_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ExitDungeonResponseDto {
        character_instance_id: character_instance_id.to_string(),
        dropped_objects: dropped.into_iter().map(|o| o.name).collect(),
    }))
}

/// Advance a dungeon instance to its next turn
pub async fn advance_turn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DungeonInstanceResponseDto>, (StatusCode, String)> {
    let dungeon_instance_id = DungeonInstanceId::from_uuid(parse_id(&id, "dungeon instance")?);

    let instance = state
        .dungeon_instance_service
        .advance_turn(dungeon_instance_id)
        .await
        .map_err(error_response)?;

    Ok(Json(DungeonInstanceResponseDto::from(instance)))
}
