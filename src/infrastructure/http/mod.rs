//! HTTP REST API routes

mod action_routes;
mod dungeon_routes;

use axum::{http::StatusCode, routing::post, Router};
use std::sync::Arc;

use crate::application::errors::ActionError;
use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Instance lifecycle
        .route(
            "/api/dungeons/{dungeon_id}/characters/{character_id}/enter",
            post(dungeon_routes::enter_dungeon),
        )
        .route(
            "/api/dungeon-instances/{id}/characters/{character_instance_id}/exit",
            post(dungeon_routes::exit_dungeon),
        )
        .route(
            "/api/dungeon-instances/{id}/turn",
            post(dungeon_routes::advance_turn),
        )
        // Actions
        .route(
            "/api/dungeon-instances/{id}/actions",
            post(action_routes::submit_action),
        )
}

/// Map an engine error onto a response status and message
pub(crate) fn error_response(err: ActionError) -> (StatusCode, String) {
    let status = match &err {
        ActionError::Command(_) => StatusCode::BAD_REQUEST,
        ActionError::NotFound(_) => StatusCode::NOT_FOUND,
        ActionError::NoExit(_) | ActionError::Ownership(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ActionError::DuplicateAction { .. } | ActionError::Concurrency(_) => StatusCode::CONFLICT,
        ActionError::CapacityInvariant { .. } | ActionError::Persistence(_) => {
            tracing::error!("Engine failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<uuid::Uuid, (StatusCode, String)> {
    uuid::Uuid::parse_str(raw).map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid {} ID", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::services::test_fixtures::CaveFixture;
    use crate::domain::services::CommandError;
    use crate::domain::value_objects::Direction;
    use crate::infrastructure::config::{AppConfig, StoreConfig, StoreKind};
    use crate::infrastructure::persistence::StoreBackend;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (ActionError::Command(CommandError::Empty), StatusCode::BAD_REQUEST),
            (ActionError::not_found("goblin"), StatusCode::NOT_FOUND),
            (ActionError::NoExit(Direction::North), StatusCode::UNPROCESSABLE_ENTITY),
            (ActionError::ownership("not yours"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ActionError::DuplicateAction {
                    actor: "Barricade".to_string(),
                    turn_number: 0,
                },
                StatusCode::CONFLICT,
            ),
            (ActionError::Concurrency("row".to_string()), StatusCode::CONFLICT),
            (
                ActionError::Persistence("disk".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(error_response(err).0, expected);
        }
    }

    fn app(cave: &CaveFixture) -> Router {
        let config = AppConfig {
            store: StoreConfig {
                kind: StoreKind::Memory,
                database_url: String::new(),
                max_connections: 1,
            },
            server_port: 0,
        };
        let store = Arc::new(StoreBackend::Memory((*cave.store).clone()));
        create_routes().with_state(Arc::new(AppState::with_store(config, store)))
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_enter_then_act_over_http() {
        let cave = CaveFixture::seed().await;
        let app = app(&cave);

        let (status, entered) = post(
            &app,
            &format!(
                "/api/dungeons/{}/characters/{}/enter",
                cave.dungeon.id, cave.barricade.id
            ),
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let instance_id = entered["dungeon_instance_id"].as_str().unwrap().to_string();
        let character_instance_id = entered["id"].as_str().unwrap().to_string();

        let actions = format!("/api/dungeon-instances/{}/actions", instance_id);
        let body = json!({ "character_instance_id": character_instance_id, "sentence": "north" });
        let (status, record_set) = post(&app, &actions, body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record_set["action"]["resolved_command"], "move north");
        assert_eq!(record_set["location"]["name"], "Cave Tunnel");

        let (status, _) = post(&app, &actions, body).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let body = json!({ "character_instance_id": character_instance_id, "sentence": "fly" });
        let (status, _) = post(&app, &actions, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, advanced) = post(
            &app,
            &format!("/api/dungeon-instances/{}/turn", instance_id),
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(advanced["turn_number"], 1);

        let (status, exited) = post(
            &app,
            &format!(
                "/api/dungeon-instances/{}/characters/{}/exit",
                instance_id, character_instance_id
            ),
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(exited["dropped_objects"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_action_needs_exactly_one_actor() {
        let cave = CaveFixture::seed().await;
        let app = app(&cave);
        let uri = format!("/api/dungeon-instances/{}/actions", uuid::Uuid::new_v4());

        let (status, _) = post(&app, &uri, json!({ "sentence": "look" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = json!({ "character_instance_id": uuid::Uuid::new_v4(), "sentence": "look" });
        let (status, _) = post(&app, &uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = post(&app, "/api/dungeon-instances/nope/turn", Value::Null).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        let (status, message) = parse_id("not-a-uuid", "dungeon").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid dungeon ID");
    }
}
