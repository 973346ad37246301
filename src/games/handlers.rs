//! `/api/games` route handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::games::store::StoreError;
use crate::games::types::{Game, GameId, GameInput};
use crate::http::response::ApiError;
use crate::http::server::AppState;

const GAME_NOT_FOUND: &str = "game not found";

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/games", get(list_games).post(create_game))
        .route(
            "/api/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
}

/// Map a store failure: refusals carry the store's message to the caller,
/// everything else becomes a generic 500 with `context`.
fn store_failure(err: StoreError, context: &str) -> ApiError {
    match err {
        StoreError::Rejected { message, .. } => {
            tracing::warn!(error = %message, "{}", context);
            ApiError::BadRequest(message)
        }
        other => {
            tracing::error!(error = %other, "{}", context);
            ApiError::Internal(context.to_string())
        }
    }
}

fn json_body(body: Result<Json<GameInput>, JsonRejection>) -> Result<GameInput, ApiError> {
    body.map(|Json(input)| input)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<Game>>, ApiError> {
    state
        .games
        .list()
        .await
        .map(Json)
        .map_err(|e| store_failure(e, "failed to fetch games"))
}

async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Game>, ApiError> {
    let id: GameId = id
        .parse()
        .map_err(|_| ApiError::NotFound(GAME_NOT_FOUND.to_string()))?;

    match state.games.get(id).await {
        Ok(Some(game)) => Ok(Json(game)),
        Ok(None) | Err(StoreError::Rejected { .. }) => {
            Err(ApiError::NotFound(GAME_NOT_FOUND.to_string()))
        }
        Err(e) => Err(store_failure(e, "failed to fetch game")),
    }
}

async fn create_game(
    State(state): State<AppState>,
    body: Result<Json<GameInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Game>), ApiError> {
    let new_game = json_body(body)?
        .into_new_game()
        .map_err(|missing| ApiError::BadRequest(missing.to_string()))?;

    let game = state
        .games
        .insert(new_game)
        .await
        .map_err(|e| store_failure(e, "failed to create game"))?;

    tracing::info!(id = %game.id, name = %game.name, "Game created");
    Ok((StatusCode::CREATED, Json(game)))
}

async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<GameInput>, JsonRejection>,
) -> Result<Json<Game>, ApiError> {
    let id: GameId = id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid game id".to_string()))?;
    let patch = json_body(body)?.into_patch();
    if patch.is_empty() {
        return Err(ApiError::BadRequest("no fields to update".to_string()));
    }

    match state.games.update(id, patch).await {
        Ok(Some(game)) => Ok(Json(game)),
        Ok(None) => Err(ApiError::NotFound(GAME_NOT_FOUND.to_string())),
        Err(e) => Err(store_failure(e, "failed to update game")),
    }
}

async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id: GameId = id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid game id".to_string()))?;

    state
        .games
        .delete(id)
        .await
        .map_err(|e| store_failure(e, "failed to delete game"))?;

    tracing::info!(id = %id, "Game deleted");
    Ok(Json(DeletedResponse {
        message: "game deleted",
    }))
}
