use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{Request, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch},
};
use tracing::debug;

use crate::{
    auth::{Identity, bearer_token},
    dto::game::{
        ActionResponse, CreateGameRequest, CreatedGame, GameListItem, GameResponse,
        UpdateHoleScoreRequest,
    },
    error::AppError,
    scorecard::HoleKey,
    services::game_service,
    state::SharedState,
};

/// Scorecard endpoints, all behind the authentication gate.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game).delete(delete_game))
        .route("/games/{id}/holes/{hole_id}", patch(update_hole_score))
        .route_layer(middleware::from_fn_with_state(state, require_identity))
}

/// List the caller's games, newest first.
#[utoipa::path(
    get,
    path = "/games",
    tag = "game",
    params(("Authorization" = String, Header, description = "Token, with or without a `Bearer ` prefix")),
    responses(
        (status = 200, description = "Games owned by the caller", body = [GameListItem]),
        (status = 401, description = "Missing or rejected token")
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<Vec<GameListItem>>, AppError> {
    Ok(Json(game_service::list_games(&state, &caller).await?))
}

/// Fetch one game with names and totals filled in.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(
        ("Authorization" = String, Header, description = "Token, with or without a `Bearer ` prefix"),
        ("id" = String, Path, description = "Identifier of the game")
    ),
    responses(
        (status = 200, description = "Aggregated scorecard", body = GameResponse),
        (status = 404, description = "Unknown or malformed game id")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    let id = game_service::parse_game_id(&id)?;
    Ok(Json(game_service::get_game(&state, &caller, id).await?))
}

/// Create a game with an empty scorecard.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    params(("Authorization" = String, Header, description = "Token, with or without a `Bearer ` prefix")),
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = CreatedGame),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedGame>), AppError> {
    let Json(payload) = payload?;
    let created = game_service::create_game(&state, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a game.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "game",
    params(
        ("Authorization" = String, Header, description = "Token, with or without a `Bearer ` prefix"),
        ("id" = String, Path, description = "Identifier of the game")
    ),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 404, description = "Unknown or malformed game id")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = game_service::parse_game_id(&id)?;
    game_service::delete_game(&state, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the scores recorded on one hole.
#[utoipa::path(
    patch,
    path = "/games/{id}/holes/{hole_id}",
    tag = "game",
    params(
        ("Authorization" = String, Header, description = "Token, with or without a `Bearer ` prefix"),
        ("id" = String, Path, description = "Identifier of the game"),
        ("hole_id" = u32, Path, description = "Hole number, starting at 1")
    ),
    request_body = UpdateHoleScoreRequest,
    responses(
        (status = 200, description = "Hole updated", body = ActionResponse),
        (status = 404, description = "Unknown game, malformed game id or unknown hole")
    )
)]
pub async fn update_hole_score(
    State(state): State<SharedState>,
    Extension(caller): Extension<Identity>,
    path: Result<Path<(String, u32)>, PathRejection>,
    payload: Result<Json<UpdateHoleScoreRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, AppError> {
    let Path((id, hole_id)) = path?;
    let id = game_service::parse_game_id(&id)?;
    let Json(payload) = payload?;
    let response =
        game_service::update_hole_score(&state, &caller, id, HoleKey::new(hole_id), payload)
            .await?;
    Ok(Json(response))
}

/// Resolve the `authorization` header into an [`Identity`] stored in the request extensions.
async fn require_identity(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers().get(AUTHORIZATION))?;
    let identity = state.verifier().verify(token).await.map_err(|err| {
        debug!(error = %err, "token rejected");
        AppError::from(err)
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
