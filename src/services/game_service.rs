use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::Identity,
    dto::game::{
        ActionResponse, CreateGameRequest, CreatedGame, GameListItem, GameResponse,
        UpdateHoleScoreRequest,
    },
    error::ServiceError,
    scorecard::{self, Game, HoleKey},
    state::SharedState,
};

/// Summaries of every game owned by the caller, newest first.
pub async fn list_games(
    state: &SharedState,
    caller: &Identity,
) -> Result<Vec<GameListItem>, ServiceError> {
    let store = state.require_game_store().await?;
    let mut games = store.list_games(caller.uid.clone()).await?;
    games.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    debug!(user = %caller.uid, count = games.len(), "listed games");
    Ok(games.into_iter().map(Into::into).collect())
}

/// Fetch one game and return its aggregated scorecard.
pub async fn get_game(
    state: &SharedState,
    caller: &Identity,
    id: Uuid,
) -> Result<GameResponse, ServiceError> {
    let game = find_owned_game(state, caller, id).await?;
    let scorecard = scorecard::aggregate(&game);
    Ok(GameResponse::new(&game, scorecard))
}

/// Validate the payload, lay out an empty scorecard and persist it for the caller.
pub async fn create_game(
    state: &SharedState,
    caller: &Identity,
    request: CreateGameRequest,
) -> Result<CreatedGame, ServiceError> {
    request.validate()?;

    let store = state.require_game_store().await?;

    let CreateGameRequest {
        number_holes,
        players,
        title,
    } = request;
    let number_holes = u32::try_from(number_holes)
        .map_err(|_| ServiceError::InvalidPayload(format!("invalid hole count {number_holes}")))?;

    let players = players.into_iter().map(Into::into).collect();
    let (players, holes) = scorecard::initialize(players, number_holes);

    let game = Game {
        id: Uuid::new_v4(),
        title,
        created_at: SystemTime::now(),
        user_id: caller.uid.clone(),
        players,
        holes,
    };
    let id = game.id;

    store.insert_game(game).await?;
    info!(game_id = %id, user = %caller.uid, number_holes, "game created");

    Ok(CreatedGame { id })
}

/// Delete one of the caller's games.
pub async fn delete_game(
    state: &SharedState,
    caller: &Identity,
    id: Uuid,
) -> Result<(), ServiceError> {
    find_owned_game(state, caller, id).await?;

    let store = state.require_game_store().await?;
    if !store.delete_game(id).await? {
        return Err(not_found(id));
    }

    info!(game_id = %id, user = %caller.uid, "game deleted");
    Ok(())
}

/// Replace the scores of one hole with a single store write.
pub async fn update_hole_score(
    state: &SharedState,
    caller: &Identity,
    id: Uuid,
    hole: HoleKey,
    request: UpdateHoleScoreRequest,
) -> Result<ActionResponse, ServiceError> {
    let store = state.require_game_store().await?;

    let scores = request.scores.into_iter().map(Into::into).collect();
    let update = scorecard::build_hole_update(hole, scores);

    if !store.update_hole(id, caller.uid.clone(), update).await? {
        return Err(ServiceError::NotFound(format!(
            "game `{id}` has no hole {hole}"
        )));
    }

    info!(game_id = %id, hole = %hole, "hole scores replaced");
    Ok(ActionResponse {
        message: format!("{id} - {hole} updated successfully"),
    })
}

/// Parse a game id taken from a path. Ids are opaque to callers, so one that is not a UUID
/// names no game and is reported as not found.
pub fn parse_game_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound(format!("game `{raw}` not found")))
}

async fn find_owned_game(
    state: &SharedState,
    caller: &Identity,
    id: Uuid,
) -> Result<Game, ServiceError> {
    let store = state.require_game_store().await?;
    match store.find_game(id).await? {
        Some(game) if game.user_id == caller.uid => Ok(game),
        Some(_) => {
            debug!(game_id = %id, user = %caller.uid, "game owned by another user");
            Err(not_found(id))
        }
        None => Err(not_found(id)),
    }
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("game `{id}` not found"))
}
