use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::GameListItemEntity,
    dto::{format_system_time, validation::validate_not_blank},
    scorecard::{
        AggregatedScorecard, Game, HoleScore, MAX_HOLES, Player, ScorecardIndex, ScoredPlayer,
    },
};

const MAX_NUMBER_HOLES: i64 = MAX_HOLES as i64;

/// Payload used to create a new scorecard.
///
/// Missing fields fall back to empty values so they are reported by validation rather than
/// by the JSON extractor.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[serde(default)]
    #[validate(range(min = 1, max = MAX_NUMBER_HOLES))]
    pub number_holes: i64,
    #[serde(default)]
    #[validate(length(min = 1), nested)]
    pub players: Vec<PlayerInput>,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
}

/// Player entry of a creation payload.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct PlayerInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub uid: Option<String>,
}

impl From<PlayerInput> for Player {
    fn from(input: PlayerInput) -> Self {
        Self {
            name: input.name,
            uid: input.uid,
        }
    }
}

/// Replacement score list for one hole.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateHoleScoreRequest {
    pub scores: Vec<HoleScoreInput>,
}

/// Score submitted for one player on the targeted hole. Any `name` sent along is ignored.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoleScoreInput {
    pub scorecard_index: u32,
    #[serde(default)]
    pub score: Option<i32>,
}

impl From<HoleScoreInput> for HoleScore {
    fn from(input: HoleScoreInput) -> Self {
        Self {
            scorecard_index: ScorecardIndex::new(input.scorecard_index),
            score: input.score,
            name: None,
        }
    }
}

/// Identifier of a freshly created game.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedGame {
    pub id: Uuid,
}

/// Confirmation returned by mutating endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

/// Entry of the game list: never carries players nor holes.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListItem {
    pub id: Uuid,
    pub title: String,
    /// RFC 3339 creation time.
    pub date: String,
}

impl From<GameListItemEntity> for GameListItem {
    fn from(entity: GameListItemEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            date: format_system_time(entity.created_at),
        }
    }
}

/// Aggregated view of a game: named hole scores and per-player totals.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: Uuid,
    pub title: String,
    pub date: String,
    pub user_id: String,
    pub players: Vec<ScoredPlayerView>,
    /// Hole number (as a string key) to the scores recorded on that hole.
    #[schema(value_type = Object)]
    pub holes: IndexMap<String, Vec<HoleScoreView>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPlayerView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub scorecard_index: u32,
    pub total_score: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoleScoreView {
    pub scorecard_index: u32,
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<ScoredPlayer> for ScoredPlayerView {
    fn from(player: ScoredPlayer) -> Self {
        Self {
            name: player.name,
            uid: player.uid,
            scorecard_index: player.scorecard_index.get(),
            total_score: player.total_score,
        }
    }
}

impl From<HoleScore> for HoleScoreView {
    fn from(score: HoleScore) -> Self {
        Self {
            scorecard_index: score.scorecard_index.get(),
            score: score.score,
            name: score.name,
        }
    }
}

impl GameResponse {
    /// Combine the stored game metadata with its aggregated scorecard.
    pub fn new(game: &Game, scorecard: AggregatedScorecard) -> Self {
        let holes = scorecard
            .holes
            .into_iter()
            .map(|(key, scores)| {
                (
                    key.to_string(),
                    scores.into_iter().map(Into::into).collect(),
                )
            })
            .collect();

        Self {
            id: game.id,
            title: game.title.clone(),
            date: format_system_time(game.created_at),
            user_id: game.user_id.clone(),
            players: scorecard.players.into_iter().map(Into::into).collect(),
            holes,
        }
    }
}
