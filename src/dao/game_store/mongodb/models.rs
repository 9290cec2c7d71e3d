use mongodb::bson::{Bson, DateTime, Document, doc, error::Error as BsonError, serialize_to_bson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::{
        models::{GameListItemEntity, StoredHoles, decode_holes, encode_holes},
        storage::{StorageError, StorageResult},
    },
    scorecard::{Game, HoleScore, IndexedPlayer},
};

/// Game as laid out in the `games` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    created_at: DateTime,
    user_id: String,
    players: Vec<IndexedPlayer>,
    holes: StoredHoles,
}

impl From<Game> for MongoGameDocument {
    fn from(value: Game) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            created_at: DateTime::from_system_time(value.created_at),
            user_id: value.user_id,
            players: value.players,
            holes: encode_holes(value.holes),
        }
    }
}

impl TryFrom<MongoGameDocument> for Game {
    type Error = StorageError;

    fn try_from(value: MongoGameDocument) -> StorageResult<Self> {
        let id = parse_id(&value.id)?;
        Ok(Self {
            id,
            title: value.title,
            created_at: value.created_at.to_system_time(),
            user_id: value.user_id,
            players: value.players,
            holes: decode_holes(id, value.holes)?,
        })
    }
}

/// Projection of [`MongoGameDocument`] fetched by listing queries.
#[derive(Debug, Clone, Deserialize)]
pub struct MongoGameListDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    created_at: DateTime,
}

impl MongoGameListDocument {
    /// Fields to project so listing never loads rosters or holes.
    pub fn projection() -> Document {
        doc! { "title": 1, "created_at": 1 }
    }
}

impl TryFrom<MongoGameListDocument> for GameListItemEntity {
    type Error = StorageError;

    fn try_from(value: MongoGameListDocument) -> StorageResult<Self> {
        Ok(Self {
            id: parse_id(&value.id)?,
            title: value.title,
            created_at: value.created_at.to_system_time(),
        })
    }
}

fn parse_id(raw: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(raw).map_err(|err| StorageError::malformed(raw, err.to_string()))
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

/// BSON array written in place of a hole's score list, encoded through the same serde
/// derive as [`MongoGameDocument::holes`].
pub fn scores_as_bson(scores: &[HoleScore]) -> Result<Bson, BsonError> {
    serialize_to_bson(scores)
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use mongodb::bson::serialize_to_document;

    use super::*;
    use crate::scorecard::{self, HoleKey, Player, ScorecardIndex};

    fn game() -> Game {
        let players = vec![
            Player {
                name: "A".into(),
                uid: None,
            },
            Player {
                name: "B".into(),
                uid: Some("u-b".into()),
            },
        ];
        let (players, holes) = scorecard::initialize(players, 2);
        Game {
            id: Uuid::new_v4(),
            title: "Sunday round".into(),
            created_at: SystemTime::now(),
            user_id: "alice".into(),
            players,
            holes,
        }
    }

    #[test]
    fn hole_update_matches_stored_hole_layout() {
        let mut game = game();
        let scores = vec![
            HoleScore {
                scorecard_index: ScorecardIndex::new(0),
                score: Some(4),
                name: None,
            },
            HoleScore::empty(ScorecardIndex::new(1)),
        ];
        game.holes.insert(HoleKey::new(1), scores.clone());

        let stored = serialize_to_document(&MongoGameDocument::from(game)).unwrap();
        let hole = stored.get_document("holes").unwrap().get("1").unwrap();

        assert_eq!(hole, &scores_as_bson(&scores).unwrap());
    }

    #[test]
    fn document_round_trips_to_game() {
        let game = game();
        let document = MongoGameDocument::from(game.clone());
        let restored = Game::try_from(document).unwrap();

        assert_eq!(restored.id, game.id);
        assert_eq!(restored.holes, game.holes);
        assert_eq!(restored.players, game.players);
    }
}
