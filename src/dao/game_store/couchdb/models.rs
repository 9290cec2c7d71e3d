use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::{
        game_store::couchdb::error::CouchDaoError,
        models::{GameListItemEntity, StoredHoles, decode_holes, encode_holes},
        storage::StorageResult,
    },
    scorecard::{Game, IndexedPlayer},
};

pub const GAME_PREFIX: &str = "game::";
pub const END_SUFFIX: &str = "\u{ffff}";
pub const OWNER_INDEX: &str = "games-by-owner";

/// One page of a Mango `_find` answer.
#[derive(Debug, Deserialize)]
pub struct FindResponse {
    pub docs: Vec<Value>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

/// Listing projection: `_id`, `title` and `created_at` only.
#[derive(Debug, Deserialize)]
struct CouchGameListDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    created_at: SystemTime,
}

/// Mango query selecting one owner's games, projected to the listing fields.
pub fn find_games_query(owner: &str, limit: usize, bookmark: Option<&str>) -> Value {
    let mut query = json!({
        "selector": {
            "_id": { "$gt": GAME_PREFIX, "$lt": format!("{GAME_PREFIX}{END_SUFFIX}") },
            "user_id": owner,
        },
        "fields": ["_id", "title", "created_at"],
        "limit": limit,
    });
    if let Some(bookmark) = bookmark {
        query["bookmark"] = Value::from(bookmark);
    }
    query
}

/// Definition posted to `_index` so owner listings do not scan the database.
pub fn owner_index_definition() -> Value {
    json!({
        "index": { "fields": ["user_id"] },
        "name": OWNER_INDEX,
        "type": "json",
    })
}

/// Decode a page of listing rows. A row that is not a game summary is logged and skipped
/// so one bad document cannot hide the rest of the list.
pub fn list_items(path: &str, docs: Vec<Value>) -> Vec<GameListItemEntity> {
    docs.into_iter()
        .filter_map(|doc| match list_item(path, doc) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(error = %err, "skipping undecodable game document");
                None
            }
        })
        .collect()
}

fn list_item(path: &str, doc: Value) -> Result<GameListItemEntity, CouchDaoError> {
    let doc: CouchGameListDocument =
        serde_json::from_value(doc).map_err(|source| CouchDaoError::NotAGame {
            path: path.to_owned(),
            source,
        })?;
    Ok(GameListItemEntity {
        id: extract_uuid(&doc.id)?,
        title: doc.title,
        created_at: doc.created_at,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub game: GameBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBody {
    pub title: String,
    pub created_at: SystemTime,
    pub user_id: String,
    pub players: Vec<IndexedPlayer>,
    pub holes: StoredHoles,
}

impl From<Game> for CouchGameDocument {
    fn from(game: Game) -> Self {
        Self {
            id: game_doc_id(game.id),
            rev: None,
            game: GameBody {
                title: game.title,
                created_at: game.created_at,
                user_id: game.user_id,
                players: game.players,
                holes: encode_holes(game.holes),
            },
        }
    }
}

impl CouchGameDocument {
    pub fn into_entity(self) -> StorageResult<Game> {
        let id = extract_uuid(&self.id)?;
        Ok(Game {
            id,
            title: self.game.title,
            created_at: self.game.created_at,
            user_id: self.game.user_id,
            players: self.game.players,
            holes: decode_holes(id, self.game.holes)?,
        })
    }
}

pub fn game_doc_id(id: Uuid) -> String {
    format!("{}{}", GAME_PREFIX, id)
}

pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let id = doc_id
        .strip_prefix(GAME_PREFIX)
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing game prefix",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}
