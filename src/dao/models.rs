use std::{collections::BTreeMap, time::SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::storage::{StorageError, StorageResult},
    scorecard::{Game, HoleKey, HoleMap, HoleScore},
};

/// Hole map as laid out inside stored documents, where object keys must be strings.
pub type StoredHoles = BTreeMap<String, Vec<HoleScore>>;

/// Summary of a game returned by listing queries (subset of [`Game`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameListItemEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Title chosen by the owner.
    pub title: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

impl From<&Game> for GameListItemEntity {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id,
            title: game.title.clone(),
            created_at: game.created_at,
        }
    }
}

/// Convert a hole map into its document representation.
pub fn encode_holes(holes: HoleMap) -> StoredHoles {
    holes
        .into_iter()
        .map(|(key, scores)| (key.to_string(), scores))
        .collect()
}

/// Convert stored holes back into a hole map, rejecting keys that are not hole numbers.
pub fn decode_holes(game_id: Uuid, holes: StoredHoles) -> StorageResult<HoleMap> {
    holes
        .into_iter()
        .map(|(key, scores)| {
            let hole = key.parse::<HoleKey>().map_err(|err| {
                StorageError::malformed(game_id.to_string(), format!("hole key `{key}`: {err}"))
            })?;
            Ok((hole, scores))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorecard::ScorecardIndex;

    #[test]
    fn holes_survive_the_document_layout() {
        let mut holes = HoleMap::new();
        for number in [1, 2, 10] {
            holes.insert(
                HoleKey::new(number),
                vec![HoleScore::empty(ScorecardIndex::new(0))],
            );
        }

        let stored = encode_holes(holes.clone());
        assert!(stored.contains_key("10"));

        let decoded = decode_holes(Uuid::nil(), stored).unwrap();
        assert_eq!(decoded, holes);
        let order: Vec<u32> = decoded.keys().map(|k| k.get()).collect();
        assert_eq!(order, vec![1, 2, 10]);
    }

    #[test]
    fn non_numeric_hole_key_is_rejected() {
        let mut stored = StoredHoles::new();
        stored.insert("front".into(), vec![]);

        let err = decode_holes(Uuid::nil(), stored).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));
    }
}
