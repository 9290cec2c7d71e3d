//! Scorecard domain model shared by the initializer, the aggregator and the hole updater.
//!
//! Two identifier spaces live side by side in a scorecard and must never be mixed up:
//! [`HoleKey`] addresses an entry of the hole map, while [`ScorecardIndex`] joins a hole
//! score to the player it belongs to.

pub mod aggregator;
pub mod initializer;
pub mod updater;

use std::{collections::BTreeMap, fmt, num::ParseIntError, str::FromStr, time::SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use aggregator::{AggregatedScorecard, ScoredPlayer, aggregate};
pub use initializer::initialize;
pub use updater::{HoleUpdate, build_hole_update};

/// Upper bound accepted for the number of holes of a new game.
pub const MAX_HOLES: u32 = 100;

/// 1-based identifier of a hole inside a game's hole map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoleKey(u32);

impl HoleKey {
    /// Wrap a raw hole number.
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// Raw hole number.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for HoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HoleKey {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// 0-based position of a player in the roster, assigned once when the game is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScorecardIndex(u32);

impl ScorecardIndex {
    /// Wrap a raw roster position.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw roster position.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ScorecardIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player as submitted when a game is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name.
    pub name: String,
    /// Optional account identifier of the player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Player enrolled in a game together with its stable scorecard position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedPlayer {
    /// Display name.
    pub name: String,
    /// Optional account identifier of the player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Join key between the player and its hole scores.
    pub scorecard_index: ScorecardIndex,
}

/// Score of one player on one hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleScore {
    /// Player this score belongs to.
    pub scorecard_index: ScorecardIndex,
    /// Strokes played, `None` until recorded.
    pub score: Option<i32>,
    /// Player name, only filled in on aggregated read views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl HoleScore {
    /// Unrecorded score for the given player.
    pub fn empty(scorecard_index: ScorecardIndex) -> Self {
        Self {
            scorecard_index,
            score: None,
            name: None,
        }
    }
}

/// Per-hole score lists keyed by hole, iterated in hole order.
pub type HoleMap = BTreeMap<HoleKey, Vec<HoleScore>>;

/// A scorecard session as persisted by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Primary key of the game.
    pub id: Uuid,
    /// Title chosen by the owner.
    pub title: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Identifier of the user owning the game.
    pub user_id: String,
    /// Roster in scorecard order.
    pub players: Vec<IndexedPlayer>,
    /// Scores of every hole.
    pub holes: HoleMap,
}
