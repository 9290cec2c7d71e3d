use std::collections::HashMap;

use super::{Game, HoleMap, ScorecardIndex};

/// Player of the read view, carrying its running total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredPlayer {
    /// Display name.
    pub name: String,
    /// Optional account identifier of the player.
    pub uid: Option<String>,
    /// Join key between the player and its hole scores.
    pub scorecard_index: ScorecardIndex,
    /// Sum of every recorded score, unrecorded holes counting as zero.
    pub total_score: i32,
}

/// Read view of a game: name-annotated holes and per-player totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedScorecard {
    /// Copy of the game's holes with player names filled in where resolvable.
    pub holes: HoleMap,
    /// Roster in scorecard order with computed totals.
    pub players: Vec<ScoredPlayer>,
}

/// Compute every player's total and annotate hole scores with player names.
///
/// Scores whose index matches no player are left unnamed and count towards nobody; stored
/// data may be inconsistent and this never fails. When several players share an index the
/// first one in roster order wins.
pub fn aggregate(game: &Game) -> AggregatedScorecard {
    let mut players: Vec<ScoredPlayer> = game
        .players
        .iter()
        .map(|player| ScoredPlayer {
            name: player.name.clone(),
            uid: player.uid.clone(),
            scorecard_index: player.scorecard_index,
            total_score: 0,
        })
        .collect();

    let mut positions: HashMap<ScorecardIndex, usize> = HashMap::with_capacity(players.len());
    for (position, player) in players.iter().enumerate() {
        positions.entry(player.scorecard_index).or_insert(position);
    }

    let mut holes = game.holes.clone();
    for scores in holes.values_mut() {
        for hole_score in scores.iter_mut() {
            let Some(&position) = positions.get(&hole_score.scorecard_index) else {
                hole_score.name = None;
                continue;
            };

            let player = &mut players[position];
            hole_score.name = Some(player.name.clone());
            player.total_score = player
                .total_score
                .saturating_add(hole_score.score.unwrap_or(0));
        }
    }

    AggregatedScorecard { holes, players }
}
