use super::{HoleKey, HoleMap, HoleScore, IndexedPlayer, Player, ScorecardIndex};

/// Assign scorecard positions to the roster and build an empty score grid.
///
/// Every hole from `1` to `number_holes` receives one unrecorded score per player, in roster
/// order. Inputs are expected to be validated by the caller.
pub fn initialize(players: Vec<Player>, number_holes: u32) -> (Vec<IndexedPlayer>, HoleMap) {
    let indexed: Vec<IndexedPlayer> = players
        .into_iter()
        .zip(0u32..)
        .map(|(player, index)| IndexedPlayer {
            name: player.name,
            uid: player.uid,
            scorecard_index: ScorecardIndex::new(index),
        })
        .collect();

    let holes = (1..=number_holes)
        .map(|number| {
            let scores = indexed
                .iter()
                .map(|player| HoleScore::empty(player.scorecard_index))
                .collect();
            (HoleKey::new(number), scores)
        })
        .collect();

    (indexed, holes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<Player> {
        names
            .iter()
            .map(|name| Player {
                name: (*name).into(),
                uid: None,
            })
            .collect()
    }

    #[test]
    fn indexes_follow_roster_order() {
        let mut players = roster(&["Ann", "Bob", "Cid"]);
        players[1].uid = Some("uid-bob".into());

        let (indexed, _) = initialize(players, 1);

        let summary: Vec<_> = indexed
            .iter()
            .map(|p| (p.name.as_str(), p.scorecard_index.get(), p.uid.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![("Ann", 0, None), ("Bob", 1, Some("uid-bob")), ("Cid", 2, None)]
        );
    }

    #[test]
    fn grid_has_one_null_score_per_player_and_hole() {
        for (number_holes, player_count) in [(1u32, 1usize), (9, 4), (18, 2)] {
            let names: Vec<String> = (0..player_count).map(|i| format!("p{i}")).collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();

            let (_, holes) = initialize(roster(&names), number_holes);

            assert_eq!(holes.len(), number_holes as usize);
            let keys: Vec<u32> = holes.keys().map(|key| key.get()).collect();
            assert_eq!(keys, (1..=number_holes).collect::<Vec<_>>());

            for scores in holes.values() {
                assert_eq!(scores.len(), player_count);
                assert!(scores.iter().all(|s| s.score.is_none() && s.name.is_none()));
                let indexes: Vec<u32> = scores.iter().map(|s| s.scorecard_index.get()).collect();
                assert_eq!(indexes, (0..player_count as u32).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn is_deterministic() {
        let first = initialize(roster(&["Ann", "Bob"]), 3);
        let second = initialize(roster(&["Ann", "Bob"]), 3);
        assert_eq!(first, second);
    }
}
