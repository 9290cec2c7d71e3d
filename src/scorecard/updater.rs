use super::{HoleKey, HoleMap, HoleScore};

/// Wholesale replacement of one hole's score list.
///
/// Whole-hole granularity, last write wins. Nothing about the submitted list is checked: count,
/// index uniqueness and score range are the caller's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoleUpdate {
    hole: HoleKey,
    scores: Vec<HoleScore>,
}

/// Build the update replacing the scores of `hole` with `scores`.
///
/// Names are a read-side annotation, so any name sent back by a client is dropped.
pub fn build_hole_update(hole: HoleKey, scores: Vec<HoleScore>) -> HoleUpdate {
    let scores = scores
        .into_iter()
        .map(|score| HoleScore {
            name: None,
            ..score
        })
        .collect();
    HoleUpdate { hole, scores }
}

impl HoleUpdate {
    /// Hole targeted by the update.
    pub fn hole(&self) -> HoleKey {
        self.hole
    }

    /// Replacement score list.
    pub fn scores(&self) -> &[HoleScore] {
        &self.scores
    }

    /// Dotted document path of the targeted hole, e.g. `holes.3`.
    pub fn field_path(&self) -> String {
        format!("holes.{}", self.hole)
    }

    /// Replace the targeted hole's list in `holes`.
    ///
    /// Returns `false` without touching anything when the hole does not exist, since updates
    /// never add hole keys.
    pub fn apply_to(self, holes: &mut HoleMap) -> bool {
        match holes.get_mut(&self.hole) {
            Some(slot) => {
                *slot = self.scores;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorecard::{Player, ScorecardIndex, initialize};

    fn score(index: u32, value: Option<i32>) -> HoleScore {
        HoleScore {
            scorecard_index: ScorecardIndex::new(index),
            score: value,
            name: None,
        }
    }

    fn grid() -> HoleMap {
        let players = vec![
            Player {
                name: "A".into(),
                uid: None,
            },
            Player {
                name: "B".into(),
                uid: None,
            },
        ];
        initialize(players, 3).1
    }

    #[test]
    fn field_path_targets_the_hole() {
        let update = build_hole_update(HoleKey::new(12), vec![]);
        assert_eq!(update.field_path(), "holes.12");
    }

    #[test]
    fn replaces_only_the_target_hole() {
        let mut holes = grid();
        let before = holes.clone();

        let applied = build_hole_update(HoleKey::new(2), vec![score(1, Some(5))]).apply_to(&mut holes);

        assert!(applied);
        assert_eq!(holes[&HoleKey::new(2)], vec![score(1, Some(5))]);
        assert_eq!(holes[&HoleKey::new(1)], before[&HoleKey::new(1)]);
        assert_eq!(holes[&HoleKey::new(3)], before[&HoleKey::new(3)]);
    }

    #[test]
    fn later_update_wins() {
        let mut holes = grid();

        build_hole_update(HoleKey::new(1), vec![score(0, Some(4)), score(1, Some(5))])
            .apply_to(&mut holes);
        build_hole_update(HoleKey::new(1), vec![score(0, Some(3))]).apply_to(&mut holes);

        assert_eq!(holes[&HoleKey::new(1)], vec![score(0, Some(3))]);
    }

    #[test]
    fn unknown_hole_is_not_added() {
        let mut holes = grid();

        let applied = build_hole_update(HoleKey::new(4), vec![score(0, Some(1))]).apply_to(&mut holes);

        assert!(!applied);
        assert_eq!(holes, grid());
    }

    #[test]
    fn submitted_names_are_dropped() {
        let mut named = score(0, Some(2));
        named.name = Some("A".into());

        let update = build_hole_update(HoleKey::new(1), vec![named]);

        assert_eq!(update.scores(), &[score(0, Some(2))]);
    }
}
