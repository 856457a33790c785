use serde::Deserialize;

use crate::game::{Game, State};
use crate::hungarian::{VecMatrix, hungarian_algorithm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cost {
    Solvable(usize),
    Impossible,
}

/// Trait for computing heuristics that estimate the number of moves needed to solve a game.
pub trait Heuristic {
    /// Compute estimated number of moves needed to complete the game from `state`.
    fn estimate(&self, game: &Game, state: &State) -> Cost;
}

/// Which heuristic the informed search ranks nodes with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicKind {
    /// Sum of each box's distance to its nearest goal.
    #[default]
    Manhattan,
    /// Minimum-cost one-to-one assignment of boxes to goals.
    Matching,
}

pub struct NullHeuristic;

impl Heuristic for NullHeuristic {
    fn estimate(&self, _game: &Game, _state: &State) -> Cost {
        Cost::Solvable(0)
    }
}

/// Sums, over all boxes, the Manhattan distance to the closest goal.
///
/// Several boxes may pick the same goal, so the estimate is cheap but can be
/// far from the true cost when boxes compete for one goal.
pub struct ManhattanHeuristic;

impl Heuristic for ManhattanHeuristic {
    fn estimate(&self, game: &Game, state: &State) -> Cost {
        let mut total_distance = 0;

        for &pos in state.boxes() {
            let min_distance = game.goals().iter().map(|&goal| pos.manhattan(goal)).min();
            match min_distance {
                Some(distance) => total_distance += distance,
                None => return Cost::Impossible,
            }
        }

        Cost::Solvable(total_distance)
    }
}

/// Assigns every box to a distinct goal so that the summed Manhattan distance
/// is minimal.
pub struct MatchingHeuristic;

impl Heuristic for MatchingHeuristic {
    fn estimate(&self, game: &Game, state: &State) -> Cost {
        let boxes = state.boxes();
        let goals = game.goals();
        if boxes.len() > goals.len() {
            return Cost::Impossible;
        }

        let mut costs = VecMatrix::new(boxes.len(), goals.len());
        for &pos in boxes {
            for &goal in goals {
                costs.push(pos.manhattan(goal));
            }
        }

        Cost::Solvable(hungarian_algorithm(&costs))
    }
}
