mod astar;
mod distance;

pub(crate) use astar::a_star_search;
pub(crate) use distance::reverse_distance_field;
pub use distance::slide_origins;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::common::{Direction, Move, Position, Solution};
use crate::map::Map;

/// Lower-bound estimate of the slides still needed to reach a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// 0 on a goal, 1 when a goal shares the row or column, 2 otherwise.
    #[default]
    Aligned,
    /// Nearest goal by Manhattan distance. One slide can cross many cells, so
    /// this can overestimate and the returned path is not guaranteed optimal.
    Manhattan,
    /// Plain uniform-cost search.
    Zero,
}

impl Heuristic {
    pub(crate) fn estimate(self, map: &Map, position: Position) -> usize {
        match self {
            Heuristic::Aligned => {
                if map.is_goal(position) {
                    0
                } else if map
                    .goals()
                    .iter()
                    .any(|goal| goal.0 == position.0 || goal.1 == position.1)
                {
                    1
                } else if map.goals().is_empty() {
                    0
                } else {
                    2
                }
            }
            Heuristic::Manhattan => map
                .goals()
                .iter()
                .map(|goal| goal.0.abs_diff(position.0) + goal.1.abs_diff(position.1))
                .min()
                .unwrap_or(0),
            Heuristic::Zero => 0,
        }
    }
}

/// Arena entry of the forward search. `parent` indexes the same arena.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchNode {
    pub(crate) position: Position,
    pub(crate) g_cost: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) action: Option<Direction>,
}

/// Walks the parent chain from `goal` back to the root and returns the moves
/// in start-to-goal order.
fn construct_path(nodes: &[SearchNode], goal: usize) -> Solution {
    let mut moves = Vec::with_capacity(nodes[goal].g_cost);
    let mut current = &nodes[goal];
    while let (Some(parent), Some(direction)) = (current.parent, current.action) {
        moves.push(Move {
            direction,
            position: current.position,
        });
        current = &nodes[parent];
    }
    moves.reverse();
    Solution { moves }
}
