//! Sliding ice puzzle solver.
//!
//! The agent slides until it hits an obstacle, the board edge or a goal.
//! [`solver::SlideSolver`] finds shortest move sequences with A* and computes
//! whole-board distance fields by breadth-first search over reversed slides.

pub mod algorithm;
pub mod batch;
pub mod common;
pub mod config;
pub mod field;
pub mod map;
pub mod solver;
pub mod stat;

pub use algorithm::Heuristic;
pub use common::{Direction, Move, Position, SearchOutcome, Solution};
pub use field::{DistanceField, Reach, ReachSummary};
pub use map::{Cell, Map};
pub use solver::SlideSolver;
