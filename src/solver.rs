//! The sliding-movement search engine.
//!
//! One [`SlideSolver`] borrows one read-only [`Map`] and answers both query
//! kinds against it. All per-query state lives inside the call, so separate
//! solvers over the same map can run on different threads.

use std::time::Instant;

use anyhow::bail;
use tracing::warn;

use crate::algorithm::{a_star_search, reverse_distance_field, Heuristic};
use crate::common::{Position, SearchOutcome};
use crate::config::Config;
use crate::field::DistanceField;
use crate::map::Map;
use crate::stat::Stats;

pub struct SlideSolver<'a> {
    map: &'a Map,
    heuristic: Heuristic,
    max_expansions: Option<usize>,
    stats: Stats,
}

impl<'a> SlideSolver<'a> {
    pub fn new(map: &'a Map) -> Self {
        Self::with_config(map, &Config::default())
    }

    pub fn with_config(map: &'a Map, config: &Config) -> Self {
        SlideSolver {
            map,
            heuristic: config.heuristic,
            max_expansions: config.max_expansions,
            stats: Stats::default(),
        }
    }

    pub fn heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn max_expansions(mut self, max_expansions: Option<usize>) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn map(&self) -> &Map {
        self.map
    }

    /// Statistics of the most recent query.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Shortest slide sequence from `start` to any goal.
    ///
    /// Errors only for inputs the engine cannot search at all; an unsolvable
    /// board or an exhausted budget is an `Ok` outcome.
    pub fn solve(&mut self, start: Position) -> anyhow::Result<SearchOutcome> {
        self.check_cell(start, "start")?;
        if self.map.goals().is_empty() {
            bail!("board has no goal (G or =)");
        }

        self.stats = Stats::default();
        let started = Instant::now();
        let outcome = a_star_search(
            self.map,
            start,
            self.heuristic,
            self.max_expansions,
            &mut self.stats,
        );
        self.stats.elapsed_us = started.elapsed().as_micros();
        self.stats.print("solve");

        if let SearchOutcome::BudgetExceeded { expansions } = outcome {
            warn!("search from {start:?} stopped after {expansions} expansions");
        }
        Ok(outcome)
    }

    /// Minimum slide count from every cell to `target`.
    ///
    /// `target` must be a goal cell, since only goal cells stop a slide in
    /// open space. Other goals on the board still stop slides passing over them.
    pub fn distance_field(&mut self, target: Position) -> anyhow::Result<DistanceField> {
        self.check_cell(target, "target")?;
        if !self.map.is_goal(target) {
            bail!("target {target:?} is not a goal cell (G or =)");
        }

        self.stats = Stats::default();
        let started = Instant::now();
        let field = reverse_distance_field(self.map, target, &mut self.stats);
        self.stats.elapsed_us = started.elapsed().as_micros();
        self.stats.print("distance field");

        Ok(field)
    }

    fn check_cell(&self, position: Position, role: &str) -> anyhow::Result<()> {
        if !self.map.in_bounds(position) {
            bail!(
                "{role} {position:?} is outside the {}x{} board",
                self.map.height,
                self.map.width
            );
        }
        if !self.map.is_passable(position) {
            bail!("{role} {position:?} is an obstacle");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::testing::random_board;
    use crate::common::Solution;
    use crate::field::{Reach, ReachSummary};

    #[test]
    fn test_engines_agree() {
        for seed in 0..300 {
            let (map, start) = random_board(seed, 5, 1);
            let mut solver = SlideSolver::new(&map).max_expansions(None);
            let outcome = solver.solve(start).unwrap();
            let field = solver.distance_field(map.target().unwrap()).unwrap();

            match (outcome, field.get(start)) {
                (SearchOutcome::Solved(solution), Reach::Steps(steps)) => {
                    assert_eq!(solution.len(), steps, "seed {seed}\n{map}");
                }
                (SearchOutcome::Unsolvable, Reach::Unreachable) => {}
                (outcome, reach) => panic!("seed {seed}: {outcome:?} vs {reach:?}\n{map}"),
            }
        }
    }

    #[test]
    fn test_unreachable_scenario() {
        let map = Map::from_rows(&["P.X", "XXX", "..G"]).unwrap();
        let mut solver = SlideSolver::new(&map);
        assert_eq!(solver.solve((0, 0)).unwrap(), SearchOutcome::Unsolvable);
        let field = solver.distance_field(map.target().unwrap()).unwrap();
        assert_eq!(field.distance_from((0, 0)), None);
        assert_eq!(field.get((0, 0)), Reach::Unreachable);
    }

    #[test]
    fn test_board_files() {
        let map = Map::from_file("map_file/maze-open.txt").unwrap();
        let start = map.require_start().unwrap();
        let mut solver = SlideSolver::new(&map);
        let outcome = solver.solve(start).unwrap();
        assert_eq!(outcome.solution().map(Solution::len), Some(6));
        let field = solver.distance_field(map.target().unwrap()).unwrap();
        assert_eq!(field.distance_from(start), Some(6));

        let map = Map::from_file("map_file/maze-walled.txt").unwrap();
        let mut solver = SlideSolver::new(&map);
        assert_eq!(solver.solve((0, 0)).unwrap(), SearchOutcome::Unsolvable);
        let summary = solver.distance_field(map.target().unwrap()).unwrap().summary();
        assert_eq!(summary.reachable, 0);
    }

    #[test]
    fn test_rejects_bad_query_cells() {
        let map = Map::from_rows(&["P.X", "..G"]).unwrap();
        let mut solver = SlideSolver::new(&map);
        assert!(solver.solve((0, 2)).is_err());
        assert!(solver.solve((5, 0)).is_err());
        assert!(solver.distance_field((2, 2)).is_err());
        assert!(solver.distance_field((0, 1)).is_err());
        assert!(solver.distance_field((0, 0)).is_err());

        let no_goal = Map::from_rows(&["P.."]).unwrap();
        assert!(SlideSolver::new(&no_goal).solve((0, 0)).is_err());
    }

    #[test]
    fn test_explicit_target_among_goals() {
        let map = Map::from_rows(&["P.G.G"]).unwrap();
        let mut solver = SlideSolver::new(&map);
        assert!(solver.distance_field((0, 1)).is_err());

        // The goal at (0,2) stops the first slide short of the target.
        let field = solver.distance_field((0, 4)).unwrap();
        assert_eq!(field.to_string(), "2 2 1 1 0");
        assert_eq!(field.distance_from((0, 0)), Some(2));

        let field = solver.distance_field((0, 2)).unwrap();
        assert_eq!(field.to_string(), "1 1 0 1 1");
        assert_eq!(
            field.summary(),
            ReachSummary {
                reachable: 4,
                unreachable: 0,
                blocked: 1,
            }
        );
    }

    #[test]
    fn test_stats_reset_per_query() {
        let map = Map::from_rows(&["P...", "....", "...G"]).unwrap();
        let mut solver = SlideSolver::new(&map).heuristic(Heuristic::Zero);
        solver.solve((0, 0)).unwrap();
        let first = solver.stats().expanded_nodes;
        solver.solve((0, 0)).unwrap();
        assert_eq!(solver.stats().expanded_nodes, first);
        assert_eq!(solver.stats().relaxed_cells, 0);

        solver.distance_field((2, 3)).unwrap();
        assert!(solver.stats().relaxed_cells > 0);
    }

    #[test]
    fn test_shared_map_across_threads() {
        let map = Map::from_rows(&["P..X.XG", "XX.X.X.", "...X.X.", ".XXX.X.", "....X..", ".XXXXX.", "......G"])
            .unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| SlideSolver::new(&map).solve((0, 0)).unwrap()))
                .collect();
            let outcomes: Vec<SearchOutcome> =
                handles.into_iter().map(|handle| handle.join().unwrap()).collect();
            assert!(outcomes.iter().all(|outcome| outcome == &outcomes[0]));
            assert!(outcomes[0].is_solved());
        });
    }
}
