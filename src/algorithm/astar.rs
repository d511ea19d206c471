use super::{construct_path, Heuristic, SearchNode};
use crate::common::{Direction, Position, SearchOutcome};
use crate::map::Map;
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument, trace};

/// Open list entry. The arena index doubles as insertion order, so equal
/// `f_cost` entries pop first-in first-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f_cost: usize,
    node: usize,
}

#[instrument(skip_all, name = "a_star", fields(start = format!("{start:?}"), heuristic = ?heuristic), level = "debug")]
pub(crate) fn a_star_search(
    map: &Map,
    start: Position,
    heuristic: Heuristic,
    max_expansions: Option<usize>,
    stats: &mut Stats,
) -> SearchOutcome {
    let mut nodes = vec![SearchNode {
        position: start,
        g_cost: 0,
        parent: None,
        action: None,
    }];
    let mut open_list = BTreeSet::new();
    let mut closed_list = HashSet::new();
    let mut best_g_cost = HashMap::from([(start, 0)]);
    let mut expansions = 0;

    open_list.insert(OpenEntry {
        f_cost: heuristic.estimate(map, start),
        node: 0,
    });
    stats.generated_nodes += 1;

    while let Some(entry) = open_list.pop_first() {
        let current = nodes[entry.node];

        // A cheaper entry for this position was queued after this one.
        if best_g_cost
            .get(&current.position)
            .is_some_and(|&g_cost| g_cost < current.g_cost)
        {
            continue;
        }
        if !closed_list.insert(current.position) {
            continue;
        }

        if map.is_goal(current.position) {
            debug!(
                "reached goal {:?} in {} moves after {expansions} expansions",
                current.position, current.g_cost
            );
            return SearchOutcome::Solved(construct_path(&nodes, entry.node));
        }

        if max_expansions.is_some_and(|limit| expansions >= limit) {
            debug!("expansion budget of {expansions} exhausted");
            return SearchOutcome::BudgetExceeded { expansions };
        }
        expansions += 1;
        stats.expanded_nodes += 1;
        trace!("expand node: {current:?}");

        // Every slide costs one move regardless of how far it travels.
        let tentative_g_cost = current.g_cost + 1;

        for direction in Direction::ALL {
            let Some(neighbor) = map.slide(current.position, direction) else {
                continue;
            };
            if closed_list.contains(&neighbor) {
                continue;
            }
            if best_g_cost
                .get(&neighbor)
                .is_some_and(|&g_cost| g_cost <= tentative_g_cost)
            {
                continue;
            }

            best_g_cost.insert(neighbor, tentative_g_cost);
            let index = nodes.len();
            nodes.push(SearchNode {
                position: neighbor,
                g_cost: tentative_g_cost,
                parent: Some(entry.node),
                action: Some(direction),
            });
            open_list.insert(OpenEntry {
                f_cost: tentative_g_cost + heuristic.estimate(map, neighbor),
                node: index,
            });
            stats.generated_nodes += 1;
        }
        trace!("open list size {}", open_list.len());
    }

    debug!("cannot find solution");
    SearchOutcome::Unsolvable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::testing::{brute_force_moves, random_board};
    use crate::common::Move;

    fn solve(rows: &[&str], max_expansions: Option<usize>) -> SearchOutcome {
        let map = Map::from_rows(rows).unwrap();
        let start = map.start().unwrap();
        a_star_search(
            &map,
            start,
            Heuristic::Aligned,
            max_expansions,
            &mut Stats::default(),
        )
    }

    #[test]
    fn test_single_move_to_corner_goal() {
        let outcome = solve(&["P.G", "...", "..."], Some(10_000));
        let solution = outcome.solution().unwrap();
        assert_eq!(
            solution.moves,
            vec![Move {
                direction: Direction::Right,
                position: (0, 2),
            }]
        );
    }

    #[test]
    fn test_walled_off_goal_is_unsolvable() {
        assert_eq!(
            solve(&["P.X", "XXX", "..G"], Some(10_000)),
            SearchOutcome::Unsolvable
        );
        assert_eq!(
            solve(&["P.XG", "...X", ".X..", "...."], Some(10_000)),
            SearchOutcome::Unsolvable
        );
    }

    #[test]
    fn test_goal_without_resting_neighbour_is_unsolvable() {
        let rows = [
            "P.......X",
            ".XXXXXX.X",
            ".X.....X.",
            ".X.XXX.X.",
            ".X.X.G.X.",
            ".X.XXX...",
            ".X.......",
            ".XXXXXXXX",
            ".........",
        ];
        assert_eq!(solve(&rows, None), SearchOutcome::Unsolvable);
    }

    #[test]
    fn test_large_board_is_solved() {
        let rows = [
            "P..X.XG",
            "XX.X.X.",
            "...X.X.",
            ".XXX.X.",
            "....X..",
            ".XXXXX.",
            "......G",
        ];
        let map = Map::from_rows(&rows).unwrap();
        let outcome = solve(&rows, Some(10_000));
        let solution = outcome.solution().unwrap();
        assert!(solution.verify(&map, (0, 0)));
        assert_eq!(Some(solution.len()), brute_force_moves(&map, (0, 0)));
    }

    #[test]
    fn test_multiple_goals_stops_at_nearest() {
        let rows = ["P.X.G", "...X.", ".G..."];
        let map = Map::from_rows(&rows).unwrap();
        let solution = solve(&rows, None).solution().cloned().unwrap();
        assert!(solution.verify(&map, (0, 0)));
        assert_eq!(Some(solution.len()), brute_force_moves(&map, (0, 0)));
    }

    #[test]
    fn test_start_on_goal_needs_no_moves() {
        let map = Map::from_rows(&["G.."]).unwrap();
        let outcome = a_star_search(
            &map,
            (0, 0),
            Heuristic::Aligned,
            Some(1),
            &mut Stats::default(),
        );
        assert_eq!(outcome, SearchOutcome::Solved(Default::default()));
    }

    #[test]
    fn test_budget_exceeded_is_distinct() {
        // Two slides are needed: down, then right.
        let rows = ["P.X.", "...G", "X...", "...."];
        let map = Map::from_rows(&rows).unwrap();
        assert!(brute_force_moves(&map, (0, 0)).is_some_and(|moves| moves > 1));
        assert_eq!(
            solve(&rows, Some(1)),
            SearchOutcome::BudgetExceeded { expansions: 1 }
        );
        assert!(solve(&rows, None).is_solved());
    }

    #[test]
    fn test_stats_are_counted() {
        let map = Map::from_rows(&["P...", "....", "...G"]).unwrap();
        let mut stats = Stats::default();
        let outcome = a_star_search(&map, (0, 0), Heuristic::Zero, None, &mut stats);
        assert_eq!(outcome.solution().map(|s| s.len()), Some(2));
        assert!(stats.expanded_nodes >= 1);
        assert!(stats.generated_nodes > stats.expanded_nodes);
    }

    #[test]
    fn test_optimal_against_brute_force() {
        for seed in 0..400 {
            let (map, start) = random_board(seed, 5, 1 + (seed % 3) as usize);
            let expected = brute_force_moves(&map, start);
            let outcome = a_star_search(&map, start, Heuristic::Aligned, None, &mut Stats::default());
            match (expected, &outcome) {
                (Some(moves), SearchOutcome::Solved(solution)) => {
                    assert_eq!(solution.len(), moves, "seed {seed}\n{map}");
                    assert!(solution.verify(&map, start), "seed {seed}\n{map}");
                }
                (None, SearchOutcome::Unsolvable) => {}
                _ => panic!("seed {seed}: expected {expected:?}, got {outcome:?}\n{map}"),
            }
        }
    }

    #[test]
    fn test_manhattan_still_finds_valid_paths() {
        for seed in 0..200 {
            let (map, start) = random_board(seed, 5, 1);
            let outcome = a_star_search(&map, start, Heuristic::Manhattan, None, &mut Stats::default());
            assert_eq!(
                outcome.is_solved(),
                brute_force_moves(&map, start).is_some(),
                "seed {seed}\n{map}"
            );
            if let Some(solution) = outcome.solution() {
                assert!(solution.verify(&map, start));
            }
        }
    }
}
