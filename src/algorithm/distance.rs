use crate::common::{Direction, Position};
use crate::field::DistanceField;
use crate::map::Map;
use crate::stat::Stats;

use std::collections::VecDeque;
use tracing::{debug, instrument, trace};

/// Breadth-first propagation over reversed slides, seeded at `target`.
///
/// Every slide costs one move, so FIFO order settles each cell at its minimum
/// slide count the first time it is reached.
#[instrument(skip_all, name = "reverse_bfs", fields(target = format!("{target:?}")), level = "debug")]
pub(crate) fn reverse_distance_field(map: &Map, target: Position, stats: &mut Stats) -> DistanceField {
    let mut distances = vec![vec![None; map.width]; map.height];
    let mut enqueued = vec![vec![false; map.width]; map.height];
    let mut queue = VecDeque::new();
    let mut settled = 0;

    distances[target.0][target.1] = Some(0);
    enqueued[target.0][target.1] = true;
    queue.push_back(target);

    while let Some(end) = queue.pop_front() {
        let Some(distance) = distances[end.0][end.1] else {
            continue;
        };
        settled += 1;
        stats.expanded_nodes += 1;
        trace!("expand cell {end:?} at distance {distance}");

        for direction in Direction::ALL {
            for origin in slide_origins(map, end, direction) {
                let tentative = distance + 1;
                let cell = &mut distances[origin.0][origin.1];
                if cell.map_or(true, |known| tentative < known) {
                    *cell = Some(tentative);
                    stats.relaxed_cells += 1;
                    if !enqueued[origin.0][origin.1] {
                        enqueued[origin.0][origin.1] = true;
                        queue.push_back(origin);
                    }
                }
            }
        }
    }

    debug!("settled {settled} cells");
    DistanceField::new(map, target, distances)
}

/// Every cell from which a slide in `direction` comes to rest exactly on `end`.
///
/// Walks backwards from `end` until an obstacle or the board edge, keeping each
/// candidate whose forward slide is confirmed to stop on `end`.
pub fn slide_origins(map: &Map, end: Position, direction: Direction) -> Vec<Position> {
    let mut origins = Vec::new();
    if !map.stops_at(end, direction) {
        return origins;
    }

    let backward = direction.reverse();
    let mut current = end;
    while let Some(previous) = map.step(current, backward) {
        if !map.is_passable(previous) {
            break;
        }
        if map.slide(previous, direction) == Some(end) {
            origins.push(previous);
        }
        // A goal stops any slide coming from further back.
        if map.is_goal(previous) {
            break;
        }
        current = previous;
    }
    origins
}
