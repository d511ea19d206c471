use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::common::Position;
use crate::map::Map;

/// Distance-field entry for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    Blocked,
    Steps(usize),
    Unreachable,
}

impl fmt::Display for Reach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reach::Blocked => f.write_str("X"),
            Reach::Steps(steps) => write!(f, "{steps}"),
            Reach::Unreachable => f.write_str("∞"),
        }
    }
}

impl Serialize for Reach {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reach::Steps(steps) => serializer.serialize_u64(*steps as u64),
            Reach::Blocked => serializer.serialize_str("X"),
            Reach::Unreachable => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReachSummary {
    pub reachable: usize,
    pub unreachable: usize,
    /// Obstacles plus the target itself.
    pub blocked: usize,
}

/// Minimum slide count from every cell to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    target: Position,
    blocked: Vec<Vec<bool>>,
    distances: Vec<Vec<Option<usize>>>,
}

impl DistanceField {
    pub(crate) fn new(map: &Map, target: Position, distances: Vec<Vec<Option<usize>>>) -> Self {
        let blocked = (0..map.height)
            .map(|row| {
                (0..map.width)
                    .map(|col| !map.is_passable((row, col)))
                    .collect()
            })
            .collect();
        DistanceField {
            target,
            blocked,
            distances,
        }
    }

    pub fn target(&self) -> Position {
        self.target
    }

    pub fn height(&self) -> usize {
        self.distances.len()
    }

    pub fn width(&self) -> usize {
        self.distances.first().map_or(0, Vec::len)
    }

    /// Positions off the board read as `Blocked`.
    pub fn get(&self, position: Position) -> Reach {
        let (row, col) = position;
        if self
            .blocked
            .get(row)
            .and_then(|cells| cells.get(col))
            .map_or(true, |&blocked| blocked)
        {
            return Reach::Blocked;
        }
        match self.distances[row][col] {
            Some(steps) => Reach::Steps(steps),
            None => Reach::Unreachable,
        }
    }

    /// Slides needed from `start`, if it can reach the target at all.
    pub fn distance_from(&self, start: Position) -> Option<usize> {
        match self.get(start) {
            Reach::Steps(steps) => Some(steps),
            Reach::Blocked | Reach::Unreachable => None,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Reach>> + '_ {
        (0..self.height()).map(move |row| (0..self.width()).map(|col| self.get((row, col))).collect())
    }

    pub fn summary(&self) -> ReachSummary {
        let mut summary = ReachSummary::default();
        for row in self.rows() {
            for reach in row {
                match reach {
                    Reach::Blocked | Reach::Steps(0) => summary.blocked += 1,
                    Reach::Steps(_) => summary.reachable += 1,
                    Reach::Unreachable => summary.unreachable += 1,
                }
            }
        }
        summary
    }
}

impl fmt::Display for DistanceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row.iter().map(Reach::to_string).collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

impl Serialize for DistanceField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<Reach>> = self.rows().collect();
        let mut state = serializer.serialize_struct("DistanceField", 2)?;
        state.serialize_field("target", &self.target)?;
        state.serialize_field("distances", &rows)?;
        state.end()
    }
}
