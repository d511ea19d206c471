use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use serde::Serialize;

use crate::common::{Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cell {
    Open,
    Obstacle,
    Goal,
    Start,
}

impl Cell {
    fn from_char(ch: char) -> Option<Cell> {
        match ch {
            '.' => Some(Cell::Open),
            'X' | '0' => Some(Cell::Obstacle),
            'G' | '=' => Some(Cell::Goal),
            'P' | '+' => Some(Cell::Start),
            _ => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            Cell::Open => '.',
            Cell::Obstacle => 'X',
            Cell::Goal => 'G',
            Cell::Start => 'P',
        }
    }

    /// The start marker is ice like any other open cell once the agent leaves it.
    pub fn is_passable(self) -> bool {
        self != Cell::Obstacle
    }
}

/// Read-only board. Nothing in the search engines mutates it, so one map can
/// back any number of queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    grid: Vec<Vec<Cell>>,
    goals: Vec<Position>,
    start: Option<Position>,
}

impl Map {
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> anyhow::Result<Self> {
        let mut grid = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let cells = row
                .as_ref()
                .chars()
                .enumerate()
                .map(|(col, ch)| {
                    Cell::from_char(ch).ok_or_else(|| {
                        anyhow!("unknown cell {ch:?} at row {row_index}, column {col}")
                    })
                })
                .collect::<anyhow::Result<Vec<Cell>>>()?;
            grid.push(cells);
        }
        Self::from_grid(grid)
    }

    pub fn from_grid(grid: Vec<Vec<Cell>>) -> anyhow::Result<Self> {
        let height = grid.len();
        if height == 0 {
            bail!("board has no rows");
        }
        let width = grid[0].len();
        if width == 0 {
            bail!("board rows are empty");
        }

        let mut goals = Vec::new();
        let mut start = None;
        for (row, cells) in grid.iter().enumerate() {
            if cells.len() != width {
                bail!(
                    "board is not rectangular: row {row} has {} cells, expected {width}",
                    cells.len()
                );
            }
            for (col, &cell) in cells.iter().enumerate() {
                match cell {
                    Cell::Goal => goals.push((row, col)),
                    Cell::Start => {
                        if let Some(previous) = start.replace((row, col)) {
                            bail!("multiple start markers: {previous:?} and {:?}", (row, col));
                        }
                    }
                    Cell::Open | Cell::Obstacle => {}
                }
            }
        }

        Ok(Map {
            height,
            width,
            grid,
            goals,
            start,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read board {}", path.display()))?;
        text.parse::<Map>()
            .with_context(|| format!("malformed board {}", path.display()))
    }

    /// `None` off the board.
    pub fn cell(&self, position: Position) -> Option<Cell> {
        self.grid.get(position.0)?.get(position.1).copied()
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        position.0 < self.height && position.1 < self.width
    }

    pub fn is_passable(&self, position: Position) -> bool {
        self.cell(position).is_some_and(Cell::is_passable)
    }

    pub fn is_goal(&self, position: Position) -> bool {
        self.cell(position) == Some(Cell::Goal)
    }

    pub fn goals(&self) -> &[Position] {
        &self.goals
    }

    pub fn start(&self) -> Option<Position> {
        self.start
    }

    /// Start marker, required by the forward engine.
    pub fn require_start(&self) -> anyhow::Result<Position> {
        self.start
            .ok_or_else(|| anyhow!("board has no start marker (P or +)"))
    }

    /// The single target required by the distance field.
    pub fn target(&self) -> anyhow::Result<Position> {
        match self.goals.as_slice() {
            [target] => Ok(*target),
            [] => bail!("board has no target (G or =)"),
            many => bail!("distance field needs exactly one target, found {}", many.len()),
        }
    }

    /// In-bounds neighbour of `position`, ignoring cell contents.
    pub fn step(&self, position: Position, direction: Direction) -> Option<Position> {
        let (dr, dc) = direction.delta();
        let row = position.0.checked_add_signed(dr)?;
        let col = position.1.checked_add_signed(dc)?;
        if row < self.height && col < self.width {
            Some((row, col))
        } else {
            None
        }
    }

    /// Slides from `position` until the next cell is an obstacle or off the
    /// board, or until a goal cell has been entered.
    ///
    /// Returns `None` when not even one step is possible.
    pub fn slide(&self, position: Position, direction: Direction) -> Option<Position> {
        let mut current = position;
        while let Some(next) = self.step(current, direction) {
            if !self.is_passable(next) {
                break;
            }
            current = next;
            if self.is_goal(current) {
                break;
            }
        }

        if current == position {
            None
        } else {
            Some(current)
        }
    }

    /// Whether a slide in `direction` that passes over `position` stops there.
    pub fn stops_at(&self, position: Position, direction: Direction) -> bool {
        self.is_goal(position)
            || self
                .step(position, direction)
                .map_or(true, |next| !self.is_passable(next))
    }

    /// Board text with the agent drawn at `agent`.
    pub fn render(&self, agent: Option<Position>) -> String {
        let mut output = String::with_capacity(self.height * (self.width * 2 + 1));
        for (row, cells) in self.grid.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                if col > 0 {
                    output.push(' ');
                }
                let ch = if agent == Some((row, col)) {
                    'P'
                } else if cell == Cell::Start && agent.is_some() {
                    '.'
                } else {
                    cell.to_char()
                };
                output.push(ch);
            }
            output.push('\n');
        }
        output
    }
}

impl FromStr for Map {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Map::from_rows(&rows)
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cells in &self.grid {
            let line: String = cells.iter().map(|cell| cell.to_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
