use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use crate::common::Position;
use crate::config::{Config, OutputFormat};
use crate::field::ReachSummary;
use crate::map::Map;
use crate::solver::SlideSolver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub board: PathBuf,
    pub output: PathBuf,
    pub start: Option<Position>,
    pub start_distance: Option<usize>,
    pub summary: ReachSummary,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<BatchEntry>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Board files in `dir` named `maze*.txt`, skipping earlier `_result` output.
pub fn discover_boards(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut boards = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("cannot list directory {}", dir.display()))?
    {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if path.is_file()
            && name.starts_with("maze")
            && name.ends_with(".txt")
            && !name.contains("_result")
        {
            boards.push(path);
        }
    }
    boards.sort();
    Ok(boards)
}

/// `maze1.txt` becomes `maze1_result.txt` (or `.json`) in the same directory.
pub fn result_path(board: &Path, format: OutputFormat) -> PathBuf {
    let stem = board
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("board");
    let extension = match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
    };
    board.with_file_name(format!("{stem}_result.{extension}"))
}

pub fn run_batch(dir: &Path, config: &Config) -> anyhow::Result<BatchReport> {
    let boards = discover_boards(dir)?;
    if boards.is_empty() {
        warn!("no maze*.txt files found in {}", dir.display());
    } else {
        info!("found {} maze files in {}", boards.len(), dir.display());
    }

    let mut report = BatchReport::default();
    for board in boards {
        info!("processing {}", board.display());
        match process_board(&board, config) {
            Ok(entry) => report.processed.push(entry),
            Err(err) => {
                warn!("skipping {}: {err:#}", board.display());
                report.failed.push((board, format!("{err:#}")));
            }
        }
    }
    Ok(report)
}

fn process_board(board: &Path, config: &Config) -> anyhow::Result<BatchEntry> {
    let map = Map::from_file(board)?;
    let target = map.target()?;
    let field = SlideSolver::with_config(&map, config).distance_field(target)?;

    let output = result_path(board, config.format);
    let contents = match config.format {
        OutputFormat::Text => field.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&field)?,
    };
    fs::write(&output, contents).with_context(|| format!("cannot write {}", output.display()))?;
    info!("result saved to {}", output.display());

    let start = map.start();
    let start_distance = start.and_then(|start| field.distance_from(start));
    match (start, start_distance) {
        (Some(_), Some(moves)) => info!("start to target distance: {moves} moves"),
        (Some(_), None) => info!("start to target distance: UNREACHABLE"),
        (None, _) => warn!("no start position (+ or P) in {}", board.display()),
    }

    let summary = field.summary();
    info!(
        "reachability: {} reachable, {} unreachable, {} obstacles/goal",
        summary.reachable, summary.unreachable, summary.blocked
    );

    Ok(BatchEntry {
        board: board.to_path_buf(),
        output,
        start,
        start_distance,
        summary,
    })
}
