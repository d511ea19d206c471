use std::path::Path;

use ice_slide::batch::run_batch;
use ice_slide::config::{Cli, Command, Config, OutputFormat};
use ice_slide::map::Map;
use ice_slide::solver::SlideSolver;
use ice_slide::{Position, SearchOutcome, Solution};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    if cli.config.is_none() {
        info!("No config file specified, using default config");
    }

    match &cli.command {
        Command::Solve { board } => run_solve(board, &config),
        Command::Distance { board } => run_distance(board, &config),
        Command::Batch { dir } => {
            let report = run_batch(Path::new(dir), &config)?;
            info!(
                "batch finished: {} processed, {} failed",
                report.processed.len(),
                report.failed.len()
            );
            Ok(())
        }
    }
}

fn run_solve(board: &str, config: &Config) -> anyhow::Result<()> {
    let map = Map::from_file(board)?;
    let start = map.require_start()?;
    let mut solver = SlideSolver::with_config(&map, config);
    let outcome = solver.solve(start)?;

    if config.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match &outcome {
        SearchOutcome::Solved(solution) => {
            println!("Solution found in {} moves:", solution.len());
            for (index, mv) in solution.moves.iter().enumerate() {
                println!("{}. {mv}", index + 1);
            }
            if config.show_steps {
                print_steps(&map, start, solution);
            }
        }
        SearchOutcome::Unsolvable => println!("No solution."),
        SearchOutcome::BudgetExceeded { expansions } => {
            warn!("raise --max-expansions or pass --unbounded to search further");
            println!("No solution found within {expansions} expansions.");
        }
    }
    Ok(())
}

fn print_steps(map: &Map, start: Position, solution: &Solution) {
    println!();
    println!("Step 0 - start:");
    print!("{}", map.render(Some(start)));
    let mut from = start;
    for (index, mv) in solution.moves.iter().enumerate() {
        println!();
        println!("Step {} - {mv} (from ({},{})):", index + 1, from.0, from.1);
        print!("{}", map.render(Some(mv.position)));
        from = mv.position;
    }
}

fn run_distance(board: &str, config: &Config) -> anyhow::Result<()> {
    let map = Map::from_file(board)?;
    let target = map.target()?;
    let field = SlideSolver::with_config(&map, config).distance_field(target)?;

    if config.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&field)?);
        return Ok(());
    }

    println!("{field}");
    match map.start() {
        Some(start) => match field.distance_from(start) {
            Some(moves) => println!("Start to target distance: {moves} moves"),
            None => println!("Start to target distance: UNREACHABLE"),
        },
        None => warn!("no start position (+ or P) in {board}"),
    }
    let summary = field.summary();
    println!(
        "Reachability: {} reachable, {} unreachable, {} obstacles/goal",
        summary.reachable, summary.unreachable, summary.blocked
    );
    Ok(())
}
