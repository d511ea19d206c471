use std::str::FromStr;

use anyhow::anyhow;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::algorithm::Heuristic;

#[derive(Parser, Debug)]
#[command(
    name = "Ice Slide",
    about = "Optimal move search and distance fields for sliding ice puzzles.",
    version = "1.0"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Maximum A* expansions before the search gives up"
    )]
    pub max_expansions: Option<usize>,

    #[arg(
        long,
        global = true,
        help = "Search without an expansion cap",
        default_value_t = false
    )]
    pub unbounded: bool,

    #[arg(long, global = true, value_enum, help = "Heuristic used by the A* search")]
    pub heuristic: Option<Heuristic>,

    #[arg(long, global = true, value_enum, help = "Result output format")]
    pub format: Option<OutputFormat>,

    #[arg(long, global = true, help = "Log level: error, warn, info, debug or trace")]
    pub log_level: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Print the board after every move of a solution",
        default_value_t = false
    )]
    pub show_steps: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Find a shortest slide sequence from the start marker to a goal.
    Solve { board: String },
    /// Compute the slide distance from every cell to the board's target.
    Distance { board: String },
    /// Process every maze*.txt board in a directory and write result files.
    Batch {
        #[arg(default_value = ".")]
        dir: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `None` searches until the state space is exhausted.
    pub max_expansions: Option<usize>,
    pub heuristic: Heuristic,
    pub format: OutputFormat,
    pub log_level: String,
    pub show_steps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_expansions: Some(10_000),
            heuristic: Heuristic::default(),
            format: OutputFormat::default(),
            log_level: "info".to_string(),
            show_steps: false,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(max_expansions) = cli.max_expansions {
            self.max_expansions = Some(max_expansions);
        }
        if cli.unbounded {
            self.max_expansions = None;
        }
        if let Some(heuristic) = cli.heuristic {
            self.heuristic = heuristic;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = log_level.clone();
        }
        self.show_steps |= cli.show_steps;

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_expansions == Some(0) {
            return Err(anyhow!(
                "max_expansions must be greater than 0, use --unbounded to disable the cap"
            ));
        }
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| anyhow!("unknown log level {:?}", self.log_level))?;
        Ok(())
    }
}
