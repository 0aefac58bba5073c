#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the hotspot map dashboard.
//!
//! Without a subcommand, starts a menu-driven session (`dialoguer`) against
//! an in-memory map. The subcommands run a single step non-interactively:
//!
//! - `layers` prints the imagery tile URLs for a date,
//! - `analyze` places structures from arguments and prints their scores,
//! - `score` scores one structure through the single-point endpoint,
//! - `geocode` looks up a place.
//!
//! Uses `indicatif-log-bridge` (via [`hotspot_map_cli_utils::init_logger`])
//! so that log lines and the loading spinner never fight for the terminal.

mod args;
mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hotspot_map_dashboard::DashboardConfig;

use crate::args::{AnalyzeArgs, ScoreArgs};

#[derive(Parser)]
#[command(name = "hotspot_map", about = "Hotspot suitability map")]
struct Cli {
    /// TOML file merged over the built-in configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the imagery layers and their tile URLs
    Layers {
        /// Imagery date (YYYY-MM-DD); defaults to today minus the imagery lag
        #[arg(long)]
        date: Option<String>,
        /// Comma-separated layer keys to show besides the default ones
        #[arg(long, value_delimiter = ',')]
        show: Vec<String>,
    },
    /// Score structures and print the results
    Analyze(AnalyzeArgs),
    /// Score a single structure without a full analysis
    Score(ScoreArgs),
    /// Search for a place and print its coordinates
    Geocode {
        /// Free-text query (e.g. "Connaught Place, Delhi")
        #[arg(required = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = hotspot_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = DashboardConfig::load(cli.config.as_deref())?;
    let today = chrono::Local::now().date_naive();

    let Some(command) = cli.command else {
        return interactive::run(&config, &multi, today).await;
    };

    match command {
        Commands::Layers { date, show } => {
            commands::layers(&config, today, date.as_deref(), &show)?;
        }
        Commands::Analyze(args) => commands::analyze(&config, &multi, today, args).await?,
        Commands::Score(args) => commands::score(&config, &multi, today, args).await?,
        Commands::Geocode { query } => commands::geocode(&config, &query.join(" ")).await?,
    }

    Ok(())
}
