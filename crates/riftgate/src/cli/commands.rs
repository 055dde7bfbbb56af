//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Riftgate - rate-limited access to the game-data API
#[derive(Parser, Debug)]
#[command(name = "riftgate")]
#[command(about = "Rate-limited access to the game-data API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// API key (falls back to RIOT_API_KEY, also read from .env)
    #[arg(long, env = "RIOT_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Configuration file replacing the bundled and user configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up an account by Riot ID
    Account {
        /// Name part of the Riot ID
        game_name: String,

        /// Tag part of the Riot ID, without '#'
        tag_line: String,
    },

    /// Fetch recent match details for a player
    History {
        /// Player id
        puuid: String,

        /// Index of the first match, newest first
        #[arg(long, default_value = "0")]
        start: u32,

        /// Number of matches
        #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=100))]
        count: u32,
    },

    /// Show the player's live match
    Live {
        /// Player id
        puuid: String,

        /// Poll until the player enters a match (Ctrl-C to stop)
        #[arg(long)]
        wait: bool,
    },

    /// List featured games in classic mode, polling until one appears
    Featured,
}
