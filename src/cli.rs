use crate::engine::DEFAULT_MAX_ATTEMPTS;
use clap::Parser;
use std::path::PathBuf;

/// Number guessing game CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Player name recorded with finished games (asked interactively when
    /// omitted)
    #[arg(short, long)]
    pub player: Option<String>,

    /// Maximum number of attempts per game
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Path to the JSON game archive (defaults to the user data directory)
    #[arg(short = 'd', long = "data")]
    pub data_path: Option<PathBuf>,

    /// Keep games in memory only, without touching the archive on disk
    #[arg(long)]
    pub memory: bool,

    /// Fix the secret value instead of generating one (for scripted play)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub secret: Option<u32>,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}
