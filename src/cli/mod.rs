//! Command-line front-end.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Animedex - anime catalog backend
/// Aggregates AniList and Kitsu metadata and serves the user library
#[derive(Parser)]
#[command(name = "animedex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Resolve one metadata request and print the result
    #[command(alias = "l")]
    Lookup {
        /// Request kind: trending, seasonal, popular, search or detail
        kind: String,
        /// Search term for `search`
        #[arg(long, short)]
        search: Option<String>,
        /// AniList id for `detail`
        #[arg(long)]
        id: Option<String>,
        /// Season for `seasonal` (defaults to the current one)
        #[arg(long)]
        season: Option<String>,
        /// Year for `seasonal`
        #[arg(long)]
        year: Option<String>,
        /// Force a provider: anilist or kitsu
        #[arg(long)]
        source: Option<String>,
        /// Fail instead of falling back to Kitsu
        #[arg(long)]
        no_fallback: bool,
        /// Print the canonical JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Load the sample anime into the local catalog
    Seed,

    /// Write a default config file
    #[command(alias = "init")]
    InitConfig {
        /// Destination path
        #[arg(default_value = "config.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub use commands::*;
