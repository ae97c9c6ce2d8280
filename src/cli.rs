use allocine_scraper::config::TrailerQuality;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "allocine-scraper")]
#[command(author, version, about = "AlloCiné movie metadata scraper")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Highest trailer quality: hq, mq, sq, lq (or 0-3), overrides the config
    #[arg(long, global = true)]
    pub trailer_quality: Option<TrailerQuality>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dispatch a raw host query string (e.g. "?action=find&title=Heat")
    Run {
        #[arg(required = true)]
        query: String,
    },

    /// Search movies by title
    Find {
        #[arg(required = true)]
        title: String,
    },

    /// Fetch full details of an AlloCiné movie
    Details {
        /// AlloCiné movie id
        #[arg(required = true)]
        id: String,
    },

    /// Extract the AlloCiné movie id from an NFO URL
    Nfo {
        #[arg(required = true)]
        url: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
