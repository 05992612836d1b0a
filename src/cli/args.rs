//! Command line argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

/// Media Finder - Search movies, series and games, with AI recommendations
#[derive(Parser, Debug)]
#[command(name = "media-finder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    /// Session id scoping the liked list (default: MEDIA_FINDER_SESSION or "default")
    #[arg(long, global = true, value_name = "ID")]
    pub session: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for result lists.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Simple,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search titles on OMDb
    Search {
        /// Title to search for (at least 3 characters)
        #[arg(value_name = "TITLE")]
        title: String,

        /// Media type: all, movie, series, episode, game
        #[arg(short = 't', long = "type", default_value = "all")]
        kind: String,

        /// Release year
        #[arg(short = 'y', long)]
        year: Option<String>,

        /// Load every page instead of the first one
        #[arg(short = 'a', long)]
        all: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show full details of a title
    Details {
        /// IMDb ID (e.g., tt0111161)
        #[arg(value_name = "IMDB_ID")]
        imdb_id: String,
    },

    /// Interactive search prompt with live results
    Interactive,

    /// Get AI recommendations from a description
    Recommend {
        /// What you are in the mood for
        #[arg(value_name = "DESCRIPTION", num_args = 1.., required = true)]
        description: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Manage liked titles
    Liked {
        #[command(subcommand)]
        action: LikedAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum LikedAction {
    /// List liked titles
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Like or unlike a title
    Toggle {
        /// IMDb ID
        #[arg(value_name = "IMDB_ID")]
        imdb_id: String,
    },

    /// Remove all liked titles
    Clear,

    /// End the session, deleting everything stored for it
    EndSession,
}
