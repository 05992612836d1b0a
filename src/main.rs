//! Media Finder CLI
//!
//! Search movies, series and games on OMDb, keep a liked list per session and
//! get AI recommendations from a free-text description.

use clap::Parser;
use media_finder::cli::{
    args::{Cli, Commands, LikedAction},
    commands::{details, interactive, liked, recommend, search},
};
use media_finder::models::config::{self, Config};
use media_finder::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let mut config = config::load_config();
    if let Some(session) = cli.session.as_deref() {
        config.session.id = session.to_string();
    }

    // Run preflight checks for commands that hit the network
    if !cli.skip_preflight {
        match &cli.command {
            Commands::Search { .. } | Commands::Details { .. } | Commands::Interactive => {
                run_preflight_checks(&config, false).await?;
            }
            Commands::Recommend { .. } => {
                run_preflight_checks(&config, true).await?;
            }
            Commands::Liked { .. } => {}
        }
    }

    // Run the appropriate command
    match cli.command {
        Commands::Search {
            title,
            kind,
            year,
            all,
            format,
        } => {
            search::execute_search(&config, &title, &kind, year.as_deref(), all, format).await?;
        }

        Commands::Details { imdb_id } => {
            details::execute_details(&config, &imdb_id).await?;
        }

        Commands::Interactive => {
            interactive::run(&config).await?;
        }

        Commands::Recommend { description, format } => {
            recommend::execute_recommend(&config, &description.join(" "), format).await?;
        }

        Commands::Liked { action } => match action {
            LikedAction::List { format } => liked::list(&config, format)?,
            LikedAction::Toggle { imdb_id } => liked::toggle(&config, &imdb_id).await?,
            LikedAction::Clear => liked::clear(&config)?,
            LikedAction::EndSession => liked::end_session(&config)?,
        },
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("media_finder=debug")
    } else {
        EnvFilter::new("media_finder=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(config: &Config, include_ai: bool) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(config, include_ai).await?;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
