//! Interactive search prompt.
//!
//! Plain lines are treated as the search box contents and go through the
//! debounce; lines starting with `:` are commands.

use super::output;
use crate::cli::args::OutputFormat;
use crate::core::aggregator::{Aggregator, ResultsView};
use crate::core::query::SearchQuery;
use crate::models::config::Config;
use crate::models::media::{parse_year_filter, DetailResult, KindFilter, MediaItem};
use crate::services::SearchGateway;
use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

const HELP: &str = "\
Type a title to search as you go. Commands:
  :search        search now and load every page
  :type KIND     all, movie, series, episode or game
  :year YEAR     release year, '-' to clear
  :all           load every page of the current results
  :like N        like or unlike the N-th shown result
  :liked         show liked titles
  :clear         remove all liked titles
  :details N     show details of the N-th shown result
  :quit          exit";

/// A parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// New search box contents.
    Text(String),
    Search,
    Kind(String),
    Year(String),
    All,
    Like(usize),
    Liked,
    Clear,
    Details(usize),
    Help,
    Quit,
    Unknown(String),
}

/// Parse a prompt line.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.trim_start().strip_prefix(':') else {
        return Input::Text(line.trim().to_string());
    };

    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().unwrap_or_default().trim();

    let index = || arg.parse::<usize>().ok().filter(|n| *n > 0);

    match name.as_str() {
        "search" | "s" => Input::Search,
        "type" | "t" => Input::Kind(arg.to_string()),
        "year" | "y" => Input::Year(arg.to_string()),
        "all" | "a" => Input::All,
        "like" | "l" => index()
            .map(Input::Like)
            .unwrap_or_else(|| Input::Unknown(line.to_string())),
        "liked" => Input::Liked,
        "clear" => Input::Clear,
        "details" | "d" => index()
            .map(Input::Details)
            .unwrap_or_else(|| Input::Unknown(line.to_string())),
        "help" | "h" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Run the interactive prompt until `:quit` or end of input.
pub async fn run(config: &Config) -> Result<()> {
    let gateway = super::gateway(config)?;
    let aggregator = Aggregator::new(gateway.clone(), config.search.min_length);
    let mut query = SearchQuery::from_config(&config.search);
    let mut liked = super::open_liked(config);
    let mut shown: Vec<MediaItem> = Vec::new();

    println!("{}", "Media Finder".bold().cyan());
    println!("{}", HELP.dimmed());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let deadline = query.deadline();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match parse_input(&line) {
                    Input::Text(text) => {
                        query.input(text);
                        let missing = query.chars_missing();
                        if missing > 0 {
                            let hint = crate::Error::TermTooShort(missing).to_string();
                            println!("{}", hint.dimmed());
                        }
                    }
                    Input::Search => {
                        if query.submit() {
                            let pb = super::spinner("Loading all results...");
                            aggregator.update(query.commitment()).await;
                            pb.finish_and_clear();
                            shown = render(&aggregator, &liked).await?;
                        } else {
                            let hint = crate::Error::TermTooShort(query.chars_to_submit());
                            println!("{}", hint.to_string().yellow());
                        }
                    }
                    Input::Kind(kind) => match kind.parse::<KindFilter>() {
                        Ok(kind) => {
                            query.set_kind(kind);
                            println!("Type filter: {}", kind);
                            shown = refresh(&aggregator, &query, &liked).await?;
                        }
                        Err(e) => println!("{}", e.to_string().red()),
                    },
                    Input::Year(year) => match parse_year_filter(&year) {
                        Ok(year) => {
                            query.set_year(year);
                            match year {
                                Some(year) => println!("Year filter: {}", year),
                                None => println!("Year filter cleared"),
                            }
                            shown = refresh(&aggregator, &query, &liked).await?;
                        }
                        Err(e) => println!("{}", e.to_string().red()),
                    },
                    Input::All => {
                        query.set_fetch_all(true);
                        let pb = super::spinner("Loading all results...");
                        aggregator.request_all().await;
                        pb.finish_and_clear();
                        shown = render(&aggregator, &liked).await?;
                    }
                    Input::Like(n) => match shown.get(n - 1) {
                        Some(item) => {
                            if liked.toggle(item) {
                                println!("{} {}", "Liked".green(), item.title);
                            } else {
                                println!("{} {}", "Unliked".yellow(), item.title);
                            }
                        }
                        None => println!("{}", format!("No result #{}", n).red()),
                    },
                    Input::Liked => {
                        if liked.is_empty() {
                            println!("{}", "No liked titles yet.".yellow());
                        } else {
                            output::print_items(liked.list(), &|_| true, OutputFormat::Table)?;
                        }
                    }
                    Input::Clear => {
                        liked.clear();
                        println!("Liked titles cleared");
                    }
                    Input::Details(n) => match shown.get(n - 1) {
                        Some(item) => match gateway.fetch_details_by_id(&item.imdb_id).await {
                            DetailResult::Found(details) => {
                                output::print_details(&details, liked.is_liked(&item.imdb_id));
                            }
                            DetailResult::Failed(message) => println!("{}", message.red()),
                        },
                        None => println!("{}", format!("No result #{}", n).red()),
                    },
                    Input::Help => println!("{}", HELP),
                    Input::Quit => break,
                    Input::Unknown(line) => {
                        println!("{}", format!("Unknown command: {} (try :help)", line).red());
                    }
                }
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                if deadline.is_some() =>
            {
                if query.tick(Instant::now()) {
                    shown = refresh(&aggregator, &query, &liked).await?;
                }
            }
        }
    }

    Ok(())
}

/// Push the current commitment through the aggregator and render.
async fn refresh<S>(
    aggregator: &Aggregator,
    query: &SearchQuery,
    liked: &crate::core::liked::LikedStore<S>,
) -> Result<Vec<MediaItem>>
where
    S: crate::core::storage::KeyValueStorage,
{
    aggregator.update(query.commitment()).await;
    render(aggregator, liked).await
}

/// Print the current view and return the items it shows.
async fn render<S>(
    aggregator: &Aggregator,
    liked: &crate::core::liked::LikedStore<S>,
) -> Result<Vec<MediaItem>>
where
    S: crate::core::storage::KeyValueStorage,
{
    let view = aggregator.view().await;
    output::print_view(
        &view,
        &|id| liked.is_liked(id),
        OutputFormat::Table,
        "Type :all to load every page",
    )?;
    Ok(match view {
        ResultsView::Results(page) => page.items,
        _ => Vec::new(),
    })
}
