//! Terminal rendering of result lists and detail records.

use crate::cli::args::OutputFormat;
use crate::core::aggregator::{ResultsPage, ResultsView};
use crate::models::media::{DetailedMediaItem, MediaItem};
use anyhow::Result;
use colored::Colorize;

/// Print the current results view.
///
/// `load_all_hint` is shown under a partial result list, e.g. "use --all".
pub fn print_view(
    view: &ResultsView,
    is_liked: &dyn Fn(&str) -> bool,
    format: OutputFormat,
    load_all_hint: &str,
) -> Result<()> {
    match view {
        ResultsView::Hidden => {}
        ResultsView::Loading => println!("{}", "Loading...".dimmed()),
        ResultsView::Error(message) => println!("{}", message.red()),
        ResultsView::NoResults { term } => {
            println!("{}", format!("No results found for \"{}\"", term).yellow())
        }
        ResultsView::Results(page) => print_page(page, is_liked, format, load_all_hint)?,
    }
    Ok(())
}

fn print_page(
    page: &ResultsPage,
    is_liked: &dyn Fn(&str) -> bool,
    format: OutputFormat,
    load_all_hint: &str,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_items(&page.items, is_liked, format);
    }

    println!("{}", page.describe().bold().cyan());
    println!();
    print_items(&page.items, is_liked, format)?;
    println!();

    if page.fetching_all {
        println!("{}", "Loading all results...".dimmed());
    } else if page.all_shown {
        println!("Showing all {} results", page.items.len());
    } else if page.total_pages > 1 {
        println!("Showing page 1 of {}", page.total_pages);
        if page.can_load_all && !load_all_hint.is_empty() {
            println!("  {}", load_all_hint.dimmed());
        }
    }
    Ok(())
}

/// Print a list of items.
pub fn print_items(
    items: &[MediaItem],
    is_liked: &dyn Fn(&str) -> bool,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(items, is_liked)?,
        OutputFormat::Simple => print_simple(items, is_liked),
        OutputFormat::Table => print_table(items, is_liked),
    }
    Ok(())
}

fn print_json(items: &[MediaItem], is_liked: &dyn Fn(&str) -> bool) -> Result<()> {
    #[derive(serde::Serialize)]
    struct ItemJson<'a> {
        #[serde(flatten)]
        item: &'a MediaItem,
        liked: bool,
    }

    let output: Vec<ItemJson> = items
        .iter()
        .map(|item| ItemJson {
            item,
            liked: is_liked(&item.imdb_id),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_simple(items: &[MediaItem], is_liked: &dyn Fn(&str) -> bool) {
    for item in items {
        let heart = if is_liked(&item.imdb_id) { " *" } else { "" };
        println!(
            "[{}] {} ({}) - {}{}",
            item.imdb_id, item.title, item.year, item.kind, heart
        );
    }
}

fn print_table(items: &[MediaItem], is_liked: &dyn Fn(&str) -> bool) {
    println!(
        " {:>4} | {:<10} | {:<40} | {:<9} | {:<7} | {}",
        "#", "IMDb ID", "Title", "Year", "Type", "Liked"
    );
    println!("{}", "-".repeat(90));

    for (i, item) in items.iter().enumerate() {
        let liked = if is_liked(&item.imdb_id) {
            "yes".red().to_string()
        } else {
            String::new()
        };
        println!(
            " {:>4} | {:<10} | {:<40} | {:<9} | {:<7} | {}",
            i + 1,
            item.imdb_id,
            truncate(&item.title, 38),
            item.year,
            item.kind.as_str(),
            liked
        );
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Print a full detail record.
pub fn print_details(details: &DetailedMediaItem, liked: bool) {
    let item = &details.item;
    let heart = if liked { " (liked)".red().to_string() } else { String::new() };
    println!(
        "{}{}",
        format!("{} ({})", item.title, item.year).bold().cyan(),
        heart
    );
    println!(
        "  {} | {} | {} | {}",
        item.kind, details.rated, details.runtime, details.genre
    );
    println!();

    if !details.plot.is_empty() {
        println!("{}", details.plot);
        println!();
    }

    let rows = [
        ("Director", details.director.as_str()),
        ("Writer", details.writer.as_str()),
        ("Actors", details.actors.as_str()),
        ("Released", details.released.as_str()),
        ("Language", details.language.as_str()),
        ("Country", details.country.as_str()),
        ("Awards", details.awards.as_str()),
        ("Metascore", details.metascore.as_str()),
        ("IMDb rating", details.imdb_rating.as_str()),
        ("IMDb votes", details.imdb_votes.as_str()),
    ];
    for (label, value) in rows {
        if !value.is_empty() && value != "N/A" {
            println!("  {:<12} {}", format!("{}:", label).bold(), value);
        }
    }

    let optional = [
        ("DVD", &details.dvd),
        ("Box office", &details.box_office),
        ("Production", &details.production),
        ("Website", &details.website),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            println!("  {:<12} {}", format!("{}:", label).bold(), value);
        }
    }

    if !details.ratings.is_empty() {
        println!();
        println!("{}", "Ratings:".bold());
        for rating in &details.ratings {
            println!("  {:<24} {}", rating.source, rating.value);
        }
    }

    if let Some(poster) = &item.poster {
        println!();
        println!("  Poster: {}", poster.dimmed());
    }
    println!("  https://www.imdb.com/title/{}/", item.imdb_id);
}
