//! Search command implementation.

use super::output;
use crate::cli::args::OutputFormat;
use crate::core::aggregator::Aggregator;
use crate::core::query::Commitment;
use crate::models::config::Config;
use crate::models::media::{parse_year_filter, KindFilter, SearchFilters};
use anyhow::Result;

/// Execute search command.
pub async fn execute_search(
    config: &Config,
    title: &str,
    kind: &str,
    year: Option<&str>,
    all: bool,
    format: OutputFormat,
) -> Result<()> {
    let commitment = build_commitment(title, kind, year, all, config.search.min_length)?;

    let gateway = super::gateway(config)?;
    let aggregator = Aggregator::new(gateway, config.search.min_length);

    let pb = super::spinner(&format!("Searching for \"{}\"...", commitment.term));
    aggregator.update(&commitment).await;
    pb.finish_and_clear();

    let liked = super::open_liked(config);
    let view = aggregator.view().await;
    output::print_view(
        &view,
        &|id| liked.is_liked(id),
        format,
        "Run again with --all to load every page",
    )
}

/// Validate the command line into a commitment.
pub fn build_commitment(
    title: &str,
    kind: &str,
    year: Option<&str>,
    all: bool,
    min_length: usize,
) -> crate::Result<Commitment> {
    let term = title.trim();
    let len = term.chars().count();
    if len < min_length {
        return Err(crate::Error::TermTooShort(min_length - len));
    }

    let kind: KindFilter = kind.parse()?;
    let year = match year {
        Some(y) => parse_year_filter(y)?,
        None => None,
    };

    Ok(Commitment {
        term: term.to_string(),
        filters: SearchFilters::new(kind, year),
        fetch_all: all,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_commitment() {
        let c = build_commitment(" alien ", "movie", Some("1979"), true, 3).unwrap();
        assert_eq!(c.term, "alien");
        assert_eq!(c.filters, SearchFilters::new(KindFilter::Movie, Some(1979)));
        assert!(c.fetch_all);
    }

    #[test]
    fn test_build_commitment_rejects_short_term() {
        match build_commitment("al", "all", None, false, 3) {
            Err(crate::Error::TermTooShort(missing)) => assert_eq!(missing, 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_build_commitment_rejects_bad_filters() {
        assert!(matches!(
            build_commitment("alien", "book", None, false, 3),
            Err(crate::Error::InvalidKind(_))
        ));
        assert!(matches!(
            build_commitment("alien", "all", Some("19x9"), false, 3),
            Err(crate::Error::InvalidYear(_))
        ));
    }
}
