//! Media-related data models.
//!
//! Field names follow the OMDb wire format so the same shape can be used for
//! both API responses and the persisted liked list.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of items OMDb returns per search page.
pub const PAGE_SIZE: u32 = 10;

/// Marker OMDb uses for missing values.
const NOT_AVAILABLE: &str = "N/A";

/// Media kind reported by OMDb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    Episode,
    Game,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
            MediaKind::Episode => "episode",
            MediaKind::Game => "game",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// IMDb ID, the stable identity of an item.
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year, or a range such as "2008–2013" for series.
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Type")]
    pub kind: MediaKind,
    #[serde(
        rename = "Poster",
        default,
        serialize_with = "serialize_poster",
        deserialize_with = "deserialize_available"
    )]
    pub poster: Option<String>,
}

fn serialize_poster<S: Serializer>(poster: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(poster.as_deref().unwrap_or(NOT_AVAILABLE))
}

/// Treat OMDb's "N/A" and empty strings as missing.
fn deserialize_available<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.filter(|p| !p.is_empty() && p != NOT_AVAILABLE))
}

/// Rating from a single source (IMDb, Rotten Tomatoes, Metacritic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Full record returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedMediaItem {
    #[serde(flatten)]
    pub item: MediaItem,
    #[serde(rename = "Rated", default)]
    pub rated: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "Runtime", default)]
    pub runtime: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Writer", default)]
    pub writer: String,
    #[serde(rename = "Actors", default)]
    pub actors: String,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Language", default)]
    pub language: String,
    #[serde(rename = "Country", default)]
    pub country: String,
    #[serde(rename = "Awards", default)]
    pub awards: String,
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<Rating>,
    #[serde(rename = "Metascore", default)]
    pub metascore: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,
    #[serde(rename = "imdbVotes", default)]
    pub imdb_votes: String,
    #[serde(
        rename = "DVD",
        default,
        deserialize_with = "deserialize_available",
        skip_serializing_if = "Option::is_none"
    )]
    pub dvd: Option<String>,
    #[serde(
        rename = "BoxOffice",
        default,
        deserialize_with = "deserialize_available",
        skip_serializing_if = "Option::is_none"
    )]
    pub box_office: Option<String>,
    #[serde(
        rename = "Production",
        default,
        deserialize_with = "deserialize_available",
        skip_serializing_if = "Option::is_none"
    )]
    pub production: Option<String>,
    #[serde(
        rename = "Website",
        default,
        deserialize_with = "deserialize_available",
        skip_serializing_if = "Option::is_none"
    )]
    pub website: Option<String>,
}

/// Kind filter. `All` means no `type` constraint is sent upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Movie,
    Series,
    Episode,
    Game,
}

impl KindFilter {
    /// The upstream `type` parameter, if any.
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            KindFilter::All => None,
            KindFilter::Movie => Some("movie"),
            KindFilter::Series => Some("series"),
            KindFilter::Episode => Some("episode"),
            KindFilter::Game => Some("game"),
        }
    }
}

impl std::fmt::Display for KindFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param().unwrap_or("all"))
    }
}

impl std::str::FromStr for KindFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "any" => Ok(KindFilter::All),
            "movie" | "movies" => Ok(KindFilter::Movie),
            "series" | "tv" => Ok(KindFilter::Series),
            "episode" | "episodes" => Ok(KindFilter::Episode),
            "game" | "games" => Ok(KindFilter::Game),
            other => Err(crate::Error::InvalidKind(other.to_string())),
        }
    }
}

/// Search filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchFilters {
    pub kind: KindFilter,
    pub year: Option<u16>,
}

impl SearchFilters {
    pub fn new(kind: KindFilter, year: Option<u16>) -> Self {
        Self { kind, year }
    }
}

/// Parse a year filter. Empty input and "-" clear the filter.
pub fn parse_year_filter(input: &str) -> crate::Result<Option<u16>> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(None);
    }
    match trimmed.parse::<u16>() {
        Ok(year) if (1800..=2100).contains(&year) => Ok(Some(year)),
        _ => Err(crate::Error::InvalidYear(trimmed.to_string())),
    }
}

/// One decoded page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<MediaItem>,
    pub total_count: u32,
}

impl SearchPage {
    /// Number of upstream pages for this result set.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count)
    }
}

/// `ceil(total_count / PAGE_SIZE)`.
pub fn total_pages(total_count: u32) -> u32 {
    total_count.div_ceil(PAGE_SIZE)
}

/// Outcome of a search call. Never carries a Rust error, only a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    Page(SearchPage),
    Failed(String),
}

/// Outcome of a detail lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailResult {
    Found(Box<DetailedMediaItem>),
    Failed(String),
}
