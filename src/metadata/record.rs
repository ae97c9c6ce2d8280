//! Domain records flowing through the scraper.
//!
//! [`MovieRecord`] and [`EnrichmentRecord`] are the flattened forms of the
//! AlloCiné and TMDB answers; [`NormalizedMetadata`] is what the host
//! receives once both have been merged. All of them are built fresh for each
//! request and never mutated after construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AlloCiné taxonomy
// ---------------------------------------------------------------------------

/// Activity codes attached to cast members.
pub mod activity {
    pub const ACTOR: u64 = 8001;
    pub const DIRECTOR: u64 = 8002;
    pub const SCREENWRITER: u64 = 8004;
    pub const WRITER: u64 = 8085;
}

/// Type codes attached to media assets.
pub mod media_type {
    pub const TRAILER: u64 = 30005;
    pub const POSTER: u64 = 31001;
    pub const FANART: u64 = 31006;
}

/// Namespace of the AlloCiné identifier in [`NormalizedMetadata::unique_ids`].
pub const ALLOCINE_NAMESPACE: &str = "allocine";
pub const TMDB_NAMESPACE: &str = "tmdb";
pub const IMDB_NAMESPACE: &str = "imdb";

// ---------------------------------------------------------------------------
// Primary source
// ---------------------------------------------------------------------------

/// A movie as described by AlloCiné.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieRecord {
    pub code: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub synopsis_short: Option<String>,
    /// Runtime in seconds.
    pub runtime_secs: Option<u64>,
    pub certification: Option<String>,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub tags: Vec<String>,
    /// Cast and crew, in source order.
    pub credits: Vec<Credit>,
    pub release_date: Option<String>,
    pub production_year: Option<i32>,
    pub statistics: Statistics,
    /// URL of the poster AlloCiné shows on the movie page.
    pub main_poster: Option<String>,
    pub media: Vec<MediaAsset>,
    /// Media code of the main trailer.
    pub trailer_code: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credit {
    pub name: Option<String>,
    pub role: Option<String>,
    pub thumbnail: Option<String>,
    pub activity: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    /// Audience rating on a 0-5 scale.
    pub user_rating: Option<f64>,
    pub user_rating_count: Option<u64>,
    pub rank: Option<u32>,
}

/// An image or video attached to a movie.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaAsset {
    pub code: Option<u64>,
    pub kind: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub url: Option<String>,
}

/// One encoding of a trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub url: String,
    /// Bandwidth code (104001 = LQ ... 104004 = HQ).
    pub quality: u64,
}

// ---------------------------------------------------------------------------
// Secondary source
// ---------------------------------------------------------------------------

/// Supplementary data fetched from TMDB.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentRecord {
    pub tmdb_id: u64,
    pub imdb_id: Option<String>,
    pub tagline: Option<String>,
    pub studios: Vec<String>,
    pub collection: Option<String>,
    pub original_language: Option<String>,
    /// Posters, ordered by language preference.
    pub posters: Vec<TmdbImage>,
    /// Backdrops, ordered by language preference.
    pub backdrops: Vec<TmdbImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmdbImage {
    pub file_path: String,
    /// ISO-639-1 code, `None` for images without text.
    pub language: Option<String>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Merged metadata handed back to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetadata {
    pub info: VideoInfo,
    pub cast: Vec<CastEntry>,
    /// Poster URLs, best first.
    pub posters: Vec<String>,
    pub fanart: Vec<Fanart>,
    /// Identifiers keyed by namespace (`allocine`, `tmdb`, `imdb`).
    pub unique_ids: BTreeMap<String, String>,
    pub default_id: String,
    pub rating: Option<Rating>,
}

/// Flat descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub top250: Option<u32>,
    pub plot_outline: Option<String>,
    pub plot: Option<String>,
    /// Runtime in minutes.
    pub duration: Option<u64>,
    pub mpaa: Option<String>,
    pub genre: Vec<String>,
    pub country: Vec<String>,
    pub tag: Vec<String>,
    /// Writers.
    pub credits: Vec<String>,
    pub director: Vec<String>,
    pub premiered: Option<String>,
    pub year: Option<i32>,
    pub trailer: Option<String>,
    pub tagline: Option<String>,
    pub studio: Vec<String>,
    /// Name of the collection the movie belongs to.
    pub set: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastEntry {
    pub name: String,
    pub role: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fanart {
    pub image: String,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub source: String,
    /// Rating on a 0-10 scale.
    pub value: f64,
    pub votes: u64,
    pub default: bool,
}

/// A lightweight search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u64,
    pub title: String,
    pub year: Option<i32>,
    /// Display label, `Title (Year)` when the year is known.
    pub label: String,
    pub thumbnail: Option<String>,
}

impl Candidate {
    pub fn new(id: u64, title: String, year: Option<i32>, thumbnail: Option<String>) -> Self {
        let label = match year {
            Some(year) => format!("{title} ({year})"),
            None => title.clone(),
        };
        Self {
            id,
            title,
            year,
            label,
            thumbnail,
        }
    }
}
