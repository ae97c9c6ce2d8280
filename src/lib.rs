//! AlloCiné movie scraper
//!
//! Fetches movie metadata from AlloCiné, enriches it with TMDB data found
//! through Wikidata, and merges both into a normalized record.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod metadata;

pub use dispatch::{Action, Dispatcher, Outcome, Request, Response};
pub use error::{Result, ScraperError};
