//! Movie metadata sources and the merge pipeline.
//!
//! # Module layout
//!
//! - [`allocine`] -- Signed AlloCiné REST client (primary source).
//! - [`wikidata`] -- SPARQL lookup of the IMDb id of an AlloCiné film.
//! - [`tmdb`] -- TMDB client (secondary source).
//! - [`crossref`] -- AlloCiné to TMDB id resolution.
//! - [`record`] -- Domain records shared by every stage.
//! - [`normalize`] -- Pure merge of primary and secondary records.
//! - [`trailer`] -- Trailer lookup and rendition selection.
//! - [`enrichment`] -- Enrichment sources and the detail pipeline.

pub mod allocine;
pub mod crossref;
pub mod enrichment;
pub mod normalize;
pub mod record;
pub mod tmdb;
pub mod trailer;
pub mod wikidata;

pub use enrichment::{EnrichmentSource, MetadataPipeline, TmdbEnrichment};
pub use record::{Candidate, EnrichmentRecord, MovieRecord, NormalizedMetadata};
