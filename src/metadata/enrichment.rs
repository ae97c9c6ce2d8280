//! Detail pipeline: AlloCiné record, optional TMDB enrichment, trailer
//! resolution and merge.
//!
//! The [`MetadataPipeline`] runs every remote call sequentially and owns the
//! HTTP client (and its connection pool) for the duration of one request.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::http::HttpClient;
use crate::metadata::allocine::AllocineClient;
use crate::metadata::crossref::CrossReferenceResolver;
use crate::metadata::normalize::{self, MergeOptions};
use crate::metadata::record::{Candidate, EnrichmentRecord, MovieRecord, NormalizedMetadata};
use crate::metadata::tmdb::TmdbClient;
use crate::metadata::trailer;
use crate::metadata::wikidata::WikidataClient;

/// Source of supplementary data for an AlloCiné movie.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    /// Short, lowercase identifier for this source (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Fetch enrichment for `allocine_id`, `Ok(None)` when the movie cannot
    /// be matched.
    async fn enrichment_for(&self, allocine_id: u64) -> Result<Option<EnrichmentRecord>>;
}

/// TMDB enrichment reached through Wikidata/IMDb cross-referencing.
#[derive(Debug, Clone)]
pub struct TmdbEnrichment {
    resolver: CrossReferenceResolver,
    tmdb: TmdbClient,
}

impl TmdbEnrichment {
    pub fn new(resolver: CrossReferenceResolver, tmdb: TmdbClient) -> Self {
        Self { resolver, tmdb }
    }
}

#[async_trait]
impl EnrichmentSource for TmdbEnrichment {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn enrichment_for(&self, allocine_id: u64) -> Result<Option<EnrichmentRecord>> {
        let Some(xref) = self.resolver.resolve(allocine_id).await? else {
            return Ok(None);
        };

        let mut record = self.tmdb.fetch(xref.tmdb_id).await?;
        if record.imdb_id.is_none() {
            record.imdb_id = Some(xref.imdb_id);
        }
        Ok(Some(record))
    }
}

/// Runs the lookups needed for one detail or search request.
pub struct MetadataPipeline {
    allocine: AllocineClient,
    enrichment: Option<Box<dyn EnrichmentSource>>,
    options: MergeOptions,
    max_trailer_quality: u64,
}

impl MetadataPipeline {
    /// Create a pipeline from its parts.
    ///
    /// # Arguments
    ///
    /// * `allocine` - Signed AlloCiné client
    /// * `enrichment` - Secondary source, `None` to skip enrichment entirely
    /// * `options` - Which parts of the enrichment are merged
    /// * `max_trailer_quality` - Highest rendition code accepted for trailers
    pub fn new(
        allocine: AllocineClient,
        enrichment: Option<Box<dyn EnrichmentSource>>,
        options: MergeOptions,
        max_trailer_quality: u64,
    ) -> Self {
        Self {
            allocine,
            enrichment,
            options,
            max_trailer_quality,
        }
    }

    /// Build the pipeline described by `config`, sharing one HTTP client
    /// between all services.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = HttpClient::from_config(&config.retry)?;
        let allocine = AllocineClient::new(http.clone(), &config.allocine);

        let enrichment: Option<Box<dyn EnrichmentSource>> = if config.scraper.enrichment_enabled()
        {
            let tmdb = TmdbClient::new(http.clone(), &config.tmdb);
            let wikidata = WikidataClient::new(http, &config.wikidata);
            let resolver = CrossReferenceResolver::new(wikidata, tmdb.clone());
            Some(Box::new(TmdbEnrichment::new(resolver, tmdb)))
        } else {
            None
        };

        let options = MergeOptions {
            tmdb_data: config.scraper.tmdb_data,
            tmdb_artwork: config.scraper.tmdb_artwork,
            image_base_url: config.tmdb.image_base_url.clone(),
        };

        Ok(Self::new(
            allocine,
            enrichment,
            options,
            config.scraper.trailer_quality.code(),
        ))
    }

    /// Search AlloCiné for movies titled `title`.
    pub async fn search(&self, title: &str) -> Result<Vec<Candidate>> {
        let candidates = self.allocine.search_movies(title).await?;
        if candidates.is_empty() {
            warn!(title, "No AlloCiné movie matches the title");
        }
        Ok(candidates)
    }

    /// Fetch and merge everything known about an AlloCiné movie.
    ///
    /// This method performs the following steps:
    ///
    /// 1. Fetches the AlloCiné movie record.
    /// 2. If enrichment is configured, resolves the TMDB movie through
    ///    Wikidata and fetches its record and images. A movie that cannot be
    ///    matched is logged and merged without enrichment.
    /// 3. Resolves the trailer URL at the configured quality.
    /// 4. Merges everything into a [`NormalizedMetadata`].
    ///
    /// # Errors
    ///
    /// Returns an error if any remote call fails or answers with an error
    /// payload.
    pub async fn details(&self, allocine_id: u64) -> Result<NormalizedMetadata> {
        info!(allocine_id, "Fetching movie details");

        let movie = self.allocine.get_movie(allocine_id).await?;

        let enrichment = match &self.enrichment {
            Some(source) => {
                let record = source.enrichment_for(allocine_id).await?;
                match &record {
                    Some(r) => debug!(
                        allocine_id,
                        source = source.name(),
                        id = r.tmdb_id,
                        "Enrichment found"
                    ),
                    None => warn!(
                        allocine_id,
                        source = source.name(),
                        "Unable to find enrichment for movie"
                    ),
                }
                record
            }
            None => None,
        };

        let trailer = self.resolve_trailer(&movie).await?;

        Ok(normalize::merge(
            &movie,
            enrichment.as_ref(),
            trailer,
            &self.options,
        ))
    }

    async fn resolve_trailer(&self, movie: &MovieRecord) -> Result<Option<String>> {
        let Some(media_code) = trailer::trailer_reference(movie) else {
            return Ok(None);
        };

        let renditions = self.allocine.get_media(media_code).await?;
        let selected = trailer::select_rendition(&renditions, self.max_trailer_quality);
        debug!(
            media_code,
            renditions = renditions.len(),
            quality = ?selected.map(|r| r.quality),
            "Resolved trailer"
        );
        Ok(selected.map(|r| r.url.clone()))
    }
}
