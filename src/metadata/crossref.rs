//! Cross-referencing of AlloCiné ids to TMDB ids through IMDb.
//!
//! AlloCiné does not expose any external identifier, so the mapping takes two
//! hops: Wikidata gives the IMDb id of the AlloCiné film, then TMDB's
//! external-id search gives the TMDB id. A missing link at either hop is a
//! normal outcome and yields `None`.

use tracing::debug;

use crate::error::Result;
use crate::metadata::tmdb::TmdbClient;
use crate::metadata::wikidata::WikidataClient;

/// Identifiers linking an AlloCiné movie to TMDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReference {
    pub imdb_id: String,
    pub tmdb_id: u64,
}

#[derive(Debug, Clone)]
pub struct CrossReferenceResolver {
    wikidata: WikidataClient,
    tmdb: TmdbClient,
}

impl CrossReferenceResolver {
    pub fn new(wikidata: WikidataClient, tmdb: TmdbClient) -> Self {
        Self { wikidata, tmdb }
    }

    /// AlloCiné id to IMDb id.
    pub async fn resolve_external_id(&self, allocine_id: u64) -> Result<Option<String>> {
        self.wikidata.imdb_id_for(allocine_id).await
    }

    /// IMDb id to TMDB id.
    pub async fn resolve_secondary_id(&self, imdb_id: &str) -> Result<Option<u64>> {
        self.tmdb.find_by_imdb_id(imdb_id).await
    }

    /// Both hops; `None` as soon as one of them finds nothing.
    pub async fn resolve(&self, allocine_id: u64) -> Result<Option<CrossReference>> {
        let Some(imdb_id) = self.resolve_external_id(allocine_id).await? else {
            debug!(allocine_id, "No IMDb id on Wikidata");
            return Ok(None);
        };

        let Some(tmdb_id) = self.resolve_secondary_id(&imdb_id).await? else {
            debug!(allocine_id, imdb_id = %imdb_id, "No TMDB movie for IMDb id");
            return Ok(None);
        };

        Ok(Some(CrossReference { imdb_id, tmdb_id }))
    }
}
