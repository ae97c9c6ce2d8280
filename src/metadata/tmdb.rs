//! TMDB (The Movie Database) client used for enrichment.
//!
//! Provides the external-id lookup used by cross-referencing and the
//! composite [`TmdbClient::fetch`] that returns an [`EnrichmentRecord`]
//! with its image sets already ordered by language preference.

use reqwest::header::HeaderMap;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::config::TmdbConfig;
use crate::error::{Result, ScraperError};
use crate::http::HttpClient;
use crate::metadata::record::{EnrichmentRecord, TmdbImage};

const SERVICE: &str = "tmdb";

/// Language slot used for images without text.
const NO_LANGUAGE: &str = "null";

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbStatus {
    success: Option<bool>,
    status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbFindResponse {
    movie_results: Option<Vec<TmdbFindResult>>,
}

#[derive(Debug, Deserialize)]
struct TmdbFindResult {
    id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetail {
    id: u64,
    imdb_id: Option<String>,
    tagline: Option<String>,
    production_companies: Option<Vec<TmdbCompany>>,
    belongs_to_collection: Option<TmdbCollection>,
    original_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbCompany {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbCollection {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TmdbImagesResponse {
    posters: Option<Vec<TmdbImageEntry>>,
    backdrops: Option<Vec<TmdbImageEntry>>,
}

#[derive(Debug, Deserialize)]
struct TmdbImageEntry {
    file_path: Option<String>,
    iso_639_1: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(http: HttpClient, config: &TmdbConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }

    /// Build a full API URL from path segments (each one escaped), the API
    /// key and extra query parameters.
    fn url(&self, segments: &[&str], extra_params: &[(&str, &str)]) -> Result<Url> {
        let invalid = |e: String| ScraperError::config(format!("invalid TMDB URL: {e}"));

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .extend_pairs(extra_params);
        Ok(url)
    }

    /// GET a TMDB path, mapping `{"success": false}` payloads to errors.
    async fn query(
        &self,
        segments: &[&str],
        extra_params: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        let url = self.url(segments, extra_params)?;
        let data = self.http.get_json(SERVICE, url, HeaderMap::new()).await?;

        let status: TmdbStatus = serde_json::from_value(data.clone())
            .map_err(|e| ScraperError::decode("TMDB status", e))?;
        if status.success == Some(false) {
            let message = status
                .status_message
                .unwrap_or_else(|| "request failed".to_string());
            return Err(ScraperError::api(SERVICE, message));
        }

        Ok(data)
    }

    /// Find the TMDB movie id matching an IMDb id.
    pub async fn find_by_imdb_id(&self, imdb_id: &str) -> Result<Option<u64>> {
        let data = self
            .query(&["find", imdb_id], &[("external_source", "imdb_id")])
            .await?;
        let response: TmdbFindResponse = serde_json::from_value(data)
            .map_err(|e| ScraperError::decode("TMDB find results", e))?;

        let tmdb_id = response
            .movie_results
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.id);

        debug!(imdb_id, tmdb_id = ?tmdb_id, "TMDB find");
        Ok(tmdb_id)
    }

    async fn get_movie(&self, tmdb_id: u64) -> Result<TmdbMovieDetail> {
        let id = tmdb_id.to_string();
        let data = self
            .query(&["movie", &id], &[("language", self.language.as_str())])
            .await?;
        serde_json::from_value(data)
            .map_err(|e| ScraperError::decode(format!("TMDB movie {tmdb_id}"), e))
    }

    async fn get_movie_images(&self, tmdb_id: u64, languages: &[String]) -> Result<TmdbImagesResponse> {
        let include = languages.join(",");
        let id = tmdb_id.to_string();
        let data = self
            .query(
                &["movie", &id, "images"],
                &[
                    ("language", self.language.as_str()),
                    ("include_image_language", include.as_str()),
                ],
            )
            .await?;
        serde_json::from_value(data)
            .map_err(|e| ScraperError::decode(format!("TMDB images of movie {tmdb_id}"), e))
    }

    /// Fetch the enrichment record of a TMDB movie: the base record in the
    /// configured language, then its images restricted to
    /// `[language, no language, original language]`.
    pub async fn fetch(&self, tmdb_id: u64) -> Result<EnrichmentRecord> {
        let detail = self.get_movie(tmdb_id).await?;
        if detail.id != tmdb_id {
            return Err(ScraperError::inconsistent(format!(
                "requested TMDB movie {tmdb_id}, received {}",
                detail.id
            )));
        }

        let languages = image_languages(&self.language, detail.original_language.as_deref());
        let images = self.get_movie_images(tmdb_id, &languages).await?;

        debug!(
            tmdb_id,
            languages = ?languages,
            posters = images.posters.as_ref().map_or(0, Vec::len),
            backdrops = images.backdrops.as_ref().map_or(0, Vec::len),
            "Fetched TMDB movie"
        );

        Ok(EnrichmentRecord {
            tmdb_id: detail.id,
            imdb_id: detail.imdb_id.filter(|s| !s.is_empty()),
            tagline: detail.tagline.filter(|s| !s.is_empty()),
            studios: detail
                .production_companies
                .unwrap_or_default()
                .into_iter()
                .filter_map(|c| c.name)
                .collect(),
            collection: detail.belongs_to_collection.and_then(|c| c.name),
            original_language: detail.original_language,
            posters: sort_by_language(to_images(images.posters), &languages),
            backdrops: sort_by_language(to_images(images.backdrops), &languages),
        })
    }
}

fn to_images(entries: Option<Vec<TmdbImageEntry>>) -> Vec<TmdbImage> {
    entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(|e| {
            Some(TmdbImage {
                file_path: e.file_path.filter(|p| !p.is_empty())?,
                language: e.iso_639_1,
            })
        })
        .collect()
}

/// Prioritised image languages: the preferred one, images without text,
/// then the original language of the movie when it differs from both.
pub fn image_languages(preferred: &str, original: Option<&str>) -> Vec<String> {
    let mut languages = vec![preferred.to_string(), NO_LANGUAGE.to_string()];
    let original = original.filter(|l| !l.is_empty()).unwrap_or(NO_LANGUAGE);
    if !languages.iter().any(|l| l == original) {
        languages.push(original.to_string());
    }
    languages
}

/// Stable sort by position in `languages`; unknown or missing languages rank
/// with images without text. Duplicate file paths keep their best position.
pub fn sort_by_language(mut images: Vec<TmdbImage>, languages: &[String]) -> Vec<TmdbImage> {
    let rank = |image: &TmdbImage| {
        let language = image.language.as_deref().unwrap_or(NO_LANGUAGE);
        languages
            .iter()
            .position(|l| l == language)
            .or_else(|| languages.iter().position(|l| l == NO_LANGUAGE))
            .unwrap_or(languages.len())
    };
    images.sort_by_key(rank);

    let mut seen = std::collections::HashSet::new();
    images.retain(|image| seen.insert(image.file_path.clone()));
    images
}
