//! Wikidata SPARQL lookup mapping AlloCiné film ids to IMDb ids.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::config::WikidataConfig;
use crate::error::{Result, ScraperError};
use crate::http::HttpClient;

const SERVICE: &str = "wikidata";

#[derive(Debug, Default, Deserialize)]
struct SparqlResponse {
    results: Option<SparqlResults>,
}

#[derive(Debug, Default, Deserialize)]
struct SparqlResults {
    bindings: Option<Vec<ImdbBinding>>,
}

#[derive(Debug, Default, Deserialize)]
struct ImdbBinding {
    imdb: Option<SparqlValue>,
}

#[derive(Debug, Default, Deserialize)]
struct SparqlValue {
    value: Option<String>,
}

/// Query for the IMDb id (P345) of the item whose AlloCiné film id (P1265)
/// is `allocine_id`.
pub fn imdb_query(allocine_id: u64) -> String {
    format!(
        "SELECT DISTINCT ?imdb WHERE {{ ?item wdt:P1265 \"{allocine_id}\"; wdt:P345 ?imdb. }}"
    )
}

#[derive(Debug, Clone)]
pub struct WikidataClient {
    http: HttpClient,
    endpoint: String,
    user_agent: String,
}

impl WikidataClient {
    pub fn new(http: HttpClient, config: &WikidataConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Resolve the IMDb id of an AlloCiné movie, `None` when Wikidata has no
    /// matching item.
    pub async fn imdb_id_for(&self, allocine_id: u64) -> Result<Option<String>> {
        let url = Url::parse_with_params(&self.endpoint, &[("query", imdb_query(allocine_id))])
            .map_err(|e| ScraperError::config(format!("invalid Wikidata endpoint: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|e| ScraperError::config(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let data = self.http.get_json(SERVICE, url, headers).await?;
        let response: SparqlResponse = serde_json::from_value(data)
            .map_err(|e| ScraperError::decode("Wikidata SPARQL results", e))?;

        let imdb_id = response
            .results
            .and_then(|r| r.bindings)
            .and_then(|b| b.into_iter().next())
            .and_then(|b| b.imdb)
            .and_then(|v| v.value)
            .filter(|v| !v.is_empty());

        debug!(allocine_id, imdb_id = ?imdb_id, "Wikidata lookup");
        Ok(imdb_id)
    }
}
