//! AlloCiné REST v3 client.
//!
//! All requests go through [`AllocineClient::query`], which signs the
//! insertion-ordered parameters (see [`signature`]) and turns `error`
//! payloads into [`ScraperError::Api`].

pub mod signature;
mod types;

use chrono::{Local, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use tracing::debug;

use crate::config::AllocineConfig;
use crate::error::{Result, ScraperError};
use crate::http::HttpClient;
use crate::metadata::record::{Candidate, MovieRecord, Rendition};

pub use signature::{Params, SignedQuery};

const SERVICE: &str = "allocine";

/// Upper bound on search results; the API has no "unlimited" value.
const SEARCH_COUNT: u32 = 9999;

/// Signed AlloCiné client.
#[derive(Debug, Clone)]
pub struct AllocineClient {
    http: HttpClient,
    base_url: String,
    partner_key: String,
    secret_key: String,
    user_agent: String,
    today: Option<NaiveDate>,
}

impl AllocineClient {
    pub fn new(http: HttpClient, config: &AllocineConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            partner_key: config.partner_key.clone(),
            secret_key: config.secret_key.clone(),
            user_agent: config.user_agent.clone(),
            today: None,
        }
    }

    /// Pin the `sed` date instead of using the local calendar date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Build the signed request URL for `path`.
    pub fn signed_url(&self, path: &str, params: &Params) -> Result<Url> {
        let signed = signature::sign(path, params, &self.secret_key, self.today());
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| ScraperError::config(format!("invalid AlloCiné URL: {e}")))?;
        url.set_query(Some(&signed.query_string()));
        Ok(url)
    }

    /// Send a signed GET to `path` and return the JSON body.
    pub async fn query(&self, path: &str, params: &Params) -> Result<serde_json::Value> {
        let url = self.signed_url(path, params)?;

        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|e| ScraperError::config(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let data = self.http.get_json(SERVICE, url, headers).await?;

        let envelope: types::ErrorEnvelope = serde_json::from_value(data.clone())
            .map_err(|e| ScraperError::decode("AlloCiné error payload", e))?;
        if let Some(error) = envelope.error {
            let message = error
                .message
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(ScraperError::api(SERVICE, message));
        }

        Ok(data)
    }

    /// Search movies by title. An empty feed is not an error.
    pub async fn search_movies(&self, title: &str) -> Result<Vec<Candidate>> {
        let params = Params::new()
            .push("count", SEARCH_COUNT)
            .push("filter", "movie")
            .push("format", "json")
            .push("partner", &self.partner_key)
            .push("q", title);

        let data = self.query("search", &params).await?;
        let envelope: types::SearchEnvelope = serde_json::from_value(data)
            .map_err(|e| ScraperError::decode("AlloCiné search results", e))?;

        let candidates: Vec<Candidate> = envelope
            .feed
            .and_then(|f| f.movie)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.into_candidate())
            .collect();

        debug!(title, count = candidates.len(), "AlloCiné search");
        Ok(candidates)
    }

    /// Fetch the full movie record.
    ///
    /// Returns [`ScraperError::Inconsistent`] if AlloCiné answers with
    /// another movie than the one requested.
    pub async fn get_movie(&self, code: u64) -> Result<MovieRecord> {
        let params = Params::new()
            .push("code", code)
            .push("format", "json")
            .push("partner", &self.partner_key)
            .push("profile", "large")
            .push("striptags", "synopsis,synopsisshort");

        let data = self.query("movie", &params).await?;
        let envelope: types::MovieEnvelope = serde_json::from_value(data)
            .map_err(|e| ScraperError::decode(format!("AlloCiné movie {code}"), e))?;

        let record = envelope.movie.unwrap_or_default().into_record(code);
        if record.code != code {
            return Err(ScraperError::inconsistent(format!(
                "requested AlloCiné movie {code}, received {}",
                record.code
            )));
        }
        Ok(record)
    }

    /// Fetch the renditions of a media (trailer) item.
    pub async fn get_media(&self, code: u64) -> Result<Vec<Rendition>> {
        let params = Params::new()
            .push("code", code)
            .push("format", "json")
            .push("partner", &self.partner_key)
            .push("profile", "large");

        let data = self.query("media", &params).await?;
        let envelope: types::MediaEnvelope = serde_json::from_value(data)
            .map_err(|e| ScraperError::decode(format!("AlloCiné media {code}"), e))?;

        Ok(envelope.media.unwrap_or_default().into_renditions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RetryPolicy;
    use std::time::Duration;

    fn client() -> AllocineClient {
        let http = HttpClient::new(RetryPolicy::none(), Duration::from_secs(5)).unwrap();
        AllocineClient::new(http, &AllocineConfig::default())
            .with_date(NaiveDate::from_ymd_opt(2020, 5, 17).unwrap())
    }

    #[test]
    fn signed_url_carries_params_in_order() {
        let client = client();
        let params = Params::new()
            .push("code", 27405)
            .push("format", "json")
            .push("partner", "100ED1DA33EB");
        let url = client.signed_url("movie", &params).unwrap();

        assert_eq!(url.path(), "/rest/v3/movie");
        let query = url.query().unwrap();
        assert!(query.starts_with("code=27405&format=json&partner=100ED1DA33EB&sed=20200517&sig="));
    }

    #[test]
    fn signed_url_is_stable_for_a_fixed_date() {
        let client = client();
        let params = Params::new().push("q", "le fabuleux destin");
        assert_eq!(
            client.signed_url("search", &params).unwrap(),
            client.signed_url("search", &params).unwrap()
        );
    }

    #[test]
    fn signature_in_url_is_percent_encoded() {
        let client = client();
        let url = client.signed_url("search", &Params::new().push("q", "x")).unwrap();
        let sig = url.query().unwrap().rsplit("sig=").next().unwrap();
        assert!(!sig.contains('+'));
        assert!(!sig.contains('/'));
        assert!(!sig.contains('='));
    }
}
