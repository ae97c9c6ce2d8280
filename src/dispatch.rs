//! Request dispatch for the host surface.
//!
//! The host hands over a query string such as `?action=find&title=Heat`.
//! [`Request::parse`] turns it into an [`Action`] and [`Dispatcher::run`]
//! routes the action to the matching pipeline. Errors never escape
//! [`Dispatcher::run`]: they are logged and reported through
//! [`Response::succeeded`].

use regex::Regex;
use serde::Serialize;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Result, ScraperError};
use crate::metadata::enrichment::MetadataPipeline;
use crate::metadata::record::{Candidate, NormalizedMetadata};

/// What the host asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Resolve an AlloCiné id from an NFO reference URL (`nfo` parameter).
    NfoUrl { nfo: Option<String> },
    /// Full detail lookup (`url` parameter carries the AlloCiné id).
    GetDetails { url: Option<String> },
    /// Title search (`title` parameter).
    Find { title: Option<String> },
    /// Missing or unrecognised action name.
    Unknown(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub action: Action,
}

impl Request {
    pub fn new(action: Action) -> Self {
        Self { action }
    }

    /// Parse a host query string. A leading `?` is optional; repeated keys
    /// keep their last value.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut action = None;
        let mut nfo = None;
        let mut url = None;
        let mut title = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "action" => action = value,
                "nfo" => nfo = value,
                "url" => url = value,
                "title" => title = value,
                _ => {}
            }
        }

        let action = match action.as_deref() {
            Some("NfoUrl") => Action::NfoUrl { nfo },
            Some("getdetails") => Action::GetDetails { url },
            Some("find") => Action::Find { title },
            _ => Action::Unknown(action),
        };
        Self { action }
    }
}

/// Result payload of a dispatched request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// AlloCiné id extracted from an NFO URL.
    Resolved(u64),
    Details(Box<NormalizedMetadata>),
    Candidates(Vec<Candidate>),
    /// Nothing to report: no-op request or nothing found.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub succeeded: bool,
    pub outcome: Outcome,
}

impl Response {
    fn ok(outcome: Outcome) -> Self {
        Self {
            succeeded: true,
            outcome,
        }
    }

    fn failed() -> Self {
        Self {
            succeeded: false,
            outcome: Outcome::Empty,
        }
    }
}

pub struct Dispatcher {
    config: Config,
    nfo_pattern: Regex,
}

impl Dispatcher {
    pub fn new(config: Config) -> Result<Self> {
        let nfo_pattern = nfo_url_pattern(&config.allocine.site_domain)?;
        Ok(Self {
            config,
            nfo_pattern,
        })
    }

    /// Run one request to completion. Failures are logged and turned into an
    /// unsuccessful [`Response`].
    pub async fn run(&self, request: &Request) -> Response {
        match self.handle(&request.action).await {
            Ok(outcome) => Response::ok(outcome),
            Err(e) => {
                error!(action = ?request.action, error = %e, "Request failed");
                Response::failed()
            }
        }
    }

    async fn handle(&self, action: &Action) -> Result<Outcome> {
        match action {
            Action::NfoUrl { nfo } => Ok(nfo
                .as_deref()
                .and_then(|nfo| self.movie_id_from_nfo_url(nfo))
                .map_or(Outcome::Empty, |id| {
                    info!(allocine_id = id, "Movie id found in NFO file");
                    Outcome::Resolved(id)
                })),
            Action::GetDetails { url } => {
                let Some(id) = url.as_deref().and_then(|u| u.trim().parse::<u64>().ok()) else {
                    return Ok(Outcome::Empty);
                };
                let pipeline = MetadataPipeline::from_config(&self.config)?;
                let details = pipeline.details(id).await?;
                Ok(Outcome::Details(Box::new(details)))
            }
            Action::Find { title } => {
                let Some(title) = title.as_deref().filter(|t| !t.is_empty()) else {
                    return Ok(Outcome::Empty);
                };
                info!(title, "Searching movies");
                let pipeline = MetadataPipeline::from_config(&self.config)?;
                let candidates = pipeline.search(title).await?;
                Ok(Outcome::Candidates(candidates))
            }
            Action::Unknown(_) => Ok(Outcome::Empty),
        }
    }

    /// Extract the AlloCiné id from a movie page URL.
    pub fn movie_id_from_nfo_url(&self, nfo: &str) -> Option<u64> {
        self.nfo_pattern
            .captures(nfo)
            .and_then(|caps| caps.name("id"))
            .and_then(|id| id.as_str().parse::<u64>().ok())
            .filter(|&id| id != 0)
    }
}

fn nfo_url_pattern(site_domain: &str) -> Result<Regex> {
    let pattern = format!(
        r"https?://(?:www\.)?{}/film/fichefilm_gen_cfilm=(?P<id>\d+)\.html",
        regex::escape(site_domain.trim())
    );
    Regex::new(&pattern).map_err(|e| ScraperError::config(format!("invalid NFO URL pattern: {e}")))
}
