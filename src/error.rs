//! Error type shared by every stage of the scraper.
//!
//! A single [`ScraperError`] covers transport failures, error payloads
//! reported by one of the remote APIs, decoding problems and internal merge
//! inconsistencies. "Not found" situations are never errors: lookups return
//! `Ok(None)` or empty collections instead.

/// Error raised while scraping a movie.
#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    /// The HTTP request could not be completed (DNS, connection reset, timeout...).
    #[error("request to {url} failed: {source}")]
    Transport {
        /// URL of the failed request, without its query string.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered with an error payload.
    #[error("{service} error: {message}")]
    Api {
        /// Short name of the service (`allocine`, `tmdb`, `wikidata`).
        service: &'static str,
        /// Message supplied by the server.
        message: String,
    },

    /// A transient status kept coming back until the retry budget ran out.
    #[error("{url} still returned {status} after {attempts} attempts")]
    RetriesExhausted {
        /// URL of the failed request, without its query string.
        url: String,
        /// Last HTTP status received.
        status: u16,
        /// Number of requests sent.
        attempts: u32,
    },

    /// A response body did not have the expected shape.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The data gathered for one request contradicts itself.
    #[error("inconsistent data: {0}")]
    Inconsistent(String),

    /// The configuration cannot be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScraperError {
    /// Create a new Api error.
    pub fn api<S: Into<String>>(service: &'static str, message: S) -> Self {
        Self::Api {
            service,
            message: message.into(),
        }
    }

    /// Create a new Decode error.
    pub fn decode<S: Into<String>>(context: S, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Create a new Inconsistent error.
    pub fn inconsistent<S: Into<String>>(msg: S) -> Self {
        Self::Inconsistent(msg.into())
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using [`ScraperError`].
pub type Result<T> = std::result::Result<T, ScraperError>;
