use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub allocine: AllocineConfig,

    #[serde(default)]
    pub wikidata: WikidataConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub scraper: ScraperConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AllocineConfig {
    #[serde(default = "default_allocine_base_url")]
    pub base_url: String,

    /// Partner key sent with every request
    #[serde(default = "default_partner_key")]
    pub partner_key: String,

    /// Shared secret appended to the signed string (never sent)
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    #[serde(default = "default_allocine_user_agent")]
    pub user_agent: String,

    /// Domain of the public website, used to recognise movie page URLs in NFO files
    #[serde(default = "default_site_domain")]
    pub site_domain: String,
}

fn default_allocine_base_url() -> String {
    "https://api.allocine.fr/rest/v3".to_string()
}
fn default_partner_key() -> String {
    "100ED1DA33EB".to_string()
}
fn default_secret_key() -> String {
    "1a1ed8c1bed24d60ae3472eed1da33eb".to_string()
}
fn default_allocine_user_agent() -> String {
    "Mozilla/5.0 (Linux; Android 10; SM-G975U) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/79.0.3945.93 Mobile Safari/537.36"
        .to_string()
}
fn default_site_domain() -> String {
    "allocine.fr".to_string()
}

impl Default for AllocineConfig {
    fn default() -> Self {
        Self {
            base_url: default_allocine_base_url(),
            partner_key: default_partner_key(),
            secret_key: default_secret_key(),
            user_agent: default_allocine_user_agent(),
            site_domain: default_site_domain(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WikidataConfig {
    #[serde(default = "default_wikidata_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_wikidata_endpoint() -> String {
    "https://query.wikidata.org/bigdata/namespace/wdq/sparql".to_string()
}
fn default_user_agent() -> String {
    concat!("allocine-scraper/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            endpoint: default_wikidata_endpoint(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,

    /// Prefix of image URLs; a size token and the file path are appended
    #[serde(default = "default_tmdb_image_base_url")]
    pub image_base_url: String,

    #[serde(default = "default_tmdb_api_key")]
    pub api_key: String,

    /// Language of the base record and preferred image language
    #[serde(default = "default_tmdb_language")]
    pub language: String,
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}
fn default_tmdb_api_key() -> String {
    "e9398d6bf0e3664b8e27dab81adda961".to_string()
}
fn default_tmdb_language() -> String {
    "fr".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_tmdb_base_url(),
            image_base_url: default_tmdb_image_base_url(),
            api_key: default_tmdb_api_key(),
            language: default_tmdb_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 disables retrying)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor_secs: f64,

    #[serde(default = "default_backoff_max")]
    pub backoff_max_secs: u64,

    /// HTTP statuses considered transient
    #[serde(default = "default_retry_statuses")]
    pub statuses: Vec<u16>,

    #[serde(default = "default_respect_retry_after")]
    pub respect_retry_after: bool,

    /// Per-attempt timeout; a timed out attempt counts as a failed one
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_max_retries() -> u32 {
    10
}
fn default_backoff_factor() -> f64 {
    5.0
}
fn default_backoff_max() -> u64 {
    120
}
fn default_retry_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}
fn default_respect_retry_after() -> bool {
    true
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_factor_secs: default_backoff_factor(),
            backoff_max_secs: default_backoff_max(),
            statuses: default_retry_statuses(),
            respect_retry_after: default_respect_retry_after(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Behaviour flags normally owned by the host's settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Merge TMDB text fields (tagline, studios, collection) and identifiers
    #[serde(default)]
    pub tmdb_data: bool,

    /// Merge TMDB posters and backdrops
    #[serde(default)]
    pub tmdb_artwork: bool,

    #[serde(default)]
    pub trailer_quality: TrailerQuality,
}

impl ScraperConfig {
    /// Whether the secondary source has to be queried at all.
    pub fn enrichment_enabled(&self) -> bool {
        self.tmdb_data || self.tmdb_artwork
    }
}

/// Highest trailer rendition the user wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailerQuality {
    #[default]
    Hq,
    Mq,
    Sq,
    Lq,
}

impl TrailerQuality {
    /// AlloCiné bandwidth code of this tier.
    pub fn code(self) -> u64 {
        match self {
            TrailerQuality::Hq => 104004,
            TrailerQuality::Mq => 104003,
            TrailerQuality::Sq => 104002,
            TrailerQuality::Lq => 104001,
        }
    }
}

impl std::str::FromStr for TrailerQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hq" | "0" => Ok(TrailerQuality::Hq),
            "mq" | "1" => Ok(TrailerQuality::Mq),
            "sq" | "2" => Ok(TrailerQuality::Sq),
            "lq" | "3" => Ok(TrailerQuality::Lq),
            other => Err(format!("unknown trailer quality: {other}")),
        }
    }
}
