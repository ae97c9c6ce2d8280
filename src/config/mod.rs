mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./allocine-scraper.toml",
        "~/.config/allocine-scraper/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let urls = [
        ("allocine.base_url", &config.allocine.base_url),
        ("wikidata.endpoint", &config.wikidata.endpoint),
        ("tmdb.base_url", &config.tmdb.base_url),
        ("tmdb.image_base_url", &config.tmdb.image_base_url),
    ];
    for (name, url) in urls {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("{} must start with http:// or https://", name);
        }
    }

    let keys = [
        ("allocine.partner_key", &config.allocine.partner_key),
        ("allocine.secret_key", &config.allocine.secret_key),
        ("tmdb.api_key", &config.tmdb.api_key),
    ];
    for (name, key) in keys {
        if key.trim().is_empty() {
            anyhow::bail!("{} cannot be empty", name);
        }
    }

    if config.allocine.site_domain.trim().is_empty() {
        anyhow::bail!("allocine.site_domain cannot be empty");
    }

    let factor = config.retry.backoff_factor_secs;
    if !factor.is_finite() || factor < 0.0 {
        anyhow::bail!("retry.backoff_factor_secs must be a non-negative number");
    }

    if config.retry.max_retries > 0 && config.retry.statuses.is_empty() {
        tracing::warn!("Retries are enabled but no retry status is configured");
    }

    Ok(())
}
