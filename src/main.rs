mod cli;

use allocine_scraper::config;
use allocine_scraper::{Action, Dispatcher, Request};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "allocine_scraper=debug".to_string()
        } else {
            "allocine_scraper=info".to_string()
        }
    });

    // stdout carries the JSON response only
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let request = match cli.command {
        Commands::Run { query } => Request::parse(&query),
        Commands::Find { title } => Request::new(Action::Find { title: Some(title) }),
        Commands::Details { id } => Request::new(Action::GetDetails { url: Some(id) }),
        Commands::Nfo { url } => Request::new(Action::NfoUrl { nfo: Some(url) }),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Version => {
            println!("allocine-scraper {}", env!("CARGO_PKG_VERSION"));
            return Ok(ExitCode::SUCCESS);
        }
    };

    let mut config = config::load_config_or_default(cli.config.as_deref())?;
    if let Some(quality) = cli.trailer_quality {
        config.scraper.trailer_quality = quality;
    }
    let dispatcher = Dispatcher::new(config)?;

    let rt = tokio::runtime::Runtime::new()?;
    let response = rt.block_on(dispatcher.run(&request));

    let json = serde_json::to_string_pretty(&response).context("Failed to serialize response")?;
    println!("{}", json);

    Ok(if response.succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  AlloCiné API: {}", config.allocine.base_url);
            println!("  Wikidata endpoint: {}", config.wikidata.endpoint);
            println!("  TMDB API: {} ({})", config.tmdb.base_url, config.tmdb.language);
            println!(
                "  Retries: {} (backoff factor {}s)",
                config.retry.max_retries, config.retry.backoff_factor_secs
            );
            println!("  TMDB data: {}", config.scraper.tmdb_data);
            println!("  TMDB artwork: {}", config.scraper.tmdb_artwork);
            println!("  Trailer quality: {:?}", config.scraper.trailer_quality);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  AlloCiné API: {}", config.allocine.base_url);
            println!("  TMDB API: {}", config.tmdb.base_url);
        }
    }

    Ok(())
}
