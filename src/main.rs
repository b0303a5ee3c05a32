//! propsearch: property listing search service & CLI
//!
//! Dual-mode application:
//! - Server Mode (default): HTTP service exposing `/search`, `/signup`, `/login` and `/users`
//! - CLI Mode: run a single search from the command line and print the JSON results

mod auth;
mod cli;
mod config;
mod error;
mod http;
mod search;
mod server;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::{IndexConfig, ServerConfig};
use error::AppError;
use search::{ElasticIndex, IndexError, RawSearchParams, SearchEngine, SearchError};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // No arguments means server mode with env/default settings
    let args: Vec<String> = std::env::args().collect();
    let cli = if args.len() > 1 {
        Cli::parse()
    } else {
        Cli::parse_from([args.first().map(String::as_str).unwrap_or("propsearch"), "serve"])
    };

    init_logging(&cli);

    let result = match &cli.command {
        Commands::Serve(serve_args) => run_server(serve_args, &cli.index).await,
        Commands::Search(search_args) => execute_search_cli(search_args, &cli.index).await,
    };

    match result {
        Ok(Some(output)) => {
            println!("{}", output);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(get_exit_code(&e));
        }
    }
}

/// Log to stderr; RUST_LOG wins over the verbosity flags
fn init_logging(cli: &Cli) {
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_server(args: &cli::ServeArgs, index: &cli::IndexArgs) -> Result<Option<String>> {
    let config = ServerConfig::from_args(args, index)?;
    info!("Starting propsearch server v{}", env!("CARGO_PKG_VERSION"));
    server::serve(config).await?;
    Ok(None)
}

/// Execute search command in CLI mode
async fn execute_search_cli(args: &cli::SearchArgs, index: &cli::IndexArgs) -> Result<Option<String>> {
    let config = IndexConfig::from_args(index)?;
    let backend = ElasticIndex::new(config.url.as_str(), config.timeout).map_err(AppError::from)?;
    let engine = SearchEngine::new(Arc::new(backend), config.name);

    let params = RawSearchParams::from(args);
    let results = engine.search(&params).await.map_err(AppError::from)?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    Ok(Some(output))
}

/// Map an error to a process exit code
fn get_exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Search(SearchError::Invalid(_))) | Some(AppError::Config(_)) => 1,
        Some(AppError::Search(SearchError::Index(IndexError::Transport(e)))) if e.is_timeout() => 4,
        Some(AppError::Search(SearchError::Index(_))) => 2,
        Some(AppError::Search(SearchError::NoResults)) => 3,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search::params::ValidationError;

    #[test]
    fn test_exit_codes() {
        let invalid = anyhow::Error::from(AppError::from(SearchError::from(ValidationError::LocationRequired)));
        assert_eq!(get_exit_code(&invalid), 1);

        let empty = anyhow::Error::from(AppError::from(SearchError::NoResults));
        assert_eq!(get_exit_code(&empty), 3);

        let down = anyhow::Error::from(AppError::from(IndexError::Status {
            status: 503,
            body: String::new(),
        }));
        assert_eq!(get_exit_code(&down), 2);

        assert_eq!(get_exit_code(&anyhow::anyhow!("something else")), 5);
    }
}
