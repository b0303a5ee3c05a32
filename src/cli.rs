//! Command-line interface
//!
//! `serve` runs the HTTP service; `search` runs one search and prints JSON.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::search::{RawSearchParams, DEFAULT_COLLECTION};

/// Property search service
#[derive(Parser, Debug)]
#[command(name = "propsearch")]
#[command(about = "Property listing search service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub index: IndexArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service (default when no arguments are given)
    Serve(ServeArgs),
    /// Run a single search against the index and print the results
    Search(SearchArgs),
}

/// Search index connection settings
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Base URL of the search index
    #[arg(long, global = true, env = "PROPSEARCH_INDEX_URL", default_value = "http://localhost:9200")]
    pub index_url: String,

    /// Collection holding the property documents
    #[arg(long, global = true, env = "PROPSEARCH_INDEX_NAME", default_value = DEFAULT_COLLECTION)]
    pub index_name: String,

    /// Timeout for a single index request, in seconds
    #[arg(long, global = true, env = "PROPSEARCH_INDEX_TIMEOUT_SECS", default_value_t = 30)]
    pub index_timeout_secs: u64,
}

/// `serve` arguments
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "PROPSEARCH_LISTEN", default_value = "127.0.0.1:5000")]
    pub listen: SocketAddr,

    /// Secret for signing access tokens (random per process when unset)
    #[arg(long, env = "PROPSEARCH_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Access token lifetime, in seconds
    #[arg(long, env = "PROPSEARCH_TOKEN_TTL_SECS", default_value_t = 900)]
    pub token_ttl_secs: u64,

    /// JSON file holding registered users
    #[arg(long, env = "PROPSEARCH_USERS_FILE", conflicts_with = "memory_users")]
    pub users_file: Option<PathBuf>,

    /// Keep registered users in memory only
    #[arg(long)]
    pub memory_users: bool,
}

/// `search` arguments, mirroring the `/search` query parameters
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Title (fuzzy and partial match)
    #[arg(short = 't', long)]
    pub title: Option<String>,

    /// Minimum price (inclusive)
    #[arg(long)]
    pub minprice: Option<String>,

    /// Maximum price (inclusive)
    #[arg(long)]
    pub maxprice: Option<String>,

    /// Location (required)
    #[arg(short = 'l', long)]
    pub location: Option<String>,

    /// Amenities (fuzzy match)
    #[arg(short = 'a', long)]
    pub amenities: Option<String>,

    /// Sort by price: asc or desc
    #[arg(short = 's', long)]
    pub sort: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl From<&SearchArgs> for RawSearchParams {
    fn from(args: &SearchArgs) -> Self {
        RawSearchParams {
            title: args.title.clone(),
            minprice: args.minprice.clone(),
            maxprice: args.maxprice.clone(),
            location: args.location.clone(),
            amenities: args.amenities.clone(),
            sort: args.sort.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::parse_from([
            "propsearch", "search", "-l", "Downtown", "--minprice", "100", "-s", "desc",
        ]);
        match cli.command {
            Commands::Search(args) => {
                let params = RawSearchParams::from(&args);
                assert_eq!(params.location.as_deref(), Some("Downtown"));
                assert_eq!(params.minprice.as_deref(), Some("100"));
                assert_eq!(params.sort.as_deref(), Some("desc"));
                assert!(params.title.is_none());
            }
            other => panic!("expected search command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_command() {
        let cli = Cli::parse_from([
            "propsearch", "serve", "--listen", "0.0.0.0:8080", "--memory-users", "--index-name", "homes",
        ]);
        assert_eq!(cli.index.index_name, "homes");
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.listen.port(), 8080);
                assert!(args.memory_users);
            }
            other => panic!("expected serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_users_file_conflicts_with_memory_users() {
        let result = Cli::try_parse_from([
            "propsearch", "serve", "--memory-users", "--users-file", "/tmp/users.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["propsearch", "search", "-l", "paris", "--verbose"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }
}
