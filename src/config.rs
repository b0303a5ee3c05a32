//! Resolved runtime configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::auth::{FileUserStore, TokenIssuer};
use crate::cli::{IndexArgs, ServeArgs};
use crate::error::AppError;

/// Where and how to reach the search index
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub url: Url,
    pub name: String,
    pub timeout: Duration,
}

impl IndexConfig {
    pub fn from_args(args: &IndexArgs) -> Result<Self, AppError> {
        let url = Url::parse(&args.index_url)
            .map_err(|e| AppError::Config(format!("Invalid index URL '{}': {}", args.index_url, e)))?;

        let name = args.index_name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(AppError::Config(format!("Invalid index name '{}'", args.index_name)));
        }

        if args.index_timeout_secs == 0 {
            return Err(AppError::Config("Index timeout must be at least 1 second".to_string()));
        }

        Ok(Self {
            url,
            name: name.to_string(),
            timeout: Duration::from_secs(args.index_timeout_secs),
        })
    }
}

/// Everything `serve` needs
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub index: IndexConfig,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    /// `None` keeps users in memory
    pub users_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_args(serve: &ServeArgs, index: &IndexArgs) -> Result<Self, AppError> {
        let index = IndexConfig::from_args(index)?;

        let jwt_secret = match serve.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                warn!("No JWT secret configured; generated a random one, tokens will not survive a restart");
                TokenIssuer::random_secret()
            }
        };

        if serve.token_ttl_secs == 0 {
            return Err(AppError::Config("Token TTL must be at least 1 second".to_string()));
        }

        let users_file = if serve.memory_users {
            None
        } else {
            match &serve.users_file {
                Some(path) => Some(path.clone()),
                None => Some(FileUserStore::default_path()?),
            }
        };

        Ok(Self {
            listen: serve.listen,
            index,
            jwt_secret,
            token_ttl_secs: serve.token_ttl_secs,
            users_file,
        })
    }
}
