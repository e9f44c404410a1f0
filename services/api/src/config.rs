//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub redis_url: String,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub omdb_api_key: Option<String>,
    pub chat_model: String,
    pub fact_model: String,
    /// Expiry for cached movie records; `None` means cache entries never expire.
    pub movie_cache_ttl_seconds: Option<u64>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server, Database and Cache Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let redis_url = std::env::var("REDIS_URL")
            .map_err(|_| ConfigError::MissingVar("REDIS_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let tmdb_api_key = std::env::var("TMDB_API_KEY").ok();
        let omdb_api_key = std::env::var("OMDB_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let fact_model =
            std::env::var("FACT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let movie_cache_ttl_seconds = match std::env::var("MOVIE_CACHE_TTL_SECONDS") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "MOVIE_CACHE_TTL_SECONDS".to_string(),
                    format!("'{}' is not a number of seconds", raw),
                )
            })?),
            Err(_) => None,
        };

        Ok(Self {
            bind_address,
            database_url,
            redis_url,
            log_level,
            openai_api_key,
            tmdb_api_key,
            omdb_api_key,
            chat_model,
            fact_model,
            movie_cache_ttl_seconds,
        })
    }
}
