//! Server configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | DATA_DIR | /var/lib/tender | Database and runtime files |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | EDIT_LOCK_TIMEOUT_SECS | 300 | Offer edit lease TTL |
//! | CHANNEL_CAPACITY | 1024 | Event broadcast channel capacity |
//! | LOG_LEVEL | info | tracing filter level |
//! | LOG_DIR | (unset) | Daily-rolling log files when set |
//!
//! ```ignore
//! DATA_DIR=/data/tender HTTP_PORT=8080 cargo run
//! ```

use std::path::PathBuf;

/// Database file name inside the data directory
const DB_FILE: &str = "market.redb";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the redb database and runtime files
    pub data_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Offer edit lease TTL in seconds
    pub edit_lock_timeout_secs: u64,
    /// Broadcast channel capacity for the event hub
    pub channel_capacity: usize,
    /// tracing filter level
    pub log_level: String,
    /// Daily-rolling log directory; stdout only when unset
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from the environment, missing values default
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/var/lib/tender".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            edit_lock_timeout_secs: std::env::var("EDIT_LOCK_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::bidding::EDIT_LOCK_TIMEOUT_SECS),
            channel_capacity: std::env::var("CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Override the volatile parts, keeping the rest from the environment
    ///
    /// Used by tests that point the server at a scratch directory.
    pub fn with_overrides(data_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config.http_port = http_port;
        config
    }

    /// Path of the redb database file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
