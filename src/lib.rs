//! Index-Courier: a resumable batch client for the Google Indexing API
//!
//! This crate submits URLs to the Indexing API on behalf of a pool of
//! service-account credentials, rotating to the next credential when the
//! active one is throttled or rejected, and persisting per-URL progress in
//! SQLite so an interrupted batch picks up where it left off.

pub mod auth;
pub mod client;
pub mod config;
pub mod driver;
pub mod stats;
pub mod store;

use thiserror::Error;

/// Main error type for Index-Courier operations
#[derive(Debug, Error)]
pub enum CourierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential pool is exhausted")]
    CredentialsExhausted,

    #[error("Invalid service account key {path}: {message}")]
    InvalidKey { path: String, message: String },

    #[error("Token exchange failed for {account}: HTTP {status}: {body}")]
    TokenExchange {
        account: String,
        status: u16,
        body: String,
    },

    #[error("JWT signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Index-Courier operations
pub type Result<T> = std::result::Result<T, CourierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use auth::CredentialSource;
pub use client::{IndexingClient, Session, SubmissionResult, Submitter};
pub use config::Config;
pub use driver::{IndexingDriver, RunOutcome, RunSummary};
pub use store::{SqliteStore, UrlStatus, UrlStore};
