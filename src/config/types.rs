use serde::Deserialize;

/// Main configuration structure for Index-Courier
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub indexing: IndexingConfig,
    pub output: OutputConfig,
}

/// Indexing submission configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexingConfig {
    /// Directory containing service-account key files (one `.json` per identity)
    #[serde(rename = "credentials-dir")]
    pub credentials_dir: String,

    /// OAuth2 scope requested for every session
    #[serde(rename = "oauth-scope", default = "default_oauth_scope")]
    pub oauth_scope: String,

    /// Endpoint receiving URL update notifications
    #[serde(rename = "endpoint-url", default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Emit a progress summary every N processed items
    #[serde(rename = "log-every", default = "default_log_every")]
    pub log_every: u64,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite work-queue database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_oauth_scope() -> String {
    "https://www.googleapis.com/auth/indexing".to_string()
}

fn default_endpoint_url() -> String {
    "https://indexing.googleapis.com/v3/urlNotifications:publish".to_string()
}

fn default_log_every() -> u64 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}
