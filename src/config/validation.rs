use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Checks that every field the submission loop depends on is usable before
/// any network or database work starts.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.indexing.credentials_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "indexing.credentials-dir must not be empty".to_string(),
        ));
    }

    if config.indexing.oauth_scope.trim().is_empty() {
        return Err(ConfigError::Validation(
            "indexing.oauth-scope must not be empty".to_string(),
        ));
    }

    validate_endpoint(&config.indexing.endpoint_url)?;

    if config.indexing.log_every == 0 {
        return Err(ConfigError::Validation(
            "indexing.log-every must be at least 1".to_string(),
        ));
    }

    if config.indexing.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "indexing.request-timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.output.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output.database-path must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint).map_err(|_| ConfigError::InvalidUrl(endpoint.to_string()))?;

    // http is accepted so local mock endpoints work during development
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "indexing.endpoint-url has unsupported scheme '{}'",
            other
        ))),
    }
}
