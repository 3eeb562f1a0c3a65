//! Indexing API client
//!
//! The client owns the active authenticated session and knows how to replace
//! it with one built from the next credential in the pool. It does not
//! interpret response status codes; classification (rotate vs. accept) is
//! the driver's job, which keeps rotation policy out of the transport layer.

use crate::auth::{exchange_token, CredentialSource, ServiceAccountKey};
use crate::config::IndexingConfig;
use crate::CourierError;
use std::time::Duration;

/// One authenticated session, derived from exactly one credential
///
/// A session is replaced wholesale on rotation, never partially updated.
pub struct Session {
    /// Account identity the session authenticates as
    pub account: String,
    token: String,
}

impl Session {
    /// Wraps an already-issued bearer token in a session
    pub fn from_token(account: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            token: token.into(),
        }
    }
}

/// Outcome of one submission request
///
/// Carries the raw response; the caller decides what the status code means.
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    /// HTTP status code
    pub status: u16,
    /// Human-readable reason phrase for the status
    pub reason: String,
    /// Raw response payload
    pub body: String,
}

/// Interface the driver needs from a submission client
#[allow(async_fn_in_trait)]
pub trait Submitter {
    /// Submits one URL, lazily building a session first if none is active
    async fn submit(&mut self, url: &str) -> Result<SubmissionResult, CourierError>;

    /// Discards the current session and builds one from the next credential.
    /// Fails with `CredentialsExhausted` when no credentials remain; that is
    /// the terminal failure for the whole run.
    async fn rotate(&mut self) -> Result<(), CourierError>;

    /// Releases the active session. Idempotent; safe with no session.
    fn close(&mut self);
}

/// HTTP client for the URL notification endpoint
pub struct IndexingClient {
    http: reqwest::Client,
    endpoint: String,
    scope: String,
    source: CredentialSource,
    session: Option<Session>,
}

impl IndexingClient {
    /// Creates a client over the given credential pool
    pub fn new(config: &IndexingConfig, source: CredentialSource) -> Result<Self, CourierError> {
        let http = build_http_client(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self {
            http,
            endpoint: config.endpoint_url.clone(),
            scope: config.oauth_scope.clone(),
            source,
            session: None,
        })
    }

    /// Creates a client with a preexisting session and an empty credential
    /// pool, for callers that already hold a bearer token
    pub fn with_session(
        endpoint: impl Into<String>,
        session: Session,
        timeout: Duration,
    ) -> Result<Self, CourierError> {
        let http = build_http_client(timeout)?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            scope: String::new(),
            source: CredentialSource::from_paths(Vec::new()),
            session: Some(session),
        })
    }

    /// Account the active session authenticates as, if any
    pub fn current_account(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.account.as_str())
    }

    /// Ensures a session is active, building one from the next credential if
    /// necessary
    async fn ensure_session(&mut self) -> Result<(), CourierError> {
        if self.session.is_none() {
            self.advance_session().await?;
        }
        Ok(())
    }

    /// Consumes the next credential and derives a session from it
    async fn advance_session(&mut self) -> Result<(), CourierError> {
        let path = self
            .source
            .next_key_path()
            .ok_or(CourierError::CredentialsExhausted)?;
        let key = ServiceAccountKey::from_file(&path)?;
        let token = exchange_token(&self.http, &key, &self.scope).await?;

        tracing::info!("Authenticated as {}", key.client_email);
        self.session = Some(Session {
            account: key.client_email,
            token,
        });
        Ok(())
    }

    async fn submit_inner(&mut self, url: &str) -> Result<SubmissionResult, CourierError> {
        self.ensure_session().await?;
        let session = self
            .session
            .as_ref()
            .ok_or(CourierError::CredentialsExhausted)?;

        let payload = serde_json::json!({
            "url": url.trim(),
            "type": "URL_UPDATED",
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&session.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let reason = status
            .canonical_reason()
            .unwrap_or("unknown")
            .to_string();
        let body = response.text().await?;

        Ok(SubmissionResult {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

impl Submitter for IndexingClient {
    async fn submit(&mut self, url: &str) -> Result<SubmissionResult, CourierError> {
        self.submit_inner(url).await
    }

    async fn rotate(&mut self) -> Result<(), CourierError> {
        // Dropping the session releases its pooled connection
        self.session = None;
        self.advance_session().await
    }

    fn close(&mut self) {
        self.session = None;
    }
}

/// Builds the HTTP client shared by token exchange and submissions
///
/// The finite timeout keeps a stalled submission from blocking the run
/// forever; a timeout surfaces as a transport error and is classified like
/// any other failed submission.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("index-courier/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
}
