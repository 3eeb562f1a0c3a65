//! Submission run loop
//!
//! The driver orchestrates one indexing run: claim a URL from the queue,
//! submit it, classify the response, and either record success or rotate to
//! the next credential and retry the same URL. The loop ends when the queue
//! runs dry or the credential pool does; ordinary HTTP failures never end
//! it. The session is released on every exit path.

use crate::client::Submitter;
use crate::store::UrlStore;
use crate::CourierError;

/// Why a run stopped
///
/// Both outcomes are graceful shutdowns from the caller's perspective; a run
/// always ends with a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every URL in `new` status was processed
    QueueExhausted,
    /// Rotation was requested with no credentials left
    CredentialsExhausted,
}

/// Accumulator state for one run, scoped to the driver loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    /// URLs accepted and marked indexed
    pub processed: u64,
    /// Successful credential rotations
    pub rotations: u64,
}

/// Final report of a run
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub counters: RunCounters,
}

/// Drives the claim/submit/mark loop over a work queue and a client
pub struct IndexingDriver<'a, S, C>
where
    S: UrlStore,
    C: Submitter,
{
    store: &'a mut S,
    client: C,
    log_every: u64,
}

impl<'a, S, C> IndexingDriver<'a, S, C>
where
    S: UrlStore,
    C: Submitter,
{
    /// Creates a driver over the queue and client. A zero progress interval
    /// is treated as 1.
    pub fn new(store: &'a mut S, client: C, log_every: u64) -> Self {
        Self {
            store,
            client,
            log_every: log_every.max(1),
        }
    }

    /// Runs the loop to completion
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run terminated gracefully, one way or the other
    /// * `Err(CourierError)` - The work queue itself failed
    pub async fn run(mut self) -> Result<RunSummary, CourierError> {
        let mut counters = RunCounters::default();
        let outcome = self.run_loop(&mut counters).await;

        // Release the session on every exit path, including store errors
        self.client.close();

        let outcome = outcome?;
        tracing::info!(
            "Run finished ({:?}): processed {} urls, {} credential rotations",
            outcome,
            counters.processed,
            counters.rotations
        );
        Ok(RunSummary { outcome, counters })
    }

    async fn run_loop(&mut self, counters: &mut RunCounters) -> Result<RunOutcome, CourierError> {
        let mut retry_url: Option<String> = None;

        loop {
            let url = match retry_url.take() {
                Some(url) => url,
                None => match self.store.claim_next()? {
                    Some(url) => url,
                    None => {
                        tracing::info!("URL queue is exhausted");
                        return Ok(RunOutcome::QueueExhausted);
                    }
                },
            };

            tracing::debug!("Submitting url: {}", url);
            match self.client.submit(&url).await {
                Ok(result) if result.status == 200 => {
                    tracing::debug!("Accepted: {}", result.body);
                    self.store.mark_indexed(&url)?;
                    counters.processed += 1;

                    if counters.processed % self.log_every == 0 {
                        tracing::info!(
                            "Processed {} urls, {} credential rotations",
                            counters.processed,
                            counters.rotations
                        );
                    }
                }
                Ok(result) if result.status == 429 => {
                    tracing::warn!("Current credential hit its rate limit, rotating");
                    if !self.rotate(counters).await {
                        return Ok(RunOutcome::CredentialsExhausted);
                    }
                    retry_url = Some(url);
                }
                Ok(result) => {
                    // Same control flow as 429, logged at higher severity
                    tracing::error!(
                        "Submission rejected: status {}, reason: {}, body: {}",
                        result.status,
                        result.reason,
                        result.body
                    );
                    tracing::info!("Rotating away from possibly corrupted session");
                    if !self.rotate(counters).await {
                        return Ok(RunOutcome::CredentialsExhausted);
                    }
                    retry_url = Some(url);
                }
                Err(CourierError::CredentialsExhausted) => {
                    // No session could be built at all
                    tracing::info!("Out of credentials before submission");
                    return Ok(RunOutcome::CredentialsExhausted);
                }
                Err(e) => {
                    // Transport and session-build failures follow the same
                    // rotate-and-retry policy as a rejected submission
                    tracing::error!("Submission failed: {}", e);
                    if !self.rotate(counters).await {
                        return Ok(RunOutcome::CredentialsExhausted);
                    }
                    retry_url = Some(url);
                }
            }
        }
    }

    /// Rotates until a usable session exists; returns false when the pool is
    /// exhausted. A credential whose session cannot be built is skipped.
    async fn rotate(&mut self, counters: &mut RunCounters) -> bool {
        loop {
            match self.client.rotate().await {
                Ok(()) => {
                    counters.rotations += 1;
                    return true;
                }
                Err(CourierError::CredentialsExhausted) => {
                    tracing::info!("Credential pool is exhausted");
                    return false;
                }
                Err(e) => {
                    tracing::error!("Failed to build session: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SubmissionResult;
    use crate::store::SqliteStore;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Scripted stand-in for the HTTP client: answers submissions from a
    /// queue of status codes and tracks a finite rotation budget.
    struct ScriptedClient {
        responses: VecDeque<ScriptedResponse>,
        rotations_left: u64,
        closed: Rc<Cell<bool>>,
        submitted: Rc<std::cell::RefCell<Vec<String>>>,
    }

    enum ScriptedResponse {
        Status(u16),
        Transport,
    }

    impl ScriptedClient {
        fn new(responses: Vec<ScriptedResponse>, spare_credentials: u64) -> Self {
            Self {
                responses: responses.into(),
                rotations_left: spare_credentials,
                closed: Rc::new(Cell::new(false)),
                submitted: Rc::new(std::cell::RefCell::new(Vec::new())),
            }
        }

        fn close_flag(&self) -> Rc<Cell<bool>> {
            Rc::clone(&self.closed)
        }

        fn submission_log(&self) -> Rc<std::cell::RefCell<Vec<String>>> {
            Rc::clone(&self.submitted)
        }
    }

    impl Submitter for ScriptedClient {
        async fn submit(&mut self, url: &str) -> Result<SubmissionResult, CourierError> {
            self.submitted.borrow_mut().push(url.to_string());
            match self.responses.pop_front() {
                Some(ScriptedResponse::Status(status)) => Ok(SubmissionResult {
                    status,
                    reason: "scripted".to_string(),
                    body: "{}".to_string(),
                }),
                Some(ScriptedResponse::Transport) => {
                    Err(CourierError::Io(std::io::Error::other("connection reset")))
                }
                None => panic!("client ran out of scripted responses"),
            }
        }

        async fn rotate(&mut self) -> Result<(), CourierError> {
            if self.rotations_left == 0 {
                return Err(CourierError::CredentialsExhausted);
            }
            self.rotations_left -= 1;
            Ok(())
        }

        fn close(&mut self) {
            self.closed.set(true);
        }
    }

    fn store_with_urls(urls: &[&str]) -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .bulk_insert(urls.iter().map(|u| u.to_string()), 100)
            .unwrap();
        store
    }

    use ScriptedResponse::{Status, Transport};

    #[tokio::test]
    async fn test_clean_run_processes_whole_queue() {
        let mut store = store_with_urls(&["https://a/", "https://b/", "https://c/"]);
        let client = ScriptedClient::new(vec![Status(200), Status(200), Status(200)], 0);
        let closed = client.close_flag();

        let summary = IndexingDriver::new(&mut store, client, 100)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::QueueExhausted);
        assert_eq!(summary.counters.processed, 3);
        assert_eq!(summary.counters.rotations, 0);
        assert!(closed.get(), "session must be released on exit");
        assert_eq!(
            store.count_by_status(crate::store::UrlStatus::SentToIndex).unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_rate_limit_rotates_and_retries_same_url() {
        // Pool of 2 credentials, queue of 3 URLs; the first credential is
        // throttled on URL #2, the second succeeds on the retry.
        let mut store = store_with_urls(&["https://a/", "https://b/", "https://c/"]);
        let client = ScriptedClient::new(
            vec![Status(200), Status(429), Status(200), Status(200)],
            1,
        );
        let log = client.submission_log();

        let summary = IndexingDriver::new(&mut store, client, 100)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::QueueExhausted);
        assert_eq!(summary.counters.processed, 3);
        assert_eq!(summary.counters.rotations, 1);
        // The throttled URL is resubmitted, not skipped
        assert_eq!(
            *log.borrow(),
            vec!["https://a/", "https://b/", "https://b/", "https://c/"]
        );
    }

    #[tokio::test]
    async fn test_server_error_with_single_credential_terminates() {
        // Pool of 1 credential, both URLs answer 500: the first rotation
        // attempt finds the pool empty and the run stops with nothing done.
        let mut store = store_with_urls(&["https://a/", "https://b/"]);
        let client = ScriptedClient::new(vec![Status(500)], 0);
        let closed = client.close_flag();

        let summary = IndexingDriver::new(&mut store, client, 100)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::CredentialsExhausted);
        assert_eq!(summary.counters.processed, 0);
        assert_eq!(summary.counters.rotations, 0);
        assert!(closed.get(), "session must be released on exit");
        assert_eq!(
            store.count_by_status(crate::store::UrlStatus::New).unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_transport_error_follows_rotate_policy() {
        let mut store = store_with_urls(&["https://a/"]);
        let client = ScriptedClient::new(vec![Transport, Status(200)], 1);

        let summary = IndexingDriver::new(&mut store, client, 100)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::QueueExhausted);
        assert_eq!(summary.counters.processed, 1);
        assert_eq!(summary.counters.rotations, 1);
    }

    #[tokio::test]
    async fn test_zero_progress_interval_is_tolerated() {
        let mut store = store_with_urls(&["https://a/"]);
        let client = ScriptedClient::new(vec![Status(200)], 0);

        let summary = IndexingDriver::new(&mut store, client, 0)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::QueueExhausted);
        assert_eq!(summary.counters.processed, 1);
    }

    #[tokio::test]
    async fn test_empty_queue_terminates_immediately() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let client = ScriptedClient::new(vec![], 5);

        let summary = IndexingDriver::new(&mut store, client, 100)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::QueueExhausted);
        assert_eq!(summary.counters.processed, 0);
    }

    #[tokio::test]
    async fn test_fully_processed_queue_is_noop_on_rerun() {
        let mut store = store_with_urls(&["https://a/"]);
        store.mark_indexed("https://a/").unwrap();

        let client = ScriptedClient::new(vec![], 0);
        let summary = IndexingDriver::new(&mut store, client, 100)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::QueueExhausted);
        assert_eq!(summary.counters.processed, 0);
    }

    #[tokio::test]
    async fn test_exhaustion_without_any_session_terminates() {
        // submit() itself reports exhaustion when the pool was empty from
        // the start
        struct NoCredentials;
        impl Submitter for NoCredentials {
            async fn submit(&mut self, _url: &str) -> Result<SubmissionResult, CourierError> {
                Err(CourierError::CredentialsExhausted)
            }
            async fn rotate(&mut self) -> Result<(), CourierError> {
                Err(CourierError::CredentialsExhausted)
            }
            fn close(&mut self) {}
        }

        let mut store = store_with_urls(&["https://a/"]);
        let summary = IndexingDriver::new(&mut store, NoCredentials, 100)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::CredentialsExhausted);
        assert_eq!(summary.counters.processed, 0);
    }
}
