//! Mock identity provider for testing.
//!
//! Scripted outcomes, call recording, and an optional artificial latency
//! so tests with a paused tokio clock can hold a check in flight while
//! concurrent callers pile up behind it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::traits::{IdentityError, IdentityProvider};
use crate::SessionUser;

/// One scripted identity-check outcome.
pub type MockOutcome = Result<SessionUser, IdentityError>;

/// Configurable mock implementation of [`IdentityProvider`].
///
/// Outcomes queued with [`push_ok`](Self::push_ok) /
/// [`push_err`](Self::push_err) are consumed in order; once the queue is
/// empty the default outcome repeats. Every call is counted and
/// timestamped so tests can assert the coalescing and scheduling
/// invariants.
#[derive(Debug, Clone)]
pub struct MockIdentityClient {
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    default_outcome: Arc<Mutex<MockOutcome>>,
    latency: Arc<Mutex<Option<Duration>>>,
    call_times: Arc<Mutex<Vec<tokio::time::Instant>>>,
}

impl MockIdentityClient {
    /// Create a mock whose default outcome is an opaque transport error.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            default_outcome: Arc::new(Mutex::new(Err(IdentityError::Other(
                "no scripted outcome".to_string(),
            )))),
            latency: Arc::new(Mutex::new(None)),
            call_times: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always reports the given user signed in.
    pub fn always_user(user: SessionUser) -> Self {
        let mock = Self::new();
        mock.set_default(Ok(user));
        mock
    }

    /// Create a mock that always reports the given error.
    pub fn always_err(err: IdentityError) -> Self {
        let mock = Self::new();
        mock.set_default(Err(err));
        mock
    }

    /// Queue a successful outcome.
    pub fn push_ok(&self, user: SessionUser) {
        self.script.lock().unwrap().push_back(Ok(user));
    }

    /// Queue a failure outcome.
    pub fn push_err(&self, err: IdentityError) {
        self.script.lock().unwrap().push_back(Err(err));
    }

    /// Set the outcome used once the script queue is exhausted.
    pub fn set_default(&self, outcome: MockOutcome) {
        *self.default_outcome.lock().unwrap() = outcome;
    }

    /// Delay every check by `latency` before it resolves. With a paused
    /// tokio clock this holds the check in flight until the test advances
    /// time.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Number of identity checks performed.
    pub fn call_count(&self) -> usize {
        self.call_times.lock().unwrap().len()
    }

    /// Instants at which each identity check started.
    pub fn call_times(&self) -> Vec<tokio::time::Instant> {
        self.call_times.lock().unwrap().clone()
    }

    fn next_outcome(&self) -> MockOutcome {
        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            return outcome;
        }
        self.default_outcome.lock().unwrap().clone()
    }
}

impl Default for MockIdentityClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityClient {
    async fn who_am_i(&self) -> Result<SessionUser, IdentityError> {
        self.call_times.lock().unwrap().push(tokio::time::Instant::now());

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.next_outcome()
    }
}
