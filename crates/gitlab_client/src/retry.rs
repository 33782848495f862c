//! Bounded retry with linear backoff and fault classification.
//!
//! A request goes through [`execute`], which waits for the current backoff
//! delay, sends the request, and hands the result to [`attempt`]. `attempt` is
//! a pure function: it decides from the failure classification, the request
//! method and the retry state whether the call succeeded, failed benignly,
//! should be retried, or is fatal. `execute` only carries out that decision.
//!
//! Two failure classes are tolerated instead of retried:
//!
//! - "label not found": the label is already gone. GitLab also tends to answer
//!   these requests with more bytes than it advertised, so the first sighting
//!   arms the run-wide [`OverrunGuard`].
//! - a malformed response body on a `DELETE` once the guard is armed.

use reqwest::Method;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;

use crate::errors::{Error, FailureKind};

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Default backoff step; also the delay before the first attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt before a failure is fatal.
    pub limit: u32,

    /// Initial delay and linear increment applied after every failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RETRY_LIMIT,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

/// Per-request retry bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Consecutive failures observed so far.
    pub failures: u32,

    /// Delay to wait before the next attempt.
    pub delay: Duration,
}

impl RetryState {
    /// State before the first attempt of a request.
    pub fn initial(policy: &RetryPolicy) -> Self {
        Self {
            failures: 0,
            delay: policy.base_delay,
        }
    }
}

/// Decision taken after one attempt.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The request succeeded with a payload.
    Success(T),

    /// The request failed benignly and counts as done, without a payload.
    Tolerated {
        /// Whether the failure arms the [`OverrunGuard`].
        arm_overrun_guard: bool,
    },

    /// The request should be sent again with the new state.
    Retry(RetryState),

    /// The request failed for good.
    Fatal(Error),
}

/// Run-wide, one-way switch that makes malformed `DELETE` responses count as
/// success once GitLab has shown it sends them.
#[derive(Debug, Default)]
pub struct OverrunGuard {
    armed: AtomicBool,
}

impl OverrunGuard {
    /// Creates a guard that is not armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the guard has been armed.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Relaxed)
    }

    /// Arms the guard. There is no way to disarm it.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Relaxed);
    }
}

/// Classifies the result of one attempt.
///
/// `overrun_ignored` is the state of the [`OverrunGuard`] when the attempt was
/// made.
pub fn attempt<T>(
    result: Result<T, Error>,
    method: &Method,
    state: RetryState,
    policy: &RetryPolicy,
    overrun_ignored: bool,
) -> Outcome<T> {
    let error = match result {
        Ok(value) => return Outcome::Success(value),
        Err(e) => e,
    };

    match error.kind() {
        FailureKind::ParseOverrun if overrun_ignored && *method == Method::DELETE => {
            Outcome::Tolerated {
                arm_overrun_guard: false,
            }
        }
        FailureKind::LabelNotFound => Outcome::Tolerated {
            arm_overrun_guard: true,
        },
        _ => {
            let failures = state.failures + 1;
            if failures > policy.limit {
                Outcome::Fatal(error)
            } else {
                Outcome::Retry(RetryState {
                    failures,
                    delay: state.delay + policy.base_delay,
                })
            }
        }
    }
}

/// Drives `send` until [`attempt`] reaches a final decision.
///
/// Waits for the current backoff delay before every attempt, including the
/// first. Returns `Ok(None)` when the request was tolerated.
pub async fn execute<T, F, Fut>(
    policy: &RetryPolicy,
    guard: &OverrunGuard,
    method: &Method,
    mut send: F,
) -> Result<Option<T>, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut state = RetryState::initial(policy);

    loop {
        tokio::time::sleep(state.delay).await;

        match attempt(send().await, method, state, policy, guard.is_armed()) {
            Outcome::Success(value) => return Ok(Some(value)),
            Outcome::Tolerated { arm_overrun_guard } => {
                if arm_overrun_guard {
                    warn!(
                        method = %method,
                        "IGNORING parse errors on DELETE. GitLab returned more data than it \
                         advertised for the previous request; this is ignored for the \
                         remainder of the run"
                    );
                    guard.arm();
                }
                return Ok(None);
            }
            Outcome::Retry(next) => {
                warn!(
                    method = %method,
                    attempt = next.failures,
                    delay_ms = next.delay.as_millis() as u64,
                    "RETRYING failed request in {}ms...",
                    next.delay.as_millis()
                );
                state = next;
            }
            Outcome::Fatal(e) => return Err(e),
        }
    }
}
