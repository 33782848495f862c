//! Error types for label synchronization.
//!
//! Remote failures arrive wrapped in [`SyncError::Client`] after the client's
//! own retries are exhausted. Misuse of the reference project lifecycle and
//! invalid run configuration are reported as their own variants; they never
//! involve a network call.

use gitlab_client::ProjectId;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Result alias used throughout this crate.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while synchronizing labels.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A GitLab request failed for good.
    #[error("GitLab request failed: {0}")]
    Client(#[from] gitlab_client::Error),

    /// A reference project was created while another one still exists.
    #[error("A reference project already exists (project id {0})")]
    ReferenceAlreadyExists(ProjectId),

    /// The reference project was used before it was created, or after it was
    /// destroyed.
    #[error("No reference project has been created")]
    NoReferenceProject,

    /// The requested action is not one of `add`, `delete` or `replace`.
    #[error("Unrecognized action \"{0}\"")]
    InvalidAction(String),

    /// The target is neither `all` nor a positive integer.
    #[error("Invalid target \"{0}\": expected \"all\" or an integer larger than 0")]
    InvalidTarget(String),
}

impl SyncError {
    /// Returns true for errors caused by calling the engine out of order.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            SyncError::ReferenceAlreadyExists(_) | SyncError::NoReferenceProject
        )
    }
}
