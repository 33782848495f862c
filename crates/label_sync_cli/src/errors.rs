use label_sync_core::SyncError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Exit code of a run that finished, even if some targets failed.
pub const EXIT_DONE: u8 = 0;

/// Exit code of a run that was aborted.
pub const EXIT_ABORTED: u8 = 1;

/// Exit code for invalid arguments. Nothing was sent to GitLab.
pub const EXIT_USAGE: u8 = 2;

/// Errors that can occur in the gitlab-fix-labels CLI.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid command-line arguments were provided.
    ///
    /// Carries a diagnostic when there is more to say than the usage text.
    #[error("Invalid arguments{}", .0.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Usage(Option<String>),

    /// The action is not one the tool knows.
    #[error("Unrecognized action \"{0}\"")]
    UnrecognizedAction(String),

    /// The run could not be started.
    #[error("{0}")]
    Sync(#[from] SyncError),

    /// The terminal output could not be set up.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Maps a configuration error onto the matching usage error.
    pub fn from_config(err: SyncError) -> Self {
        match err {
            SyncError::InvalidAction(action) => Error::UnrecognizedAction(action),
            other @ (SyncError::InvalidTarget(_) | SyncError::Client(_)) => {
                Error::Usage(Some(other.to_string()))
            }
            other => Error::Sync(other),
        }
    }

    /// The process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage(_) | Error::UnrecognizedAction(_) => EXIT_USAGE,
            Error::Sync(_) | Error::Runtime(_) => EXIT_ABORTED,
        }
    }
}
