//! Run configuration.
//!
//! A run is fully described by four values: the API base URI, the access token,
//! the [`Action`] to perform and the [`TargetScope`] to perform it on. They are
//! validated here, before anything talks to GitLab.
//!
//! ## Examples
//!
//! ```rust
//! use label_sync_core::{Action, RunConfig, TargetScope};
//!
//! let config = RunConfig::new("https://git.example.org/api/v4", "token", "replace", "all").unwrap();
//!
//! assert_eq!(config.base_uri.as_str(), "https://git.example.org/api/v4/");
//! assert_eq!(config.action, Action::Replace);
//! assert_eq!(config.scope, TargetScope::All);
//! ```

use gitlab_client::{normalize_base_uri, ProjectId};
use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::errors::{SyncError, SyncResult};

#[cfg(test)]
#[path = "configuration_tests.rs"]
mod tests;

/// Keyword selecting every project visible to the token.
pub const KEYWORD_ALL: &str = "all";

/// What to do to the labels of each target project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Copy the reference labels, skipping names the target already has.
    Add,

    /// Delete every label of the target.
    Delete,

    /// Delete every label of the target, then copy the reference labels.
    Replace,
}

impl Action {
    /// Whether the target's labels are deleted before anything is copied.
    pub fn deletes_labels(&self) -> bool {
        matches!(self, Action::Delete | Action::Replace)
    }

    /// Whether the reference labels are copied onto the target.
    pub fn adds_labels(&self) -> bool {
        matches!(self, Action::Add | Action::Replace)
    }

    /// The keyword selecting this action on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Delete => "delete",
            Action::Replace => "replace",
        }
    }

    fn announcement(&self) -> &'static str {
        match self {
            Action::Add => "Attempting to add labels (skipping duplicates) to",
            Action::Delete => "Attempting to delete all labels on",
            Action::Replace => "Attempting to delete and replace all labels on",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Action::Add),
            "delete" => Ok(Action::Delete),
            "replace" => Ok(Action::Replace),
            other => Err(SyncError::InvalidAction(other.to_string())),
        }
    }
}

/// The projects an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetScope {
    /// One explicitly named project.
    Single(ProjectId),

    /// Every project visible to the token, except the reference project.
    All,
}

impl fmt::Display for TargetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetScope::Single(id) => write!(f, "project id #\"{id}\""),
            TargetScope::All => f.write_str("all projects"),
        }
    }
}

impl FromStr for TargetScope {
    type Err = SyncError;

    /// Accepts `all` (case sensitive) or an integer larger than zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == KEYWORD_ALL {
            return Ok(TargetScope::All);
        }

        s.parse::<ProjectId>()
            .map(TargetScope::Single)
            .map_err(|_| SyncError::InvalidTarget(s.to_string()))
    }
}

/// Everything a run needs to know.
#[derive(Debug)]
pub struct RunConfig {
    /// API base URI, always ending with `/`.
    pub base_uri: Url,

    /// Personal access token sent with every request.
    pub token: SecretString,

    /// The action to perform.
    pub action: Action,

    /// The projects to perform it on.
    pub scope: TargetScope,
}

impl RunConfig {
    /// Validates the raw run parameters. The target is checked first, then the
    /// action, then the base URI.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidTarget` for a target that is neither `all`
    /// nor a positive integer, `SyncError::InvalidAction` for an unknown action
    /// and `SyncError::Client` wrapping `InvalidBaseUri` for an unusable base
    /// URI.
    pub fn new(base_uri: &str, token: &str, action: &str, target: &str) -> SyncResult<Self> {
        let scope = target.parse::<TargetScope>()?;
        let action = action.parse::<Action>()?;

        Ok(Self {
            base_uri: normalize_base_uri(base_uri)?,
            token: SecretString::from(token.to_string()),
            action,
            scope,
        })
    }

    /// The line announcing what the run is about to do, e.g.
    /// `Attempting to delete all labels on all projects...`.
    pub fn announcement(&self) -> String {
        format!("{} {}...", self.action.announcement(), self.scope)
    }
}
