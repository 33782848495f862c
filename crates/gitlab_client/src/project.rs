//! Project domain types.
//!
//! This module contains the types representing GitLab projects: the numeric
//! project identifier, the project record returned by listing and creation
//! endpoints, and the payload used to create a new project.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;

/// Identifier GitLab assigns to a project.
///
/// Project identifiers are always strictly positive; zero is rejected on
/// construction and when parsing.
///
/// # Examples
///
/// ```rust
/// use gitlab_client::ProjectId;
///
/// let id: ProjectId = "42".parse().unwrap();
/// assert_eq!(id.get(), 42);
/// assert!("0".parse::<ProjectId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ProjectId(u64);

impl ProjectId {
    /// Creates a project identifier, returning `None` for zero.
    pub fn new(id: u64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    /// Returns the raw numeric identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for ProjectId {
    type Error = ParseProjectIdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        ProjectId::new(value).ok_or_else(|| ParseProjectIdError(value.to_string()))
    }
}

impl From<ProjectId> for u64 {
    fn from(value: ProjectId) -> Self {
        value.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a positive integer project identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a positive integer project id")]
pub struct ParseProjectIdError(pub String);

impl FromStr for ProjectId {
    type Err = ParseProjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .ok()
            .and_then(ProjectId::new)
            .ok_or_else(|| ParseProjectIdError(s.to_string()))
    }
}

/// Represents a GitLab project as returned by the `simple` project listing and
/// by project creation.
///
/// Only the fields the label tooling needs are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    /// The project identifier
    pub id: ProjectId,

    /// The project name
    #[serde(default)]
    pub name: String,

    /// The namespaced path, e.g. `group/project`
    #[serde(default)]
    pub path_with_namespace: Option<String>,
}

/// Visibility level of a GitLab project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

/// Represents the payload for creating a new project via the REST API.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectCreatePayload {
    pub name: String,

    pub visibility: Visibility,

    /// Issues must be enabled for GitLab to seed the instance default labels.
    pub issues_enabled: bool,
}

impl ProjectCreatePayload {
    /// Payload for a private project with issues enabled.
    pub fn private(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visibility: Visibility::Private,
            issues_enabled: true,
        }
    }
}
