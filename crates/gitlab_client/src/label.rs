//! Label domain types.
//!
//! This module contains the label record shared by every project on a GitLab
//! instance: a name that is unique within its project, a color and an optional
//! description.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "label_tests.rs"]
mod tests;

/// Represents a label defined on a GitLab project.
///
/// Labels are compared by name when deciding whether a project already carries
/// one; color and description are copied verbatim.
///
/// # Examples
///
/// ```
/// use gitlab_client::Label;
///
/// let label = Label::new("bug", "#d9534f", Some("Something isn't working"));
/// assert_eq!(label.name, "bug");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// The name of the label
    pub name: String,

    /// The label color, e.g. `#d9534f`
    pub color: String,

    /// The label description; GitLab returns `null` when none is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Label {
    /// Creates a label from its parts.
    pub fn new(name: &str, color: &str, description: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            description: description.map(str::to_string),
        }
    }

    /// Query parameters used when creating this label on a project.
    pub(crate) fn as_query(&self) -> Vec<(&'static str, &str)> {
        let mut query = vec![("name", self.name.as_str()), ("color", self.color.as_str())];
        if let Some(description) = &self.description {
            query.push(("description", description.as_str()));
        }
        query
    }
}
