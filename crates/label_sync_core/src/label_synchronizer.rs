//! Label operations against a single target project.
//!
//! This module provides the [`LabelSynchronizer`] component, which implements
//! the primitives (list, delete all, copy the reference labels) and maps each
//! [`Action`] onto them.

use gitlab_client::{Label, ProjectClient, ProjectId};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

use crate::configuration::Action;
use crate::errors::SyncResult;

#[cfg(test)]
#[path = "label_synchronizer_tests.rs"]
mod tests;

/// Applies label operations to target projects.
///
/// Requests are issued one at a time, in label order. The first request that
/// fails for good stops the operation and its error is returned; labels
/// handled before that point stay handled.
///
/// # Examples
///
/// ```rust,no_run
/// use gitlab_client::{GitLabClient, Label, ProjectId};
/// use label_sync_core::{Action, LabelSynchronizer};
///
/// # async fn example(client: GitLabClient) -> Result<(), Box<dyn std::error::Error>> {
/// let synchronizer = LabelSynchronizer::new(&client);
/// let reference = vec![Label::new("bug", "#d73a4a", Some("Something isn't working"))];
///
/// let summary = synchronizer
///     .apply(ProjectId::new(42).unwrap(), Action::Replace, &reference)
///     .await?;
/// println!("Deleted: {}, Created: {}", summary.deleted, summary.created);
/// # Ok(())
/// # }
/// ```
pub struct LabelSynchronizer<'a> {
    client: &'a dyn ProjectClient,
}

impl<'a> LabelSynchronizer<'a> {
    pub fn new(client: &'a dyn ProjectClient) -> Self {
        Self { client }
    }

    /// Lists the labels of a project. At most 100 labels are returned; larger
    /// label sets are not supported.
    pub async fn list_labels(&self, project_id: ProjectId) -> SyncResult<Vec<Label>> {
        Ok(self.client.list_labels(project_id).await?)
    }

    /// Deletes every label of a project and returns how many were deleted.
    ///
    /// A label that disappears between listing and deleting is not an error.
    #[instrument(skip(self))]
    pub async fn delete_all_labels(&self, project_id: ProjectId) -> SyncResult<usize> {
        let labels = self.list_labels(project_id).await?;

        for label in &labels {
            debug!(project_id = %project_id, label = %label.name, "Deleting label");
            self.client.delete_label(project_id, &label.name).await?;
        }

        info!(project_id = %project_id, deleted = labels.len(), "Deleted labels");
        Ok(labels.len())
    }

    /// Creates the reference labels on a project.
    ///
    /// Unless `allow_duplicates` is set, the target's labels are listed first
    /// and reference labels whose name is already present are skipped, so
    /// running this twice never creates the same name twice.
    #[instrument(skip(self, reference), fields(reference_count = reference.len()))]
    pub async fn copy_reference_labels(
        &self,
        project_id: ProjectId,
        reference: &[Label],
        allow_duplicates: bool,
    ) -> SyncResult<CopySummary> {
        let existing: HashSet<String> = if allow_duplicates {
            HashSet::new()
        } else {
            self.list_labels(project_id)
                .await?
                .into_iter()
                .map(|label| label.name)
                .collect()
        };

        let mut summary = CopySummary::default();
        for label in reference {
            if existing.contains(&label.name) {
                debug!(project_id = %project_id, label = %label.name, "Label already present");
                summary.skipped += 1;
                continue;
            }

            debug!(project_id = %project_id, label = %label.name, "Creating label");
            self.client.create_label(project_id, label).await?;
            summary.created += 1;
        }

        info!(
            project_id = %project_id,
            created = summary.created,
            skipped = summary.skipped,
            "Copied reference labels"
        );
        Ok(summary)
    }

    /// Performs `action` on one project: `add` copies, `delete` deletes,
    /// `replace` deletes and then copies.
    pub async fn apply(
        &self,
        project_id: ProjectId,
        action: Action,
        reference: &[Label],
    ) -> SyncResult<SyncSummary> {
        let mut summary = SyncSummary::default();

        if action.deletes_labels() {
            summary.deleted = self.delete_all_labels(project_id).await?;
        }

        if action.adds_labels() {
            let copied = self
                .copy_reference_labels(project_id, reference, false)
                .await?;
            summary.created = copied.created;
            summary.skipped = copied.skipped;
        }

        Ok(summary)
    }
}

/// Result of copying reference labels onto one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    /// Labels created on the target.
    pub created: usize,

    /// Reference labels skipped because the target already had the name.
    pub skipped: usize,
}

/// Result of applying an action to one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Labels deleted from the target.
    pub deleted: usize,

    /// Labels created on the target.
    pub created: usize,

    /// Reference labels skipped because the target already had the name.
    pub skipped: usize,
}

impl SyncSummary {
    /// Returns true if the target was modified.
    pub fn has_changes(&self) -> bool {
        self.deleted > 0 || self.created > 0
    }
}
