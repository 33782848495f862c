//! The reference project.
//!
//! GitLab only materializes the instance-wide default labels when a project is
//! created. A throwaway private project is therefore created at the start of a
//! run, its labels are read once and used as the canonical label set, and the
//! project is deleted again at the end of the run.

use chrono::{DateTime, SecondsFormat, Utc};
use gitlab_client::{Label, ProjectClient, ProjectCreatePayload, ProjectId};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::errors::{SyncError, SyncResult};

#[cfg(test)]
#[path = "reference_tests.rs"]
mod tests;

/// Prefix of every reference project name.
pub const REFERENCE_NAME_PREFIX: &str = "deleteme-";

/// Lifecycle of the reference project within one run.
///
/// `id` is `None` until [`create`](Self::create) succeeds and again after
/// [`destroy`](Self::destroy). The label cache is tied to the project and is
/// dropped together with it.
#[derive(Debug, Default)]
pub struct ReferenceProject {
    id: Option<ProjectId>,
    labels: Option<Vec<Label>>,
}

impl ReferenceProject {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of the live reference project, if there is one.
    pub fn id(&self) -> Option<ProjectId> {
        self.id
    }

    /// Builds a project name that does not collide with earlier runs:
    /// `deleteme-` followed by the hex SHA-256 digest of the timestamp.
    pub fn unique_name(now: DateTime<Utc>) -> String {
        let stamp = now.to_rfc3339_opts(SecondsFormat::Nanos, true);
        let digest = Sha256::digest(stamp.as_bytes());
        format!("{REFERENCE_NAME_PREFIX}{}", hex::encode(digest))
    }

    /// Creates the reference project.
    ///
    /// # Errors
    ///
    /// * `SyncError::ReferenceAlreadyExists` if a reference project is still
    ///   alive. No request is made in that case.
    /// * `SyncError::Client` if GitLab refuses to create the project.
    #[instrument(skip(self, client))]
    pub async fn create(&mut self, client: &dyn ProjectClient) -> SyncResult<ProjectId> {
        if let Some(existing) = self.id {
            return Err(SyncError::ReferenceAlreadyExists(existing));
        }

        let payload = ProjectCreatePayload::private(&Self::unique_name(Utc::now()));
        let project = client.create_project(&payload).await?;

        info!(project_id = %project.id, name = %payload.name, "Created reference project");

        self.id = Some(project.id);
        self.labels = None;
        Ok(project.id)
    }

    /// Returns the reference labels, fetching them on first use.
    ///
    /// # Errors
    ///
    /// * `SyncError::NoReferenceProject` if there is no live reference project.
    /// * `SyncError::Client` if the labels cannot be listed.
    #[instrument(skip(self, client))]
    pub async fn labels(&mut self, client: &dyn ProjectClient) -> SyncResult<&[Label]> {
        let id = self.id.ok_or(SyncError::NoReferenceProject)?;

        let labels = match self.labels.take() {
            Some(cached) => cached,
            None => {
                let fetched = client.list_labels(id).await?;
                info!(project_id = %id, count = fetched.len(), "Cached reference labels");
                fetched
            }
        };

        Ok(self.labels.insert(labels).as_slice())
    }

    /// Deletes the reference project.
    ///
    /// The stored id is cleared before the request is sent, so a failed delete
    /// is never retried by a second call.
    ///
    /// # Errors
    ///
    /// * `SyncError::NoReferenceProject` if there is no live reference project.
    ///   No request is made in that case.
    /// * `SyncError::Client` if GitLab refuses to delete the project.
    #[instrument(skip(self, client))]
    pub async fn destroy(&mut self, client: &dyn ProjectClient) -> SyncResult<()> {
        let id = self.id.take().ok_or(SyncError::NoReferenceProject)?;
        self.labels = None;

        client.delete_project(id).await?;

        info!(project_id = %id, "Removed reference project");
        Ok(())
    }
}
