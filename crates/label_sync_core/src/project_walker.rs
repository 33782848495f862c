//! Resolution of the "all projects" target scope.

use gitlab_client::{ProjectClient, ProjectId};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

use crate::errors::SyncResult;

#[cfg(test)]
#[path = "project_walker_tests.rs"]
mod tests;

/// Walks the paginated project listing and caches the result for the run.
///
/// Pages are requested from 1 upwards until a page contributes no id that has
/// not been seen before. Ids keep the order the server returned them in.
#[derive(Debug, Default)]
pub struct ProjectWalker {
    ids: Option<Vec<ProjectId>>,
}

impl ProjectWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids of every project visible to the token, without
    /// duplicates and without `exclude`.
    ///
    /// Only the first call talks to GitLab; later calls return the cached list
    /// and ignore `exclude`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Client` if a page cannot be fetched. Nothing is
    /// cached in that case.
    #[instrument(skip(self, client))]
    pub async fn all_project_ids(
        &mut self,
        client: &dyn ProjectClient,
        exclude: Option<ProjectId>,
    ) -> SyncResult<Vec<ProjectId>> {
        if let Some(ids) = &self.ids {
            return Ok(ids.clone());
        }

        let ids = walk(client, exclude).await?;
        info!(count = ids.len(), "Resolved target projects");

        self.ids = Some(ids.clone());
        Ok(ids)
    }
}

async fn walk(client: &dyn ProjectClient, exclude: Option<ProjectId>) -> SyncResult<Vec<ProjectId>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut page = 1;

    loop {
        let projects = client.list_projects(page).await?;

        let before = ids.len();
        for project in projects {
            if Some(project.id) != exclude && seen.insert(project.id) {
                ids.push(project.id);
            }
        }

        let added = ids.len() - before;
        debug!(page, added, "Fetched project page");

        if added == 0 {
            return Ok(ids);
        }
        page += 1;
    }
}
