//! The run orchestrator.
//!
//! A [`SyncRun`] drives one pass of the tool: create the reference project,
//! cache its labels, apply the action to the target scope and remove the
//! reference project again. Cleanup happens on every path once the reference
//! project exists, including after an abort.

use gitlab_client::{GitLabClient, Label, ProjectClient, ProjectId};
use tracing::{debug, error, info, instrument, warn};

use crate::configuration::{Action, RunConfig, TargetScope};
use crate::errors::SyncResult;
use crate::label_synchronizer::LabelSynchronizer;
use crate::progress::{self, ProgressObserver, PROGRESS_TOTAL};
use crate::project_walker::ProjectWalker;
use crate::reference::ReferenceProject;

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

const PROGRESS_STARTED: u64 = 1;
const PROGRESS_REFERENCE_CREATED: u64 = 20;
const PROGRESS_LABELS_CACHED: u64 = 40;
const PROGRESS_MIDWAY: u64 = 60;
const PROGRESS_APPLIED: u64 = 99;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ReferenceCreated,
    ReferenceLabelsCached,
    Applying,
    Aborting,
    Cleanup,
    Done,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every target was attempted. Individual targets may still have failed.
    Completed,

    /// The run stopped early. Carries the rendered error.
    Aborted(String),
}

/// A target that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    pub project_id: ProjectId,
    pub error: String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,

    /// Targets the action was applied to successfully, in processing order.
    pub processed: Vec<ProjectId>,

    /// Targets skipped because of an error (only under the "all" scope).
    pub failures: Vec<TargetFailure>,

    /// Set when the reference project could not be removed. Does not affect
    /// `outcome`.
    pub cleanup_error: Option<String>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            outcome: RunOutcome::Completed,
            processed: Vec::new(),
            failures: Vec::new(),
            cleanup_error: None,
        }
    }

    /// Returns true if the run was aborted.
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, RunOutcome::Aborted(_))
    }
}

/// One run of the label synchronizer.
pub struct SyncRun<'a> {
    client: &'a dyn ProjectClient,
    action: Action,
    scope: TargetScope,
    progress: &'a dyn ProgressObserver,
    reference: ReferenceProject,
    walker: ProjectWalker,
    state: RunState,
}

impl<'a> SyncRun<'a> {
    pub fn new(
        client: &'a dyn ProjectClient,
        action: Action,
        scope: TargetScope,
        progress: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            client,
            action,
            scope,
            progress,
            reference: ReferenceProject::new(),
            walker: ProjectWalker::new(),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Executes the run and reports how it went.
    ///
    /// Errors never escape: an unrecoverable error aborts the run and is
    /// recorded in the report's outcome. The reference project is removed
    /// exactly once whenever it was created.
    #[instrument(skip(self), fields(action = %self.action, scope = %self.scope))]
    pub async fn execute(&mut self) -> RunReport {
        let mut report = RunReport::new();
        self.report_progress(PROGRESS_STARTED);

        if let Err(e) = self.prepare_and_apply(&mut report).await {
            self.transition(RunState::Aborting);
            error!(error = %e, "FATAL error: {e}");
            report.outcome = RunOutcome::Aborted(e.to_string());
        }

        self.transition(RunState::Cleanup);
        if self.reference.id().is_some() {
            if let Err(e) = self.reference.destroy(self.client).await {
                warn!(error = %e, "FAILED to remove dummy project: {e}");
                report.cleanup_error = Some(e.to_string());
            }
        }

        // An aborted run stays at the last milestone it reached.
        if report.outcome == RunOutcome::Completed {
            self.report_progress(PROGRESS_TOTAL);
        }
        self.transition(RunState::Done);

        info!(
            processed = report.processed.len(),
            failed = report.failures.len(),
            aborted = report.is_aborted(),
            "Run finished"
        );
        report
    }

    async fn prepare_and_apply(&mut self, report: &mut RunReport) -> SyncResult<()> {
        let client = self.client;

        let reference_id = self.reference.create(client).await?;
        self.transition(RunState::ReferenceCreated);
        self.report_progress(PROGRESS_REFERENCE_CREATED);

        let labels = self.reference.labels(client).await?.to_vec();
        self.transition(RunState::ReferenceLabelsCached);
        self.report_progress(PROGRESS_LABELS_CACHED);

        self.transition(RunState::Applying);
        match self.scope {
            TargetScope::Single(project_id) => self.apply_single(project_id, &labels, report).await,
            TargetScope::All => self.apply_all(reference_id, &labels, report).await,
        }
    }

    /// A single explicit target has no batch to protect, so its errors abort
    /// the run.
    async fn apply_single(
        &mut self,
        project_id: ProjectId,
        labels: &[Label],
        report: &mut RunReport,
    ) -> SyncResult<()> {
        let synchronizer = LabelSynchronizer::new(self.client);

        if self.action.deletes_labels() {
            synchronizer.delete_all_labels(project_id).await?;
        }
        self.report_progress(PROGRESS_MIDWAY);

        if self.action.adds_labels() {
            synchronizer
                .copy_reference_labels(project_id, labels, false)
                .await?;
        }
        self.report_progress(PROGRESS_APPLIED);

        report.processed.push(project_id);
        Ok(())
    }

    async fn apply_all(
        &mut self,
        reference_id: ProjectId,
        labels: &[Label],
        report: &mut RunReport,
    ) -> SyncResult<()> {
        let targets = self
            .walker
            .all_project_ids(self.client, Some(reference_id))
            .await?;
        self.report_progress(PROGRESS_MIDWAY);

        if targets.is_empty() {
            info!("No projects visible to the token");
            self.report_progress(PROGRESS_APPLIED);
            return Ok(());
        }

        let synchronizer = LabelSynchronizer::new(self.client);
        for (index, project_id) in targets.iter().copied().enumerate() {
            match synchronizer.apply(project_id, self.action, labels).await {
                Ok(summary) => {
                    debug!(project_id = %project_id, ?summary, "Processed project");
                    report.processed.push(project_id);
                }
                Err(e) => {
                    warn!(project_id = %project_id, error = %e, "FAILURE for #\"{project_id}\": ({e})");
                    report.failures.push(TargetFailure {
                        project_id,
                        error: e.to_string(),
                    });
                }
            }

            self.report_progress(progress::per_target(index + 1, targets.len()));
        }

        Ok(())
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Run state change");
        self.state = next;
    }

    fn report_progress(&self, completed: u64) {
        self.progress.on_progress(completed, PROGRESS_TOTAL);
    }
}

/// Runs the configured action against a live GitLab instance.
///
/// # Errors
///
/// Returns `SyncError::Client` only if the HTTP client cannot be set up. Every
/// later failure is reported through the returned [`RunReport`].
pub async fn run(config: &RunConfig, progress: &dyn ProgressObserver) -> SyncResult<RunReport> {
    let client = GitLabClient::new(config.base_uri.as_str(), &config.token)?;

    let mut sync_run = SyncRun::new(&client, config.action, config.scope, progress);
    Ok(sync_run.execute().await)
}
