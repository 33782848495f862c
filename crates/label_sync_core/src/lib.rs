//! # Label Sync Core
//!
//! This crate provides the synchronization engine behind `gitlab-fix-labels`, a
//! tool that brings the labels of GitLab projects in line with the instance's
//! default label set.
//!
//! ## Overview
//!
//! A run is a single pass over the target projects:
//! 1. A throwaway private reference project is created. GitLab populates it
//!    with the instance default labels.
//! 2. The reference project's labels are fetched once and cached.
//! 3. The target scope (one project, or every visible project) is resolved.
//! 4. The requested [`Action`] is applied to every target, one at a time.
//! 5. The reference project is deleted again, whether or not the run succeeded.
//!
//! ## Main Entry Points
//!
//! - [`RunConfig`] - Validated run parameters
//! - [`run`] - Execute a run against a live GitLab instance
//! - [`SyncRun`] - Execute a run against any [`gitlab_client::ProjectClient`]
//! - [`RunReport`] - What happened during the run
//!
//! ## Examples
//!
//! ```no_run
//! use label_sync_core::{run, NoProgress, RunConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::new("https://git.example.org/api/v4", "my-token", "add", "all")?;
//!
//! let report = run(&config, &NoProgress).await?;
//! if report.is_aborted() {
//!     eprintln!("Run aborted");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Engine operations return [`SyncResult`]. A failure on one target under the
//! "all" scope is recorded in the [`RunReport`] and the batch continues; any
//! other failure aborts the run after cleanup.

pub mod configuration;
pub use configuration::{Action, RunConfig, TargetScope};

mod errors;
pub use errors::{SyncError, SyncResult};

pub mod label_synchronizer;
pub use label_synchronizer::{CopySummary, LabelSynchronizer, SyncSummary};

pub mod orchestrator;
pub use orchestrator::{run, RunOutcome, RunReport, RunState, SyncRun, TargetFailure};

pub mod progress;
pub use progress::{NoProgress, ProgressObserver, PROGRESS_TOTAL};

pub mod project_walker;
pub use project_walker::ProjectWalker;

pub mod reference;
pub use reference::ReferenceProject;

#[cfg(test)]
mod test_support;
