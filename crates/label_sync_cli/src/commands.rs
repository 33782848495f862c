//! Executes a validated invocation and reports the result on the console.

use colored::Colorize;
use indicatif::ProgressBar;
use label_sync_core::{RunConfig, RunOutcome, RunReport};
use tracing::info;

use crate::errors::{Error, EXIT_ABORTED, EXIT_DONE};
use crate::progress::ConsoleProgress;

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

/// Runs the configured action, drawing progress on `bar`.
///
/// # Errors
///
/// Returns `Error::Sync` if the run could not be started at all.
pub async fn execute(config: &RunConfig, bar: ProgressBar) -> Result<RunReport, Error> {
    let announcement = config.announcement();
    info!("{announcement}");
    println!("{announcement}");

    let progress = ConsoleProgress::start(bar);
    let result = label_sync_core::run(config, &progress).await;

    let completed = matches!(&result, Ok(report) if !report.is_aborted());
    progress.finish(completed);

    Ok(result?)
}

/// Prints the closing lines for a finished run and returns the exit code.
pub fn report(report: &RunReport) -> u8 {
    if !report.failures.is_empty() {
        eprintln!(
            "{}",
            format!("{} project(s) could not be updated:", report.failures.len()).yellow()
        );
        for failure in &report.failures {
            eprintln!("  #{}: {}", failure.project_id, failure.error);
        }
    }

    if let Some(cleanup_error) = &report.cleanup_error {
        eprintln!(
            "{} {cleanup_error}",
            "Could not remove the dummy project:".yellow()
        );
    }

    match &report.outcome {
        RunOutcome::Completed => {
            println!("{}", "Done!".green());
            EXIT_DONE
        }
        RunOutcome::Aborted(_) => {
            println!("(removed dummy project)");
            EXIT_ABORTED
        }
    }
}

/// Prints a usage error: the usage text, with the diagnostic (if any) after it.
/// An unrecognized action is reported both above and below the usage text.
pub fn report_usage_error(error: &Error) {
    match error {
        Error::UnrecognizedAction(_) => {
            eprintln!("{} {error}", "ERROR:".red());
            println!("{}", crate::usage::USAGE);
            eprintln!("{} {error}", "ERROR:".red());
        }
        Error::Usage(Some(diagnostic)) => {
            println!("{}", crate::usage::USAGE);
            eprintln!("{} {diagnostic}", "ERROR:".red());
        }
        _ => println!("{}", crate::usage::USAGE),
    }
}
