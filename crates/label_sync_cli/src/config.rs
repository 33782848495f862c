//! Command-line configuration for gitlab-fix-labels.
//!
//! The tool takes exactly four positional arguments. They are parsed with
//! clap and validated into a [`RunConfig`] before anything is sent to GitLab.

use clap::error::ErrorKind;
use clap::Parser;
use label_sync_core::RunConfig;
use std::ffi::OsString;

use crate::errors::Error;

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "LABEL_SYNC_LOG";

/// Filter used when [`LOG_ENV_VAR`] is not set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// gitlab-fix-labels: copy GitLab's global admin labels into projects
#[derive(Parser)]
#[command(name = "gitlab-fix-labels", version, arg_required_else_help = true)]
#[command(about = "Copy GitLab's global admin labels into projects", long_about = None)]
pub struct Cli {
    /// GitLab API start point, e.g. https://git.example.org/api/v4
    pub api_base_uri: String,

    /// Personal access token sent as the PRIVATE-TOKEN header
    pub auth_token: String,

    /// One of add, delete or replace
    pub action: String,

    /// "all", or the id of a single project
    #[arg(allow_hyphen_values = true)]
    pub target: String,
}

/// What the command line asked for.
pub enum Invocation {
    /// Run with the validated configuration.
    Run(RunConfig),

    /// Print the version and exit.
    Version(String),
}

impl Cli {
    /// Validates the arguments.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnrecognizedAction` for an unknown action and
    /// `Error::Usage` for any other invalid argument.
    pub fn run_config(&self) -> Result<RunConfig, Error> {
        RunConfig::new(
            &self.api_base_uri,
            &self.auth_token,
            &self.action,
            &self.target,
        )
        .map_err(Error::from_config)
    }
}

/// Parses and validates the command line.
///
/// # Errors
///
/// Returns `Error::Usage` when clap rejects the arguments (including no
/// arguments at all and `--help`), plus the errors of [`Cli::run_config`].
pub fn parse_invocation<I, T>(args: I) -> Result<Invocation, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            return Ok(Invocation::Version(e.render().to_string()))
        }
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            return Err(Error::Usage(None))
        }
        Err(e) => {
            let diagnostic = e.kind().as_str().unwrap_or("unexpected arguments");
            return Err(Error::Usage(Some(diagnostic.to_string())));
        }
    };

    cli.run_config().map(Invocation::Run)
}
