use std::process::ExitCode;

use label_sync_cli::commands;
use label_sync_cli::config::{parse_invocation, Invocation, DEFAULT_LOG_FILTER, LOG_ENV_VAR};
use label_sync_cli::errors::EXIT_ABORTED;
use label_sync_cli::progress::{new_bar, BarWriter};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let bar = match new_bar() {
        Ok(bar) => bar,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_ABORTED);
        }
    };

    // Initialize logging; lines are printed above the progress bar
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(BarWriter::new(bar.clone())))
        .with(
            EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = match parse_invocation(std::env::args_os()) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Version(version)) => {
            print!("{version}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            commands::report_usage_error(&e);
            return ExitCode::from(e.exit_code());
        }
    };

    match commands::execute(&config, bar).await {
        Ok(report) => ExitCode::from(commands::report(&report)),
        Err(e) => {
            error!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
