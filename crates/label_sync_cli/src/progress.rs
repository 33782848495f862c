//! Console progress bar and the log writer that prints above it.

use indicatif::{ProgressBar, ProgressStyle};
use label_sync_core::ProgressObserver;
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

use crate::errors::Error;

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;

/// Redraw interval of the progress bar.
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

const TEMPLATE: &str = "[{bar:40}] {percent}% ({elapsed} elapsed)";

/// Creates the progress bar. Nothing is drawn until it is started.
pub fn new_bar() -> Result<ProgressBar, Error> {
    let style = ProgressStyle::with_template(TEMPLATE)
        .map_err(|e| Error::Runtime(format!("Invalid progress template: {e}")))?
        .progress_chars("= ");

    let bar = ProgressBar::new(label_sync_core::PROGRESS_TOTAL);
    bar.set_style(style);
    Ok(bar)
}

/// Renders run progress on a progress bar.
///
/// The bar is redrawn on a fixed tick while the run is going. The tick stops
/// when the bar is finished, and at the latest when this value is dropped.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    /// Starts drawing `bar`.
    pub fn start(bar: ProgressBar) -> Self {
        bar.reset_elapsed();
        bar.enable_steady_tick(TICK_INTERVAL);
        Self { bar }
    }

    /// Stops the bar. A completed run leaves a full bar behind; an aborted
    /// run leaves the bar where it stopped.
    pub fn finish(self, completed: bool) {
        if completed {
            self.bar.finish();
        } else {
            self.bar.abandon();
        }
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&self, completed: u64, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(completed);
    }
}

impl Drop for ConsoleProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

/// Log writer that hides the progress bar while a line is written, so log
/// lines appear above the bar instead of being drawn over.
#[derive(Clone)]
pub struct BarWriter {
    bar: ProgressBar,
}

impl BarWriter {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Write for BarWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for BarWriter {
    type Writer = BarWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
