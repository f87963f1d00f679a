//! Progress display for dependency analysis
//!
//! Shows which package is being checked while registry, changelog and
//! classifier calls are in flight. Draws to stderr using indicatif.
//!
//! Log lines share stderr with the bar, so [`LogWriter`] hides the active
//! bar while a line is written.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Bar currently drawing on stderr, if any
static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn set_active(bar: Option<ProgressBar>) {
    *ACTIVE_BAR.lock().unwrap_or_else(PoisonError::into_inner) = bar;
}

fn active() -> Option<ProgressBar> {
    ACTIVE_BAR
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Stderr writer for the tracing subscriber that keeps the bar intact
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let write_line = || io::stderr().write_all(buf);
        match active() {
            Some(bar) => bar.suspend(write_line)?,
            None => write_line()?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Progress reporter for the analysis stage
pub struct Progress {
    /// Whether progress display is enabled (disabled in quiet and JSON modes)
    enabled: bool,
    /// Current progress bar
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Start a progress bar for a known number of packages
    pub fn start(&mut self, total: u64, message: &str) {
        if !self.enabled || total == 0 {
            return;
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .expect("Invalid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                .progress_chars("█▓▒░"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        set_active(Some(bar.clone()));
        self.bar = Some(bar);
    }

    /// Increment progress by one package
    pub fn inc(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    /// Update the message
    pub fn set_message(&self, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Finish and clear the current progress bar
    pub fn finish_and_clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
            set_active(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_disabled() {
        let mut progress = Progress::new(false);
        progress.start(10, "Checking dependencies");
        assert!(progress.bar.is_none());
        progress.inc();
        progress.set_message("Checking react");
        progress.finish_and_clear();
    }

    #[test]
    fn test_progress_empty_manifest_draws_nothing() {
        let mut progress = Progress::new(true);
        progress.start(0, "Checking dependencies");
        assert!(progress.bar.is_none());
    }

    #[test]
    fn test_progress_enabled() {
        let mut progress = Progress::new(true);
        progress.start(2, "Checking dependencies");
        progress.set_message("Checking lodash");
        progress.inc();
        progress.inc();
        progress.finish_and_clear();
        assert!(progress.bar.is_none());
    }

    #[test]
    fn test_log_writer_reports_full_length() {
        let mut writer = LogWriter;
        assert_eq!(writer.write(b"warn line\n").unwrap(), 10);
        writer.flush().unwrap();
    }
}
