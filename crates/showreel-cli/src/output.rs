//! Status messages and cycle progress on stderr

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use showreel::RunSummary;
use std::time::Duration;

/// Progress reporter for demo playback
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` cycles, or a spinner when the
    /// loop is unbounded
    pub fn start_progress(&mut self, total: Option<u64>, message: &str) {
        if self.quiet {
            return;
        }

        let pb = match total {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {pos} cycles {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.enable_steady_tick(Duration::from_millis(120));
                pb
            }
        };
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message("Done");
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print the run totals
    pub fn summary(&self, summary: &RunSummary, duration: Duration) {
        if self.quiet && summary.faults == 0 {
            return;
        }

        let _ = self.term.write_line("");
        let line = summary_line(summary, duration);

        if self.use_color {
            let status = if summary.faults > 0 {
                Style::new().red().bold().apply_to("FAULTED")
            } else {
                Style::new().green().bold().apply_to("DONE")
            };
            let _ = self.term.write_line(&format!("{status} {line}"));
        } else {
            let status = if summary.faults > 0 { "FAULTED" } else { "DONE" };
            let _ = self.term.write_line(&format!("{status} {line}"));
        }
    }
}

/// "3 cycles in 1.20s (2 completed, 1 faulted)"
#[must_use]
pub fn summary_line(summary: &RunSummary, duration: Duration) -> String {
    format!(
        "{} cycles in {:.2}s ({} completed, {} faulted)",
        summary.cycles_attempted(),
        duration.as_secs_f64(),
        summary.cycles_completed,
        summary.faults
    )
}
