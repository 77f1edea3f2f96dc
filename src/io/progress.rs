//! Live iteration and residual display for a running blend

use std::sync::LazyLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::algorithm::executor::{IterationRecord, Phase};
use crate::io::configuration::PROGRESS_TICK_MS;

static SPINNER_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} [{elapsed_precise}] {prefix} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

/// Progress display for one blend
///
/// Shows a spinner with the iteration count and residual.
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Start a spinner labelled with the method
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(SPINNER_STYLE.clone());
        bar.set_prefix(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        Self { bar }
    }

    /// Reflect a new record
    pub fn update(&self, record: &IterationRecord) {
        self.bar.set_position(record.iteration as u64);
        self.bar.set_message(describe(record));
    }

    /// Clear the display after a converged run
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Leave the last state visible after a failed or cancelled run
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

/// One-line description of a record
pub fn describe(record: &IterationRecord) -> String {
    match record.phase {
        Phase::Relaxation => format!(
            "iteration {} residual {:.4}",
            record.iteration, record.residual
        ),
        Phase::Completion => format!("iteration {} completion pass", record.iteration),
    }
}
