//! Per-stage outcome bookkeeping.

use crate::application::ports::ProgressReporter;
use crate::domain::{Applied, Stage};

/// What one stage did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    /// Mutating commands that ran.
    pub changed: usize,
    /// Mutating commands echoed by dry-run instead of running.
    pub planned: usize,
    /// Idempotent re-applies that ran but changed nothing observable.
    pub confirmed: usize,
    /// Best-effort failures that did not stop the run.
    pub warnings: Vec<String>,
}

impl StageReport {
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            changed: 0,
            planned: 0,
            confirmed: 0,
            warnings: Vec::new(),
        }
    }

    /// Count a mutation, echoing it through `reporter` when it was skipped.
    pub fn record(&mut self, applied: &Applied, reporter: &impl ProgressReporter) {
        match applied {
            Applied::Executed => self.changed += 1,
            Applied::DryRun(cmd) => {
                reporter.dry_run(cmd);
                self.planned += 1;
            }
        }
    }

    /// Like `record`, but an executed call counts as `confirmed`.
    pub fn record_reapply(&mut self, applied: &Applied, reporter: &impl ProgressReporter) {
        match applied {
            Applied::Executed => self.confirmed += 1,
            Applied::DryRun(_) => self.record(applied, reporter),
        }
    }

    /// Record a best-effort failure and surface it as a warning.
    pub fn warn(&mut self, message: String, reporter: &impl ProgressReporter) {
        reporter.warn(&message);
        self.warnings.push(message);
    }

    /// `true` when every resource was already in place. Re-applies do not count.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.changed == 0 && self.planned == 0
    }
}
