//! Human-readable terminal renderer.

use crate::application::services::deploy::DeployOutcome;
use crate::application::services::report::StageReport;
use crate::domain::{Settings, Stage};
use crate::output::OutputContext;

/// Renders deployment results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Print the target project before any stage runs.
    pub fn render_target(&self, settings: &Settings, dry_run: bool) {
        if self.ctx.quiet {
            return;
        }
        let mode = if dry_run { " (dry run)" } else { "" };
        self.ctx.header(&format!("Deploying to {}{mode}", settings.project));
        self.ctx.kv("Region:", &settings.region);
        self.ctx.kv("Service account:", &settings.service_account_email());
        println!();
    }

    /// Print one line per stage and a closing note.
    pub fn render_summary(&self, outcome: &DeployOutcome) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Summary:");
        for report in &outcome.reports {
            self.ctx
                .kv(&format!("{:<20}", report.stage.to_string()), &stage_summary(report));
        }
        println!();
        if outcome.dry_run {
            self.ctx.info("Dry run: no commands were executed.");
        } else if outcome.warnings() > 0 {
            self.ctx
                .warn(&format!("Finished with {} warning(s).", outcome.warnings()));
        } else {
            self.ctx.success("Deployment complete.");
        }
    }

    /// Hint printed when no deployment toggle was given.
    pub fn render_nothing_to_do(&self) {
        self.ctx.warn("Nothing to deploy.");
        self.ctx.info(&toggle_hint());
    }
}

/// Lists every flag that enables a stage.
#[must_use]
pub fn toggle_hint() -> String {
    format!(
        "Pass --deploy-all or one of {}.",
        Stage::ORDER.map(Stage::flag).join(", ")
    )
}

/// One-line description of what a stage did.
#[must_use]
pub fn stage_summary(report: &StageReport) -> String {
    let mut parts = Vec::new();
    if report.is_unchanged() {
        parts.push("up to date".to_string());
    }
    if report.changed > 0 {
        parts.push(format!("{} change(s) applied", report.changed));
    }
    if report.planned > 0 {
        parts.push(format!("{} command(s) planned", report.planned));
    }
    if report.confirmed > 0 {
        parts.push(format!("{} binding(s) confirmed", report.confirmed));
    }
    if !report.warnings.is_empty() {
        parts.push(format!("{} warning(s)", report.warnings.len()));
    }
    parts.join(", ")
}
