//! Application service: API activation stage.

use anyhow::{Context, Result};

use crate::application::ports::{ProgressReporter, ServiceUsage};
use crate::application::services::report::StageReport;
use crate::domain::{REQUIRED_APIS, Stage};

/// Enable every required API that is not already enabled.
///
/// # Errors
///
/// Returns an error if listing or enabling services fails.
pub async fn activate_apis(
    cloud: &impl ServiceUsage,
    reporter: &impl ProgressReporter,
) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::ActivateApis);

    reporter.step("checking enabled APIs...");
    let enabled = cloud
        .enabled_services()
        .await
        .context("listing enabled APIs")?;

    let missing = missing_apis(&enabled);
    if missing.is_empty() {
        reporter.success("required APIs already enabled");
        return Ok(report);
    }

    reporter.step(&format!("enabling {}...", missing.join(", ")));
    let applied = cloud
        .enable_services(&missing)
        .await
        .context("enabling APIs")?;
    report.record(&applied, reporter);
    if !applied.is_dry_run() {
        reporter.success(&format!("{} API(s) enabled", missing.len()));
    }
    Ok(report)
}

/// Required APIs absent from `enabled`, in declaration order.
fn missing_apis(enabled: &[String]) -> Vec<&'static str> {
    REQUIRED_APIS
        .iter()
        .copied()
        .filter(|api| !enabled.iter().any(|e| e == api))
        .collect()
}
