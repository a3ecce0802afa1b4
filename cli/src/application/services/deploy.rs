//! Application service: the full deployment use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::Result;

use crate::application::ports::{CloudProvisioner, LocalFs, ProgressReporter, ToolProbe};
use crate::application::services::{
    apis, datastores, functions, preflight, report::StageReport, service_account,
};
use crate::domain::{DeployToggles, Settings, Stage};

pub struct DeployOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub settings: &'a Settings,
    pub toggles: DeployToggles,
    pub dry_run: bool,
}

/// Outcome of the `deploy` use-case.
#[derive(Debug)]
pub struct DeployOutcome {
    /// One report per enabled stage, in execution order.
    pub reports: Vec<StageReport>,
    pub dry_run: bool,
}

impl DeployOutcome {
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.reports.iter().map(|r| r.warnings.len()).sum()
    }
}

/// Run every enabled stage in order, stopping at the first hard failure.
///
/// # Errors
///
/// Returns an error if a prerequisite is missing or any non-scheduler
/// command fails.
pub async fn deploy(
    cloud: &impl CloudProvisioner,
    tools: &impl ToolProbe,
    local_fs: &impl LocalFs,
    opts: DeployOptions<'_, impl ProgressReporter>,
) -> Result<DeployOutcome> {
    let DeployOptions {
        reporter,
        settings,
        toggles,
        dry_run,
    } = opts;

    preflight::check_prerequisites(tools, local_fs, settings, &toggles, dry_run, reporter).await?;

    let mut reports = Vec::new();
    for stage in toggles.stages() {
        tracing::debug!(?stage, "starting stage");
        let report = match stage {
            Stage::ActivateApis => apis::activate_apis(cloud, reporter).await?,
            Stage::ServiceAccount => {
                service_account::ensure_service_account(cloud, settings, reporter).await?
            }
            Stage::BigQuery => datastores::ensure_dataset(cloud, settings, reporter).await?,
            Stage::Storage => datastores::ensure_bucket(cloud, settings, reporter).await?,
            Stage::Delegator => functions::deploy_delegator(cloud, settings, reporter).await?,
            Stage::Cm360Function => {
                functions::deploy_cm360_function(cloud, settings, reporter).await?
            }
        };
        reports.push(report);
    }

    Ok(DeployOutcome { reports, dry_run })
}
