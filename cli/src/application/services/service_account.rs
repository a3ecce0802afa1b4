//! Application service: service account and IAM bindings stage.

use anyhow::{Context, Result};

use crate::application::ports::{IamAdmin, ProgressReporter};
use crate::application::services::report::StageReport;
use crate::domain::{REQUIRED_ROLES, Settings, Stage};

const DISPLAY_NAME: &str = "CM360 conversion upload";

/// Create the pipeline service account if absent, then bind every required role.
///
/// Role bindings are re-applied on every run; `add-iam-policy-binding` is a
/// no-op for bindings that already exist.
///
/// # Errors
///
/// Returns an error if the existence check, creation, or any binding fails.
pub async fn ensure_service_account(
    cloud: &impl IamAdmin,
    settings: &Settings,
    reporter: &impl ProgressReporter,
) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::ServiceAccount);
    let email = settings.service_account_email();

    reporter.step(&format!("checking service account {email}..."));
    if cloud
        .service_account_exists(&email)
        .await
        .context("describing service account")?
    {
        reporter.success(&format!("service account {email} exists"));
    } else {
        reporter.step(&format!("creating service account {email}..."));
        let applied = cloud
            .create_service_account(&settings.service_account, DISPLAY_NAME)
            .await
            .context("creating service account")?;
        report.record(&applied, reporter);
    }

    let member = format!("serviceAccount:{email}");
    for role in REQUIRED_ROLES {
        reporter.step(&format!("granting {role}..."));
        let applied = cloud
            .add_project_binding(&member, role)
            .await
            .with_context(|| format!("granting {role} to {email}"))?;
        report.record_reapply(&applied, reporter);
    }
    if report.planned == 0 {
        reporter.success(&format!("{} role(s) bound to {email}", REQUIRED_ROLES.len()));
    }
    Ok(report)
}
