//! `cm360-deploy`: run the enabled deployment stages.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::deploy::{self as service, DeployOptions};
use crate::domain::{DeployToggles, Settings};
use crate::infra::fs::LocalFs;

/// Run the deployment for the resolved settings and toggles.
///
/// # Errors
///
/// Returns an error if a prerequisite is missing or a provisioning step fails.
pub async fn run(app: &AppContext, settings: &Settings, toggles: DeployToggles) -> Result<()> {
    let renderer = app.renderer();
    if toggles.stages().is_empty() {
        renderer.render_nothing_to_do();
        return Ok(());
    }

    renderer.render_target(settings, app.dry_run);

    let cloud = app.provisioner(settings);
    let outcome = {
        let reporter = app.terminal_reporter();
        service::deploy(
            &cloud,
            &cloud,
            &LocalFs,
            DeployOptions {
                reporter: &reporter,
                settings,
                toggles,
                dry_run: app.dry_run,
            },
        )
        .await?
    };

    renderer.render_summary(&outcome);
    Ok(())
}
