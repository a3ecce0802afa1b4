//! Application service: prerequisite checks before any cloud call.

use anyhow::Result;

use crate::application::ports::{LocalFs, ProgressReporter, ToolProbe, ToolStatus};
use crate::domain::{DeployError, DeployToggles, Settings, Stage};

/// Verify the CLIs and function sources the enabled stages need.
///
/// In dry-run mode nothing is executed, so tool probes are skipped and a
/// missing function source is only a warning.
///
/// # Errors
///
/// Returns `DeployError::ToolMissing`, `DeployError::ToolBroken` or
/// `DeployError::MissingSource`.
pub async fn check_prerequisites(
    tools: &impl ToolProbe,
    local_fs: &impl LocalFs,
    settings: &Settings,
    toggles: &DeployToggles,
    dry_run: bool,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    if !dry_run {
        for tool in toggles.required_tools() {
            match tools.tool_status(tool).await {
                ToolStatus::Available => {}
                ToolStatus::NotFound => {
                    return Err(DeployError::ToolMissing {
                        tool: tool.to_string(),
                    }
                    .into());
                }
                ToolStatus::Broken(detail) => {
                    return Err(DeployError::ToolBroken {
                        tool: tool.to_string(),
                        detail,
                    }
                    .into());
                }
            }
        }
    }

    for stage in toggles.stages().into_iter().filter(|s| s.deploys_function()) {
        let path = match stage {
            Stage::Delegator => settings.delegator_source(),
            _ => settings.cm360_source(),
        };
        if local_fs.dir_exists(&path) {
            continue;
        }
        if dry_run {
            reporter.warn(&format!("function source not found: {}", path.display()));
        } else {
            return Err(DeployError::MissingSource { path }.into());
        }
    }
    Ok(())
}
