//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};

use crate::app::{AppContext, AppFlags};
use crate::application::ports::ConfigStore;
use crate::commands;
use crate::domain::{DeployToggles, Overrides, Settings};
use crate::infra::config::YamlConfigStore;

/// Deploy the CM360 conversion upload pipeline to Google Cloud
#[derive(Parser, Debug)]
#[command(name = "cm360-deploy", version)]
pub struct Cli {
    /// Google Cloud project id
    #[arg(long, value_name = "PROJECT_ID")]
    pub project: Option<String>,

    /// BigQuery dataset to create
    #[arg(long, value_name = "NAME")]
    pub dataset: Option<String>,

    /// BigQuery table the delegator reads conversions from
    #[arg(long = "cm360-table", value_name = "TABLE")]
    pub cm360_table: Option<String>,

    /// CM360 user profile id
    #[arg(long = "cm360-profile-id", value_name = "ID")]
    pub cm360_profile_id: Option<String>,

    /// Floodlight activity id
    #[arg(long = "cm360-fl-activity-id", value_name = "ID")]
    pub cm360_fl_activity_id: Option<String>,

    /// Floodlight configuration id
    #[arg(long = "cm360-fl-config-id", value_name = "ID")]
    pub cm360_fl_config_id: Option<String>,

    /// Region for functions and the scheduler job
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Directory containing the function source folders
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// YAML config file (default: $CM360_DEPLOY_CONFIG or ~/.cm360-deploy/config.yaml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub toggles: ToggleArgs,

    /// Print the commands that would run without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log every executed command and its output
    #[arg(long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,
}

/// Deployment toggles.
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Deployment")]
pub struct ToggleArgs {
    /// Enable the required Google Cloud APIs
    #[arg(long)]
    pub activate_apis: bool,

    /// Create the service account and grant its roles
    #[arg(long)]
    pub create_service_account: bool,

    /// Everything except API activation
    #[arg(long)]
    pub deploy_all: bool,

    /// Create the BigQuery dataset
    #[arg(long)]
    pub deploy_bigquery: bool,

    /// Create the Cloud Storage bucket
    #[arg(long)]
    pub deploy_storage: bool,

    /// Deploy the delegator function and its scheduler job
    #[arg(long)]
    pub deploy_delegator: bool,

    /// Deploy the CM360 upload function
    #[arg(long = "deploy-cm360-function")]
    pub deploy_cm360_function: bool,
}

impl ToggleArgs {
    /// Toggle state after `--deploy-all` expansion.
    #[must_use]
    pub fn resolve(&self) -> DeployToggles {
        DeployToggles {
            activate_apis: self.activate_apis,
            create_service_account: self.create_service_account,
            deploy_bigquery: self.deploy_bigquery,
            deploy_storage: self.deploy_storage,
            deploy_delegator: self.deploy_delegator,
            deploy_cm360_function: self.deploy_cm360_function,
        }
        .with_deploy_all(self.deploy_all)
    }
}

impl Cli {
    /// Values given on the command line, layered over the config file.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            project: self.project.clone(),
            dataset: self.dataset.clone(),
            cm360_table: self.cm360_table.clone(),
            cm360_profile_id: self.cm360_profile_id.clone(),
            cm360_fl_activity_id: self.cm360_fl_activity_id.clone(),
            cm360_fl_config_id: self.cm360_fl_config_id.clone(),
            region: self.region.clone(),
            source_dir: self.source_dir.clone(),
        }
    }

    /// Execute the deployment.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::MissingProject` when no project is configured, or
    /// any error raised while loading config or deploying.
    pub async fn run(self) -> Result<()> {
        let file = YamlConfigStore.load(self.config.as_deref())?;
        let settings = Settings::resolve(self.overrides(), file)?;
        let toggles = self.toggles.resolve();

        let app = AppContext::new(&AppFlags {
            no_color: self.no_color,
            quiet: self.quiet,
            dry_run: self.dry_run,
            verbose: self.verbose,
        });
        commands::deploy::run(&app, &settings, toggles).await
    }
}
