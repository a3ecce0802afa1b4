//! Deploy configuration schema, resolved settings, and identifier validators.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use cm360_common::{
    CM360_FUNCTION_SOURCE, Cm360Config, DELEGATOR_FUNCTION_SOURCE, DelegatorRequest,
    CM360_UPLOAD_TOPIC,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::DeployError;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_DATASET: &str = "cm360_conversion_upload";
pub const DEFAULT_CM360_TABLE: &str = "cm360_conversions";
pub const DEFAULT_SERVICE_ACCOUNT: &str = "cm360-conversion-upload";
pub const DEFAULT_BUCKET_SUFFIX: &str = "cm360-conversion-upload";
pub const DEFAULT_REGION: &str = "us-central1";
pub const DEFAULT_BQ_LOCATION: &str = "US";
pub const DEFAULT_RUNTIME: &str = "python39";
pub const DEFAULT_SCHEDULE: &str = "0 6 * * *";
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";

static PROJECT_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$").expect("valid regex")
});

static BQ_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_]{1,1024}$").expect("valid regex")
});

static BUCKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9][a-z0-9._-]{1,61}[a-z0-9]$").expect("valid regex")
});

static NUMERIC_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[0-9]+$").expect("valid regex")
});

// ── Config file schema ───────────────────────────────────────────────────────

/// Optional YAML config file. Every field may be overridden on the CLI.
///
/// ```yaml
/// project: my-marketing-project
/// dataset: cm360_conversion_upload
/// cm360:
///   profile_id: "1234567"
///   floodlight_activity_id: "7654321"
///   floodlight_configuration_id: "1122334"
/// scheduler:
///   schedule: "0 6 * * *"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub project: Option<String>,
    pub dataset: Option<String>,
    pub cm360_table: Option<String>,
    pub region: Option<String>,
    pub bq_location: Option<String>,
    pub service_account: Option<String>,
    pub bucket: Option<String>,
    pub source_dir: Option<PathBuf>,
    pub cm360: Cm360Ids,
    pub functions: FunctionsConfig,
    pub scheduler: SchedulerConfig,
}

/// CM360 account identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Cm360Ids {
    pub profile_id: Option<String>,
    pub floodlight_activity_id: Option<String>,
    pub floodlight_configuration_id: Option<String>,
}

/// Cloud Functions deploy options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionsConfig {
    #[serde(default = "default_runtime")]
    pub runtime: String,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
        }
    }
}

fn default_runtime() -> String {
    DEFAULT_RUNTIME.to_string()
}

/// Cloud Scheduler job options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule: default_schedule(),
            time_zone: default_time_zone(),
        }
    }
}

fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

// ── CLI overrides ────────────────────────────────────────────────────────────

/// Values given on the command line; `None` falls back to the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project: Option<String>,
    pub dataset: Option<String>,
    pub cm360_table: Option<String>,
    pub cm360_profile_id: Option<String>,
    pub cm360_fl_activity_id: Option<String>,
    pub cm360_fl_config_id: Option<String>,
    pub region: Option<String>,
    pub source_dir: Option<PathBuf>,
}

// ── Resolved settings ────────────────────────────────────────────────────────

/// Fully resolved values for one deployment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project: String,
    pub dataset: String,
    pub cm360_table: String,
    pub cm360: Cm360Config,
    pub region: String,
    pub bq_location: String,
    pub service_account: String,
    pub bucket: String,
    pub runtime: String,
    pub schedule: String,
    pub time_zone: String,
    pub source_dir: PathBuf,
}

impl Settings {
    /// Merge CLI overrides over the config file, then apply defaults.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::MissingProject` when neither source names a
    /// project, or `DeployError::InvalidIdentifier` when a value is malformed.
    pub fn resolve(cli: Overrides, file: DeployConfig) -> Result<Self> {
        let project = cli
            .project
            .or(file.project)
            .ok_or(DeployError::MissingProject)?;
        validate_project_id(&project)?;

        let bucket = file
            .bucket
            .unwrap_or_else(|| format!("{project}-{DEFAULT_BUCKET_SUFFIX}"));

        let settings = Self {
            dataset: cli
                .dataset
                .or(file.dataset)
                .unwrap_or_else(|| DEFAULT_DATASET.to_string()),
            cm360_table: cli
                .cm360_table
                .or(file.cm360_table)
                .unwrap_or_else(|| DEFAULT_CM360_TABLE.to_string()),
            cm360: Cm360Config {
                profile_id: cli.cm360_profile_id.or(file.cm360.profile_id),
                floodlight_activity_id: cli
                    .cm360_fl_activity_id
                    .or(file.cm360.floodlight_activity_id),
                floodlight_configuration_id: cli
                    .cm360_fl_config_id
                    .or(file.cm360.floodlight_configuration_id),
            },
            region: cli
                .region
                .or(file.region)
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bq_location: file
                .bq_location
                .unwrap_or_else(|| DEFAULT_BQ_LOCATION.to_string()),
            service_account: file
                .service_account
                .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT.to_string()),
            bucket,
            runtime: file.functions.runtime,
            schedule: file.scheduler.schedule,
            time_zone: file.scheduler.time_zone,
            source_dir: cli
                .source_dir
                .or(file.source_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            project,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        validate_bq_name("dataset", &self.dataset)?;
        validate_bq_name("CM360 table", &self.cm360_table)?;
        validate_bucket_name(&self.bucket)?;
        for (kind, id) in [
            ("CM360 profile id", &self.cm360.profile_id),
            ("Floodlight activity id", &self.cm360.floodlight_activity_id),
            ("Floodlight configuration id", &self.cm360.floodlight_configuration_id),
        ] {
            if let Some(id) = id {
                validate_numeric_id(kind, id)?;
            }
        }
        Ok(())
    }

    /// `<name>@<project>.iam.gserviceaccount.com`
    #[must_use]
    pub fn service_account_email(&self) -> String {
        format!(
            "{}@{}.iam.gserviceaccount.com",
            self.service_account, self.project
        )
    }

    /// Source directory of the delegator function.
    #[must_use]
    pub fn delegator_source(&self) -> PathBuf {
        self.source_dir.join(DELEGATOR_FUNCTION_SOURCE)
    }

    /// Source directory of the CM360 upload function.
    #[must_use]
    pub fn cm360_source(&self) -> PathBuf {
        self.source_dir.join(CM360_FUNCTION_SOURCE)
    }

    /// Message body published by the scheduler job.
    #[must_use]
    pub fn delegator_request(&self) -> DelegatorRequest {
        DelegatorRequest {
            table_name: self.cm360_table.clone(),
            topic: CM360_UPLOAD_TOPIC.to_string(),
            cm360_config: Some(self.cm360.clone()),
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a Google Cloud project id.
///
/// # Errors
///
/// Returns an error unless the id is 6–30 chars of lowercase letters, digits,
/// or hyphens, starting with a letter and not ending with a hyphen.
pub fn validate_project_id(id: &str) -> Result<()> {
    if !PROJECT_ID_RE.is_match(id) {
        return Err(DeployError::InvalidIdentifier {
            kind: "project id",
            value: id.to_string(),
            reason: "must be 6-30 lowercase letters, digits, or hyphens, starting with a letter",
        }
        .into());
    }
    Ok(())
}

/// Validates a BigQuery dataset or table name.
///
/// # Errors
///
/// Returns an error if the name contains anything but letters, digits, or underscores.
pub fn validate_bq_name(kind: &'static str, name: &str) -> Result<()> {
    if !BQ_NAME_RE.is_match(name) {
        return Err(DeployError::InvalidIdentifier {
            kind,
            value: name.to_string(),
            reason: "may contain only letters, digits, and underscores",
        }
        .into());
    }
    Ok(())
}

/// Validates a Cloud Storage bucket name.
///
/// # Errors
///
/// Returns an error if the name is not a valid 3–63 character bucket name.
pub fn validate_bucket_name(name: &str) -> Result<()> {
    if !BUCKET_RE.is_match(name) {
        return Err(DeployError::InvalidIdentifier {
            kind: "bucket name",
            value: name.to_string(),
            reason: "must be 3-63 lowercase letters, digits, dots, hyphens, or underscores",
        }
        .into());
    }
    Ok(())
}

/// Validates a CM360 numeric identifier.
///
/// # Errors
///
/// Returns an error if the id is empty or contains non-digit characters.
pub fn validate_numeric_id(kind: &'static str, id: &str) -> Result<()> {
    if !NUMERIC_ID_RE.is_match(id) {
        return Err(DeployError::InvalidIdentifier {
            kind,
            value: id.to_string(),
            reason: "must be numeric",
        }
        .into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
