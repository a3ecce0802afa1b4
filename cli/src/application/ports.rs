//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::domain::{Applied, CommandLine, DeployConfig};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Deploy parameters for one Pub/Sub-triggered Cloud Function.
pub struct FunctionSpec<'a> {
    /// Function name, e.g. `"cm360_conversion_upload_delegator"`.
    pub name: &'a str,
    /// Language runtime, e.g. `"python39"`.
    pub runtime: &'a str,
    /// Exported entry point.
    pub entry_point: &'a str,
    /// Local directory uploaded as function source.
    pub source: &'a str,
    /// Pub/Sub topic triggering the function.
    pub trigger_topic: &'a str,
    /// Service account the function runs as.
    pub service_account: &'a str,
    /// Runtime environment variables.
    pub env_vars: Vec<(&'a str, String)>,
}

/// Parameters for a Pub/Sub-target Cloud Scheduler job.
pub struct JobSpec<'a> {
    pub name: &'a str,
    /// Unix cron expression.
    pub schedule: &'a str,
    /// IANA time zone the schedule is evaluated in.
    pub time_zone: &'a str,
    pub topic: &'a str,
    /// JSON message body.
    pub message_body: &'a str,
}

// ── Cloud Port Traits ─────────────────────────────────────────────────────────
//
// Existence checks return `false` when the resource is absent. Mutations return
// `Applied::DryRun` instead of executing when the adapter is in dry-run mode.

/// Service Usage: API enablement.
#[allow(async_fn_in_trait)]
pub trait ServiceUsage {
    /// List enabled service names, e.g. `"bigquery.googleapis.com"`.
    async fn enabled_services(&self) -> Result<Vec<String>>;
    /// Enable the given services in a single call.
    async fn enable_services(&self, services: &[&str]) -> Result<Applied>;
}

/// IAM: service accounts and project role bindings.
#[allow(async_fn_in_trait)]
pub trait IamAdmin {
    async fn service_account_exists(&self, email: &str) -> Result<bool>;
    async fn create_service_account(&self, name: &str, display_name: &str) -> Result<Applied>;
    /// Grant `role` on the project to `member`. Idempotent on the provider side.
    async fn add_project_binding(&self, member: &str, role: &str) -> Result<Applied>;
}

/// Cloud Storage buckets.
#[allow(async_fn_in_trait)]
pub trait ObjectStorage {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;
    async fn create_bucket(&self, bucket: &str, location: &str) -> Result<Applied>;
}

/// BigQuery datasets.
#[allow(async_fn_in_trait)]
pub trait Warehouse {
    async fn dataset_exists(&self, dataset: &str) -> Result<bool>;
    async fn create_dataset(&self, dataset: &str, location: &str) -> Result<Applied>;
}

/// Pub/Sub topics.
#[allow(async_fn_in_trait)]
pub trait Messaging {
    async fn topic_exists(&self, topic: &str) -> Result<bool>;
    async fn create_topic(&self, topic: &str) -> Result<Applied>;
}

/// Cloud Functions deployment.
#[allow(async_fn_in_trait)]
pub trait FunctionDeployer {
    /// Create or update a function; the deploy API is idempotent.
    async fn deploy_function(&self, spec: &FunctionSpec<'_>) -> Result<Applied>;
}

/// Cloud Scheduler jobs.
#[allow(async_fn_in_trait)]
pub trait Scheduler {
    async fn delete_job(&self, name: &str) -> Result<Applied>;
    async fn create_pubsub_job(&self, spec: &JobSpec<'_>) -> Result<Applied>;
}

/// Result of asking a CLI for its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Available,
    /// The executable is not on `PATH`.
    NotFound,
    /// The executable ran but `--version` did not succeed.
    Broken(String),
}

/// Local CLI prerequisites.
#[allow(async_fn_in_trait)]
pub trait ToolProbe {
    /// Spawn `tool --version` and classify the outcome.
    async fn tool_status(&self, tool: &str) -> ToolStatus;
}

/// Composite trait: any type implementing all cloud sub-traits is a `CloudProvisioner`.
pub trait CloudProvisioner:
    ServiceUsage + IamAdmin + ObjectStorage + Warehouse + Messaging + FunctionDeployer + Scheduler
{
}

/// Blanket implementation: any type implementing all cloud sub-traits is a `CloudProvisioner`.
impl<T> CloudProvisioner for T where
    T: ServiceUsage
        + IamAdmin
        + ObjectStorage
        + Warehouse
        + Messaging
        + FunctionDeployer
        + Scheduler
{
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Echo a command that dry-run mode skipped.
    fn dry_run(&self, command: &CommandLine);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading of the deploy configuration file.
pub trait ConfigStore {
    /// Load the config file. An explicit path must exist; the default path
    /// may be absent, which yields `DeployConfig::default()`.
    fn load(&self, explicit: Option<&Path>) -> Result<DeployConfig>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Abstracts local filesystem checks.
pub trait LocalFs {
    /// `true` when `path` exists and is a directory.
    fn dir_exists(&self, path: &Path) -> bool;
}
