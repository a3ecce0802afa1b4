//! Infrastructure implementation of the cloud provisioner port traits.
//!
//! `GcloudProvisioner<R>` routes every `gcloud`, `gsutil`, and `bq` call
//! through a `CommandRunner`. Existence checks treat a non-zero exit as
//! "absent"; mutations treat it as a hard `DeployError::CommandFailed`.
//!
//! In dry-run mode nothing reaches the runner: checks report "absent" and
//! mutations come back as `Applied::DryRun` carrying the command line.

use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{
    CommandRunner, FunctionDeployer, FunctionSpec, IamAdmin, JobSpec, Messaging, ObjectStorage,
    Scheduler, ServiceUsage, ToolProbe, ToolStatus, Warehouse,
};
use crate::domain::{Applied, CommandLine, DeployError};
use crate::infra::command_runner::{
    FUNCTION_DEPLOY_TIMEOUT, MUTATION_TIMEOUT, QUERY_TIMEOUT, TokioCommandRunner,
};

const GCLOUD: &str = "gcloud";
const GSUTIL: &str = "gsutil";
const BQ: &str = "bq";

const DATASET_DESCRIPTION: &str = "CM360 conversion upload";

/// Infrastructure adapter over the Google Cloud CLIs.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct GcloudProvisioner<R: CommandRunner> {
    runner: R,
    project: String,
    region: String,
    dry_run: bool,
}

impl<R: CommandRunner> GcloudProvisioner<R> {
    /// Create a provisioner scoped to one project and region.
    pub fn new(runner: R, project: &str, region: &str, dry_run: bool) -> Self {
        Self {
            runner,
            project: project.to_owned(),
            region: region.to_owned(),
            dry_run,
        }
    }

    /// Run a read-only command. `None` in dry-run mode.
    async fn query(&self, program: &str, args: &[&str]) -> Result<Option<Output>> {
        if self.dry_run {
            tracing::debug!(command = %CommandLine::new(program, args), "dry-run: check skipped");
            return Ok(None);
        }
        let output = self
            .runner
            .run_with_timeout(program, args, QUERY_TIMEOUT)
            .await
            .with_context(|| format!("running {}", CommandLine::new(program, args)))?;
        Ok(Some(output))
    }

    /// Existence check: exit zero means present.
    async fn exists(&self, program: &str, args: &[&str]) -> Result<bool> {
        Ok(self
            .query(program, args)
            .await?
            .is_some_and(|o| o.status.success()))
    }

    /// Run a mutating command, or describe it in dry-run mode.
    async fn apply(&self, program: &str, args: &[&str], timeout: Duration) -> Result<Applied> {
        let cmd = CommandLine::new(program, args);
        if self.dry_run {
            return Ok(Applied::DryRun(cmd));
        }
        let output = self
            .runner
            .run_with_timeout(program, args, timeout)
            .await
            .with_context(|| format!("running {cmd}"))?;
        check_success(&cmd, &output)?;
        Ok(Applied::Executed)
    }
}

impl GcloudProvisioner<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(project: &str, region: &str, dry_run: bool) -> Self {
        Self::new(TokioCommandRunner::default(), project, region, dry_run)
    }
}

fn check_success(cmd: &CommandLine, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(DeployError::CommandFailed {
        command: cmd.to_string(),
        exit_code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
    .into())
}

impl<R: CommandRunner> ServiceUsage for GcloudProvisioner<R> {
    async fn enabled_services(&self) -> Result<Vec<String>> {
        let args = [
            "services",
            "list",
            "--enabled",
            "--project",
            self.project.as_str(),
            "--format=value(config.name)",
        ];
        let Some(output) = self.query(GCLOUD, &args).await? else {
            return Ok(Vec::new());
        };
        check_success(&CommandLine::new(GCLOUD, &args), &output)?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }

    async fn enable_services(&self, services: &[&str]) -> Result<Applied> {
        let mut args = vec!["services", "enable"];
        args.extend_from_slice(services);
        args.extend_from_slice(&["--project", self.project.as_str()]);
        self.apply(GCLOUD, &args, MUTATION_TIMEOUT).await
    }
}

impl<R: CommandRunner> IamAdmin for GcloudProvisioner<R> {
    async fn service_account_exists(&self, email: &str) -> Result<bool> {
        self.exists(
            GCLOUD,
            &[
                "iam",
                "service-accounts",
                "describe",
                email,
                "--project",
                self.project.as_str(),
            ],
        )
        .await
    }

    async fn create_service_account(&self, name: &str, display_name: &str) -> Result<Applied> {
        self.apply(
            GCLOUD,
            &[
                "iam",
                "service-accounts",
                "create",
                name,
                "--project",
                self.project.as_str(),
                "--display-name",
                display_name,
            ],
            MUTATION_TIMEOUT,
        )
        .await
    }

    async fn add_project_binding(&self, member: &str, role: &str) -> Result<Applied> {
        self.apply(
            GCLOUD,
            &[
                "projects",
                "add-iam-policy-binding",
                self.project.as_str(),
                "--member",
                member,
                "--role",
                role,
                "--condition=None",
                "--quiet",
            ],
            MUTATION_TIMEOUT,
        )
        .await
    }
}

impl<R: CommandRunner> ObjectStorage for GcloudProvisioner<R> {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let url = format!("gs://{bucket}");
        self.exists(GSUTIL, &["ls", "-b", url.as_str()]).await
    }

    async fn create_bucket(&self, bucket: &str, location: &str) -> Result<Applied> {
        let url = format!("gs://{bucket}");
        self.apply(
            GSUTIL,
            &["mb", "-p", self.project.as_str(), "-l", location, url.as_str()],
            MUTATION_TIMEOUT,
        )
        .await
    }
}

impl<R: CommandRunner> Warehouse for GcloudProvisioner<R> {
    async fn dataset_exists(&self, dataset: &str) -> Result<bool> {
        let project_flag = format!("--project_id={}", self.project);
        let qualified = format!("{}:{dataset}", self.project);
        self.exists(BQ, &[project_flag.as_str(), "show", "--format=none", qualified.as_str()])
            .await
    }

    async fn create_dataset(&self, dataset: &str, location: &str) -> Result<Applied> {
        let project_flag = format!("--project_id={}", self.project);
        let location_flag = format!("--location={location}");
        let qualified = format!("{}:{dataset}", self.project);
        self.apply(
            BQ,
            &[
                project_flag.as_str(),
                location_flag.as_str(),
                "mk",
                "--dataset",
                "--description",
                DATASET_DESCRIPTION,
                qualified.as_str(),
            ],
            MUTATION_TIMEOUT,
        )
        .await
    }
}

impl<R: CommandRunner> Messaging for GcloudProvisioner<R> {
    async fn topic_exists(&self, topic: &str) -> Result<bool> {
        self.exists(
            GCLOUD,
            &["pubsub", "topics", "describe", topic, "--project", self.project.as_str()],
        )
        .await
    }

    async fn create_topic(&self, topic: &str) -> Result<Applied> {
        self.apply(
            GCLOUD,
            &["pubsub", "topics", "create", topic, "--project", self.project.as_str()],
            MUTATION_TIMEOUT,
        )
        .await
    }
}

impl<R: CommandRunner> FunctionDeployer for GcloudProvisioner<R> {
    async fn deploy_function(&self, spec: &FunctionSpec<'_>) -> Result<Applied> {
        let env_vars = spec
            .env_vars
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");
        let mut args = vec![
            "functions",
            "deploy",
            spec.name,
            "--no-gen2",
            "--project",
            self.project.as_str(),
            "--region",
            self.region.as_str(),
            "--runtime",
            spec.runtime,
            "--entry-point",
            spec.entry_point,
            "--source",
            spec.source,
            "--trigger-topic",
            spec.trigger_topic,
            "--service-account",
            spec.service_account,
        ];
        if !env_vars.is_empty() {
            args.push("--set-env-vars");
            args.push(env_vars.as_str());
        }
        args.push("--quiet");
        self.apply(GCLOUD, &args, FUNCTION_DEPLOY_TIMEOUT).await
    }
}

impl<R: CommandRunner> Scheduler for GcloudProvisioner<R> {
    async fn delete_job(&self, name: &str) -> Result<Applied> {
        self.apply(
            GCLOUD,
            &[
                "scheduler",
                "jobs",
                "delete",
                name,
                "--project",
                self.project.as_str(),
                "--location",
                self.region.as_str(),
                "--quiet",
            ],
            MUTATION_TIMEOUT,
        )
        .await
    }

    async fn create_pubsub_job(&self, spec: &JobSpec<'_>) -> Result<Applied> {
        self.apply(
            GCLOUD,
            &[
                "scheduler",
                "jobs",
                "create",
                "pubsub",
                spec.name,
                "--project",
                self.project.as_str(),
                "--location",
                self.region.as_str(),
                "--schedule",
                spec.schedule,
                "--time-zone",
                spec.time_zone,
                "--topic",
                spec.topic,
                "--message-body",
                spec.message_body,
                "--quiet",
            ],
            MUTATION_TIMEOUT,
        )
        .await
    }
}

impl<R: CommandRunner> ToolProbe for GcloudProvisioner<R> {
    async fn tool_status(&self, tool: &str) -> ToolStatus {
        match self
            .runner
            .run_with_timeout(tool, &["--version"], QUERY_TIMEOUT)
            .await
        {
            Ok(output) if output.status.success() => ToolStatus::Available,
            Ok(output) => {
                let code = output
                    .status
                    .code()
                    .map_or_else(|| "killed by signal".to_string(), |c| format!("exit code {c}"));
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    ToolStatus::Broken(code)
                } else {
                    ToolStatus::Broken(format!("{code}: {stderr}"))
                }
            }
            Err(e) if is_not_found(&e) => ToolStatus::NotFound,
            Err(e) => {
                tracing::debug!(tool, error = %e, "version check failed");
                ToolStatus::Broken(format!("{e:#}"))
            }
        }
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<std::io::Error>())
        .any(|io| io.kind() == std::io::ErrorKind::NotFound)
}
