//! Application service: Cloud Function and scheduler stages.
//!
//! Both functions are Pub/Sub triggered, so each stage first makes sure its
//! trigger topic exists. The delegator stage also recreates the daily
//! scheduler job; scheduler failures are reported and never abort the run.

use anyhow::{Context, Result};
use cm360_common::{
    CM360_FUNCTION, CM360_UPLOAD_TOPIC, DELEGATOR_FUNCTION, DELEGATOR_TOPIC, ENTRY_POINT,
    SCHEDULER_JOB,
};

use crate::application::ports::{
    FunctionDeployer, FunctionSpec, JobSpec, Messaging, ProgressReporter, Scheduler,
};
use crate::application::services::report::StageReport;
use crate::domain::{Settings, Stage};

/// Create `topic` if it does not exist.
async fn ensure_topic(
    cloud: &impl Messaging,
    topic: &str,
    report: &mut StageReport,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step(&format!("checking topic {topic}..."));
    if cloud
        .topic_exists(topic)
        .await
        .with_context(|| format!("describing topic {topic}"))?
    {
        reporter.success(&format!("topic {topic} exists"));
        return Ok(());
    }
    let applied = cloud
        .create_topic(topic)
        .await
        .with_context(|| format!("creating topic {topic}"))?;
    report.record(&applied, reporter);
    if !applied.is_dry_run() {
        reporter.success(&format!("topic {topic} created"));
    }
    Ok(())
}

async fn deploy(
    cloud: &impl FunctionDeployer,
    spec: &FunctionSpec<'_>,
    report: &mut StageReport,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step(&format!("deploying function {} (this can take a few minutes)...", spec.name));
    let applied = cloud
        .deploy_function(spec)
        .await
        .with_context(|| format!("deploying function {}", spec.name))?;
    report.record(&applied, reporter);
    if !applied.is_dry_run() {
        reporter.success(&format!("function {} deployed", spec.name));
    }
    Ok(())
}

/// Deploy the CM360 upload function behind its Pub/Sub topic.
///
/// # Errors
///
/// Returns an error if topic creation or the function deploy fails.
pub async fn deploy_cm360_function<C>(
    cloud: &C,
    settings: &Settings,
    reporter: &impl ProgressReporter,
) -> Result<StageReport>
where
    C: Messaging + FunctionDeployer,
{
    let mut report = StageReport::new(Stage::Cm360Function);
    ensure_topic(cloud, CM360_UPLOAD_TOPIC, &mut report, reporter).await?;

    let source = settings.cm360_source().display().to_string();
    let email = settings.service_account_email();
    let spec = FunctionSpec {
        name: CM360_FUNCTION,
        runtime: &settings.runtime,
        entry_point: ENTRY_POINT,
        source: &source,
        trigger_topic: CM360_UPLOAD_TOPIC,
        service_account: &email,
        env_vars: Vec::new(),
    };
    deploy(cloud, &spec, &mut report, reporter).await?;
    Ok(report)
}

/// Deploy the delegator function and recreate its scheduler job.
///
/// # Errors
///
/// Returns an error if topic creation, the function deploy, or encoding the
/// scheduler payload fails. Scheduler API failures only produce warnings.
pub async fn deploy_delegator<C>(
    cloud: &C,
    settings: &Settings,
    reporter: &impl ProgressReporter,
) -> Result<StageReport>
where
    C: Messaging + FunctionDeployer + Scheduler,
{
    let mut report = StageReport::new(Stage::Delegator);
    ensure_topic(cloud, DELEGATOR_TOPIC, &mut report, reporter).await?;

    let source = settings.delegator_source().display().to_string();
    let email = settings.service_account_email();
    let spec = FunctionSpec {
        name: DELEGATOR_FUNCTION,
        runtime: &settings.runtime,
        entry_point: ENTRY_POINT,
        source: &source,
        trigger_topic: DELEGATOR_TOPIC,
        service_account: &email,
        env_vars: vec![("GCP_PROJECT", settings.project.clone())],
    };
    deploy(cloud, &spec, &mut report, reporter).await?;

    recreate_scheduler_job(cloud, settings, &mut report, reporter).await?;
    Ok(report)
}

/// Delete then create the scheduler job. Both calls are best-effort.
async fn recreate_scheduler_job(
    cloud: &impl Scheduler,
    settings: &Settings,
    report: &mut StageReport,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    if !settings.cm360.is_complete() {
        report.warn(
            format!(
                "scheduler payload is missing {}; the upload function will skip every batch",
                settings.cm360.missing_fields().join(", ")
            ),
            reporter,
        );
    }

    let body = settings
        .delegator_request()
        .to_message_body()
        .context("encoding scheduler payload")?;

    reporter.step(&format!("removing scheduler job {SCHEDULER_JOB}..."));
    match cloud.delete_job(SCHEDULER_JOB).await {
        Ok(applied) => report.record(&applied, reporter),
        Err(e) => report.warn(
            format!("could not delete scheduler job {SCHEDULER_JOB} (continuing): {e:#}"),
            reporter,
        ),
    }

    reporter.step(&format!("creating scheduler job {SCHEDULER_JOB}..."));
    let job = JobSpec {
        name: SCHEDULER_JOB,
        schedule: &settings.schedule,
        time_zone: &settings.time_zone,
        topic: DELEGATOR_TOPIC,
        message_body: &body,
    };
    match cloud.create_pubsub_job(&job).await {
        Ok(applied) => {
            report.record(&applied, reporter);
            if !applied.is_dry_run() {
                reporter.success(&format!(
                    "scheduler job {SCHEDULER_JOB} runs '{}' ({})",
                    settings.schedule, settings.time_zone
                ));
            }
        }
        Err(e) => report.warn(
            format!("could not create scheduler job {SCHEDULER_JOB} (continuing): {e:#}"),
            reporter,
        ),
    }
    Ok(())
}
