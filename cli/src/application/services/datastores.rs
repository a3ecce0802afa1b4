//! Application service: BigQuery dataset and Cloud Storage bucket stages.

use anyhow::{Context, Result};

use crate::application::ports::{ObjectStorage, ProgressReporter, Warehouse};
use crate::application::services::report::StageReport;
use crate::domain::{Settings, Stage};

/// Create the BigQuery dataset if it does not exist.
///
/// # Errors
///
/// Returns an error if the existence check or `bq mk` fails.
pub async fn ensure_dataset(
    cloud: &impl Warehouse,
    settings: &Settings,
    reporter: &impl ProgressReporter,
) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::BigQuery);
    let dataset = &settings.dataset;

    reporter.step(&format!("checking dataset {dataset}..."));
    if cloud
        .dataset_exists(dataset)
        .await
        .context("checking BigQuery dataset")?
    {
        reporter.success(&format!("dataset {dataset} exists"));
        return Ok(report);
    }

    reporter.step(&format!("creating dataset {dataset} in {}...", settings.bq_location));
    let applied = cloud
        .create_dataset(dataset, &settings.bq_location)
        .await
        .context("creating BigQuery dataset")?;
    report.record(&applied, reporter);
    if !applied.is_dry_run() {
        reporter.success(&format!("dataset {dataset} created"));
    }
    Ok(report)
}

/// Create the Cloud Storage bucket if it does not exist.
///
/// # Errors
///
/// Returns an error if the existence check or `gsutil mb` fails.
pub async fn ensure_bucket(
    cloud: &impl ObjectStorage,
    settings: &Settings,
    reporter: &impl ProgressReporter,
) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::Storage);
    let bucket = &settings.bucket;

    reporter.step(&format!("checking bucket gs://{bucket}..."));
    if cloud
        .bucket_exists(bucket)
        .await
        .context("checking storage bucket")?
    {
        reporter.success(&format!("bucket gs://{bucket} exists"));
        return Ok(report);
    }

    reporter.step(&format!("creating bucket gs://{bucket} in {}...", settings.region));
    let applied = cloud
        .create_bucket(bucket, &settings.region)
        .await
        .context("creating storage bucket")?;
    report.record(&applied, reporter);
    if !applied.is_dry_run() {
        reporter.success(&format!("bucket gs://{bucket} created"));
    }
    Ok(report)
}
