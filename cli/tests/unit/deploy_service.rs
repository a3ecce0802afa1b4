//! Unit tests for the `deploy` use-case.
//!
//! The real `GcloudProvisioner` runs over a scripted `MockCommandRunner`, so
//! these cover stage ordering, idempotence, the scheduler's best-effort
//! handling, preflight checks, and dry-run echoing end to end.

#![allow(clippy::expect_used)]

use anyhow::Result;
use cm360_common::DelegatorRequest;
use cm360_deploy::application::services::deploy::{DeployOptions, DeployOutcome, deploy};
use cm360_deploy::domain::{DeployError, DeployToggles, REQUIRED_APIS, REQUIRED_ROLES, Settings, Stage};

use crate::mocks::{
    FakeFs, MockCommandRunner, RecordingReporter, err_output, fresh_project, not_on_path,
    provisioned_project, provisioner, settings, settings_without_ids,
};

fn everything() -> DeployToggles {
    DeployToggles {
        activate_apis: true,
        ..DeployToggles::default()
    }
    .with_deploy_all(true)
}

fn functions_only() -> DeployToggles {
    DeployToggles {
        deploy_delegator: true,
        deploy_cm360_function: true,
        ..DeployToggles::default()
    }
}

async fn run(
    runner: &MockCommandRunner,
    reporter: &RecordingReporter,
    settings: &Settings,
    toggles: DeployToggles,
    dry_run: bool,
    dirs_exist: bool,
) -> Result<DeployOutcome> {
    let cloud = provisioner(runner, dry_run);
    deploy(
        &cloud,
        &cloud,
        &FakeFs { dirs_exist },
        DeployOptions {
            reporter,
            settings,
            toggles,
            dry_run,
        },
    )
    .await
}

fn deploy_error(err: &anyhow::Error) -> Option<&DeployError> {
    err.chain().find_map(|e| e.downcast_ref::<DeployError>())
}

// ── Fresh project ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fresh_project_creates_everything_in_stage_order() {
    let runner = MockCommandRunner::new(fresh_project);
    let reporter = RecordingReporter::default();

    let outcome = run(&runner, &reporter, &settings(), everything(), false, true)
        .await
        .expect("deploy");

    let stages: Vec<Stage> = outcome.reports.iter().map(|r| r.stage).collect();
    assert_eq!(stages, Stage::ORDER);
    assert_eq!(outcome.warnings(), 0);
    assert!(!outcome.dry_run);

    let milestones = [
        "gcloud services enable",
        "gcloud iam service-accounts create cm360-conversion-upload",
        "bq --project_id=my-project --location=US mk --dataset",
        "gsutil mb -p my-project -l us-central1 gs://my-project-cm360-conversion-upload",
        "gcloud pubsub topics create conversion_upload_delegator",
        "gcloud functions deploy cm360_conversion_upload_delegator",
        "gcloud scheduler jobs create pubsub cm360_scheduled_conversion_upload",
        "gcloud pubsub topics create cm360_conversion_upload",
        "gcloud functions deploy cm360_cloud_conversion_upload_node",
    ];
    let positions: Vec<usize> = milestones
        .iter()
        .map(|m| runner.position(m).unwrap_or_else(|| panic!("missing: {m}")))
        .collect();
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "out of order: {:?}",
        runner.command_lines()
    );
}

#[tokio::test]
async fn test_prerequisites_are_probed_before_any_cloud_call() {
    let runner = MockCommandRunner::new(fresh_project);
    let reporter = RecordingReporter::default();

    run(&runner, &reporter, &settings(), everything(), false, true)
        .await
        .expect("deploy");

    let lines = runner.command_lines();
    assert_eq!(lines[..3], ["gcloud --version", "bq --version", "gsutil --version"]);
}

#[tokio::test]
async fn test_activate_apis_enables_only_missing_services() {
    let runner = MockCommandRunner::new(fresh_project);
    let reporter = RecordingReporter::default();
    let toggles = DeployToggles {
        activate_apis: true,
        ..DeployToggles::default()
    };

    run(&runner, &reporter, &settings(), toggles, false, true)
        .await
        .expect("deploy");

    let (_, args) = runner
        .calls()
        .into_iter()
        .find(|(_, args)| args.get(1).is_some_and(|a| a == "enable"))
        .expect("services enable called");
    assert!(!args.contains(&"bigquery.googleapis.com".to_string()));
    for api in REQUIRED_APIS.iter().filter(|a| **a != "bigquery.googleapis.com") {
        assert!(args.contains(&(*api).to_string()), "missing {api} in {args:?}");
    }
}

#[tokio::test]
async fn test_service_account_binds_every_role() {
    let runner = MockCommandRunner::new(fresh_project);
    let reporter = RecordingReporter::default();
    let toggles = DeployToggles {
        create_service_account: true,
        ..DeployToggles::default()
    };

    let outcome = run(&runner, &reporter, &settings(), toggles, false, true)
        .await
        .expect("deploy");

    let bindings: Vec<String> = runner
        .command_lines()
        .into_iter()
        .filter(|l| l.contains("add-iam-policy-binding"))
        .collect();
    assert_eq!(bindings.len(), REQUIRED_ROLES.len());
    for role in REQUIRED_ROLES {
        assert!(
            bindings.iter().any(|b| b.contains(role)),
            "role {role} not bound"
        );
    }
    assert!(bindings.iter().all(|b| {
        b.contains("--member serviceAccount:cm360-conversion-upload@my-project.iam.gserviceaccount.com")
    }));
    assert_eq!(outcome.reports[0].changed, 1);
    assert_eq!(outcome.reports[0].confirmed, REQUIRED_ROLES.len());
}

// ── Idempotence ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_existing_resources_are_not_recreated() {
    let runner = MockCommandRunner::new(provisioned_project);
    let reporter = RecordingReporter::default();

    let outcome = run(&runner, &reporter, &settings(), everything(), false, true)
        .await
        .expect("deploy");

    assert!(!runner.ran("services enable"));
    assert!(!runner.ran("service-accounts create"));
    assert!(!runner.ran(" mk "));
    assert!(!runner.ran("gsutil mb"));
    assert!(!runner.ran("topics create"));

    let by_stage = |stage: Stage| {
        outcome
            .reports
            .iter()
            .find(|r| r.stage == stage)
            .expect("stage ran")
    };
    assert!(by_stage(Stage::ActivateApis).is_unchanged());
    assert!(by_stage(Stage::BigQuery).is_unchanged());
    assert!(by_stage(Stage::Storage).is_unchanged());
    // Bindings and function deploys always run.
    let account = by_stage(Stage::ServiceAccount);
    assert!(account.is_unchanged(), "got: {account:?}");
    assert_eq!(account.confirmed, REQUIRED_ROLES.len());
    assert_eq!(by_stage(Stage::Cm360Function).changed, 1);
}

// ── Scheduler is best-effort ──────────────────────────────────────────────────

#[tokio::test]
async fn test_scheduler_failures_warn_and_continue() {
    let runner = MockCommandRunner::new(|program, args| {
        if args.first().is_some_and(|a| a == "scheduler") {
            return Ok(err_output(1, b"PERMISSION_DENIED: cloudscheduler.jobs.create"));
        }
        fresh_project(program, args)
    });
    let reporter = RecordingReporter::default();

    let outcome = run(&runner, &reporter, &settings(), functions_only(), false, true)
        .await
        .expect("scheduler failures must not abort");

    assert_eq!(outcome.warnings(), 2);
    let warnings = reporter.of_kind("warn");
    assert!(warnings.iter().any(|w| w.contains("could not delete scheduler job")));
    assert!(warnings.iter().any(|w| w.contains("could not create scheduler job")));
    assert!(warnings.iter().any(|w| w.contains("PERMISSION_DENIED")));
    assert!(runner.ran("functions deploy cm360_cloud_conversion_upload_node"));
}

#[tokio::test]
async fn test_only_the_delegator_gets_the_project_env_var() {
    let runner = MockCommandRunner::new(fresh_project);
    let reporter = RecordingReporter::default();

    run(&runner, &reporter, &settings(), functions_only(), false, true)
        .await
        .expect("deploy");

    let deploy_args = |name: &str| {
        runner
            .calls()
            .into_iter()
            .find(|(_, args)| args.len() > 2 && args[..2] == ["functions", "deploy"] && args[2] == name)
            .map(|(_, args)| args)
            .unwrap_or_else(|| panic!("{name} not deployed"))
    };

    let delegator = deploy_args("cm360_conversion_upload_delegator");
    let env = delegator
        .iter()
        .position(|a| a == "--set-env-vars")
        .and_then(|i| delegator.get(i + 1));
    assert_eq!(env.map(String::as_str), Some("GCP_PROJECT=my-project"));
    assert!(delegator.contains(&"--no-gen2".to_string()));

    let upload = deploy_args("cm360_cloud_conversion_upload_node");
    assert!(!upload.contains(&"--set-env-vars".to_string()), "got: {upload:?}");
    assert!(upload.contains(&"--no-gen2".to_string()));
}

#[tokio::test]
async fn test_scheduler_payload_matches_delegator_contract() {
    let runner = MockCommandRunner::new(fresh_project);
    let reporter = RecordingReporter::default();

    run(&runner, &reporter, &settings(), functions_only(), false, true)
        .await
        .expect("deploy");

    let (_, args) = runner
        .calls()
        .into_iter()
        .find(|(_, args)| args.iter().any(|a| a == "pubsub") && args.iter().any(|a| a == "jobs"))
        .expect("scheduler job created");
    let body = args
        .iter()
        .position(|a| a == "--message-body")
        .and_then(|i| args.get(i + 1))
        .expect("message body");

    let request = DelegatorRequest::from_message_body(body).expect("valid payload");
    assert_eq!(request.table_name, "cm360_conversions");
    assert_eq!(request.topic, "cm360_conversion_upload");
    let config = request.cm360_config.expect("cm360 config");
    assert_eq!(config.profile_id.as_deref(), Some("1234567"));
    assert_eq!(config.floodlight_activity_id.as_deref(), Some("7654321"));
    assert_eq!(config.floodlight_configuration_id.as_deref(), Some("1111111"));

    let json: serde_json::Value = serde_json::from_str(body).expect("json");
    assert!(json.get("table_name").is_some());
    assert!(json["cm360_config"].get("profile_id").is_some());
}

#[tokio::test]
async fn test_incomplete_cm360_ids_warn() {
    let runner = MockCommandRunner::new(fresh_project);
    let reporter = RecordingReporter::default();
    let toggles = DeployToggles {
        deploy_delegator: true,
        ..DeployToggles::default()
    };

    let outcome = run(&runner, &reporter, &settings_without_ids(), toggles, false, true)
        .await
        .expect("deploy");

    assert_eq!(outcome.warnings(), 1);
    assert!(
        reporter.of_kind("warn")[0].contains("scheduler payload is missing"),
        "got: {:?}",
        reporter.events()
    );
    assert!(runner.ran("scheduler jobs create pubsub"));
}

// ── Hard failures ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_function_deploy_failure_aborts_later_stages() {
    let runner = MockCommandRunner::new(|program, args| {
        if args.first().is_some_and(|a| a == "functions") {
            return Ok(err_output(2, b"Build failed: requirements.txt not found"));
        }
        fresh_project(program, args)
    });
    let reporter = RecordingReporter::default();

    let err = run(&runner, &reporter, &settings(), functions_only(), false, true)
        .await
        .expect_err("deploy should fail");

    assert!(
        format!("{err:#}").contains("deploying function cm360_conversion_upload_delegator"),
        "got: {err:#}"
    );
    match deploy_error(&err) {
        Some(DeployError::CommandFailed { exit_code, stderr, .. }) => {
            assert_eq!(*exit_code, Some(2));
            assert!(stderr.contains("requirements.txt"));
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
    assert!(!runner.ran("scheduler"));
    assert!(!runner.ran("cm360_conversion_upload "));
    assert!(!runner.ran("cm360_cloud_conversion_upload_node"));
}

#[tokio::test]
async fn test_missing_tool_stops_before_cloud_calls() {
    let runner = MockCommandRunner::new(|program, args| {
        if program == "gsutil" {
            return Err(not_on_path(program));
        }
        fresh_project(program, args)
    });
    let reporter = RecordingReporter::default();
    let toggles = DeployToggles {
        deploy_bigquery: true,
        deploy_storage: true,
        ..DeployToggles::default()
    };

    let err = run(&runner, &reporter, &settings(), toggles, false, true)
        .await
        .expect_err("should fail");

    match deploy_error(&err) {
        Some(DeployError::ToolMissing { tool }) => assert_eq!(tool, "gsutil"),
        other => panic!("expected ToolMissing, got {other:?}"),
    }
    assert_eq!(runner.command_lines(), ["bq --version", "gsutil --version"]);
}

#[tokio::test]
async fn test_tool_that_fails_version_is_not_reported_missing() {
    let runner = MockCommandRunner::new(|program, args| {
        if program == "bq" {
            return Ok(err_output(2, b"Traceback: bq is misconfigured"));
        }
        fresh_project(program, args)
    });
    let reporter = RecordingReporter::default();
    let toggles = DeployToggles {
        deploy_bigquery: true,
        ..DeployToggles::default()
    };

    let err = run(&runner, &reporter, &settings(), toggles, false, true)
        .await
        .expect_err("should fail");

    match deploy_error(&err) {
        Some(DeployError::ToolBroken { tool, detail }) => {
            assert_eq!(tool, "bq");
            assert!(detail.contains("exit code 2"), "got: {detail}");
            assert!(detail.contains("misconfigured"), "got: {detail}");
        }
        other => panic!("expected ToolBroken, got {other:?}"),
    }
    assert!(!format!("{err:#}").contains("not found on PATH"));
    assert_eq!(runner.command_lines(), ["bq --version"]);
}

#[tokio::test]
async fn test_missing_function_source_is_error() {
    let runner = MockCommandRunner::new(fresh_project);
    let reporter = RecordingReporter::default();
    let toggles = DeployToggles {
        deploy_cm360_function: true,
        ..DeployToggles::default()
    };

    let err = run(&runner, &reporter, &settings(), toggles, false, false)
        .await
        .expect_err("should fail");

    match deploy_error(&err) {
        Some(DeployError::MissingSource { path }) => {
            assert!(path.ends_with("CM360_cloud_conversion_upload_node"), "got: {}", path.display());
        }
        other => panic!("expected MissingSource, got {other:?}"),
    }
    assert!(!runner.ran("functions deploy"));
}

// ── Dry run ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_dry_run_executes_nothing_and_echoes_mutations() {
    let runner = MockCommandRunner::always_ok();
    let reporter = RecordingReporter::default();

    let outcome = run(&runner, &reporter, &settings(), everything(), true, false)
        .await
        .expect("dry run");

    assert!(runner.calls().is_empty(), "executed: {:?}", runner.command_lines());
    assert!(outcome.dry_run);
    assert!(outcome.reports.iter().all(|r| r.changed == 0 && r.planned > 0));

    let echoed = reporter.of_kind("dry-run");
    assert!(echoed.iter().any(|c| c.starts_with("gcloud services enable")));
    assert!(echoed.iter().any(|c| {
        c == "gsutil mb -p my-project -l us-central1 gs://my-project-cm360-conversion-upload"
    }));
    assert!(echoed.iter().any(|c| c.contains("--schedule '0 6 * * *'")));

    // Missing function sources only warn in dry-run mode.
    let warnings = reporter.of_kind("warn");
    assert_eq!(
        warnings
            .iter()
            .filter(|w| w.starts_with("function source not found"))
            .count(),
        2
    );
}
