//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Errors that stop a deployment run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("--project is required (pass it on the command line or set `project` in the config file)")]
    MissingProject,

    #[error("Invalid {kind} '{value}': {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("{tool} not found on PATH. Install the Google Cloud SDK: https://cloud.google.com/sdk/docs/install")]
    ToolMissing { tool: String },

    #[error("{tool} is on PATH but `{tool} --version` failed: {detail}")]
    ToolBroken { tool: String, detail: String },

    #[error("Function source not found: {}", path.display())]
    MissingSource { path: PathBuf },

    #[error("`{command}` failed ({})\n{stderr}", exit_code.map_or_else(|| "killed by signal".to_string(), |c| format!("exit code {c}")))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to loading the deploy configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Cannot parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}
