//! Domain layer: pure deployment logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod plan;

pub use command::{Applied, CommandLine};
pub use config::{DeployConfig, Overrides, Settings};
pub use error::{ConfigError, DeployError};
pub use plan::{DeployToggles, REQUIRED_APIS, REQUIRED_ROLES, Stage};
