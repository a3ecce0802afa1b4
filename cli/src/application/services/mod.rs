//! Application services: use-case orchestration.
//!
//! Each service module implements one deployment stage by composing domain
//! logic with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod apis;
pub mod datastores;
pub mod deploy;
pub mod functions;
pub mod preflight;
pub mod report;
pub mod service_account;
