//! Deployment stages, toggles, and the fixed resource lists they provision.

use std::fmt;

/// APIs the pipeline needs enabled on the project.
pub const REQUIRED_APIS: &[&str] = &[
    "appengine.googleapis.com",
    "bigquery.googleapis.com",
    "cloudbuild.googleapis.com",
    "cloudfunctions.googleapis.com",
    "cloudscheduler.googleapis.com",
    "dfareporting.googleapis.com",
    "iamcredentials.googleapis.com",
    "pubsub.googleapis.com",
    "storage-api.googleapis.com",
];

/// Project roles granted to the pipeline service account.
pub const REQUIRED_ROLES: &[&str] = &[
    "roles/bigquery.dataViewer",
    "roles/bigquery.jobUser",
    "roles/iam.serviceAccountTokenCreator",
    "roles/pubsub.publisher",
    "roles/storage.objectAdmin",
];

/// One provisioning stage, selected by a CLI toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ActivateApis,
    ServiceAccount,
    BigQuery,
    Storage,
    Delegator,
    Cm360Function,
}

impl Stage {
    /// Execution order. The service account precedes both function stages.
    pub const ORDER: [Stage; 6] = [
        Stage::ActivateApis,
        Stage::ServiceAccount,
        Stage::BigQuery,
        Stage::Storage,
        Stage::Delegator,
        Stage::Cm360Function,
    ];

    /// The CLI flag enabling this stage.
    #[must_use]
    pub fn flag(self) -> &'static str {
        match self {
            Self::ActivateApis => "--activate-apis",
            Self::ServiceAccount => "--create-service-account",
            Self::BigQuery => "--deploy-bigquery",
            Self::Storage => "--deploy-storage",
            Self::Delegator => "--deploy-delegator",
            Self::Cm360Function => "--deploy-cm360-function",
        }
    }

    /// CLI tools this stage shells out to.
    #[must_use]
    pub fn tools(self) -> &'static [&'static str] {
        match self {
            Self::BigQuery => &["bq"],
            Self::Storage => &["gsutil"],
            _ => &["gcloud"],
        }
    }

    /// `true` for stages that upload function source code.
    #[must_use]
    pub fn deploys_function(self) -> bool {
        matches!(self, Self::Delegator | Self::Cm360Function)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ActivateApis => "APIs",
            Self::ServiceAccount => "service account",
            Self::BigQuery => "BigQuery dataset",
            Self::Storage => "storage bucket",
            Self::Delegator => "delegator function",
            Self::Cm360Function => "CM360 function",
        };
        f.write_str(label)
    }
}

/// Boolean deployment toggles after `--deploy-all` expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployToggles {
    pub activate_apis: bool,
    pub create_service_account: bool,
    pub deploy_bigquery: bool,
    pub deploy_storage: bool,
    pub deploy_delegator: bool,
    pub deploy_cm360_function: bool,
}

impl DeployToggles {
    /// Apply `--deploy-all`: sets the five downstream deployment toggles.
    /// API activation stays opt-in.
    #[must_use]
    pub fn with_deploy_all(mut self, deploy_all: bool) -> Self {
        if deploy_all {
            self.create_service_account = true;
            self.deploy_bigquery = true;
            self.deploy_storage = true;
            self.deploy_delegator = true;
            self.deploy_cm360_function = true;
        }
        self
    }

    #[must_use]
    pub fn is_enabled(&self, stage: Stage) -> bool {
        match stage {
            Stage::ActivateApis => self.activate_apis,
            Stage::ServiceAccount => self.create_service_account,
            Stage::BigQuery => self.deploy_bigquery,
            Stage::Storage => self.deploy_storage,
            Stage::Delegator => self.deploy_delegator,
            Stage::Cm360Function => self.deploy_cm360_function,
        }
    }

    /// Enabled stages in execution order.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ORDER
            .into_iter()
            .filter(|s| self.is_enabled(*s))
            .collect()
    }

    /// Distinct CLI tools required by the enabled stages.
    #[must_use]
    pub fn required_tools(&self) -> Vec<&'static str> {
        let mut tools: Vec<&'static str> = Vec::new();
        for tool in self.stages().into_iter().flat_map(|s| s.tools().iter().copied()) {
            if !tools.contains(&tool) {
                tools.push(tool);
            }
        }
        tools
    }
}
