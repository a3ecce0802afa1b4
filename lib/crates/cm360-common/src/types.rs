use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while encoding or decoding pipeline messages.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("cannot encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("cannot decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

/// CM360 identifiers the upload function needs to insert conversions.
///
/// Fields that were not configured are omitted from the JSON so the
/// receiving function reports them as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cm360Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floodlight_activity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floodlight_configuration_id: Option<String>,
}

impl Cm360Config {
    /// `true` when profile, activity, and configuration ids are all set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.profile_id.is_some()
            && self.floodlight_activity_id.is_some()
            && self.floodlight_configuration_id.is_some()
    }

    /// Names of the ids that are not set, in payload key order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.profile_id.is_none() {
            missing.push("profile_id");
        }
        if self.floodlight_activity_id.is_none() {
            missing.push("floodlight_activity_id");
        }
        if self.floodlight_configuration_id.is_none() {
            missing.push("floodlight_configuration_id");
        }
        missing
    }
}

/// Payload the scheduler job publishes to the delegator topic.
///
/// ```json
/// {
///   "table_name": "table",
///   "topic": "topic",
///   "cm360_config": {
///     "profile_id": "",
///     "floodlight_activity_id": "",
///     "floodlight_configuration_id": ""
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatorRequest {
    /// BigQuery table holding today's conversions.
    pub table_name: String,
    /// Topic the delegator publishes conversion batches to.
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cm360_config: Option<Cm360Config>,
}

impl DelegatorRequest {
    /// Serialize to the compact JSON string used as a Pub/Sub message body.
    pub fn to_message_body(&self) -> Result<String, MessageError> {
        serde_json::to_string(self).map_err(MessageError::Encode)
    }

    /// Parse a Pub/Sub message body.
    pub fn from_message_body(body: &str) -> Result<Self, MessageError> {
        serde_json::from_str(body).map_err(MessageError::Decode)
    }
}
