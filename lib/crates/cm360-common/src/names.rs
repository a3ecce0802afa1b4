//! Resource names shared by the deployer and the deployed functions.

/// Pub/Sub topic the scheduler publishes to; triggers the delegator.
pub const DELEGATOR_TOPIC: &str = "conversion_upload_delegator";

/// Pub/Sub topic the delegator fans conversion batches out to.
pub const CM360_UPLOAD_TOPIC: &str = "cm360_conversion_upload";

/// Cloud Function reading the daily conversions table.
pub const DELEGATOR_FUNCTION: &str = "cm360_conversion_upload_delegator";

/// Cloud Function inserting conversion batches through the CM360 API.
pub const CM360_FUNCTION: &str = "cm360_cloud_conversion_upload_node";

/// Source directory of the delegator function, relative to the source root.
pub const DELEGATOR_FUNCTION_SOURCE: &str = "converion_upload_delegator";

/// Source directory of the CM360 function, relative to the source root.
pub const CM360_FUNCTION_SOURCE: &str = "CM360_cloud_conversion_upload_node";

/// Python entry point exported by both functions.
pub const ENTRY_POINT: &str = "main";

/// Cloud Scheduler job kicking off the daily upload.
pub const SCHEDULER_JOB: &str = "cm360_scheduled_conversion_upload";
