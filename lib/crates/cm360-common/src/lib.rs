pub mod names;
pub mod types;

pub use names::{
    CM360_FUNCTION, CM360_FUNCTION_SOURCE, CM360_UPLOAD_TOPIC, DELEGATOR_FUNCTION,
    DELEGATOR_FUNCTION_SOURCE, DELEGATOR_TOPIC, ENTRY_POINT, SCHEDULER_JOB,
};
pub use types::*;
