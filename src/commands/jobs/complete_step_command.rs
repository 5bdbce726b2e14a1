use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Idempotent: completing an already-completed step is a no-op, so retried
/// requests from the field do not corrupt state.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompleteStepCommand {
    #[serde(default)]
    pub job_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub step_code: String,
    /// Caller-supplied elapsed time; bounds-checked by the tracker.
    pub elapsed_minutes: i64,
}
