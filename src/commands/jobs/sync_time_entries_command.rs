use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Attach external time-entry records to an assignment and recompute its
/// `actual_minutes` from the time-tracking store. The recomputation is the
/// only writer of that field.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SyncTimeEntriesCommand {
    #[serde(default)]
    pub job_id: Uuid,
    pub employee_id: Uuid,
    #[validate(length(max = 500))]
    pub time_entry_refs: Vec<Uuid>,
}
