use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PauseJobCommand {
    #[serde(default)]
    pub job_id: Uuid,
    /// Why work stopped (weather, missing parts, access denied, ...).
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}
