use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CancelJobCommand {
    #[serde(default)]
    pub job_id: Uuid,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}
