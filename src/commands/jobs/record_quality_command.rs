use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::job::QualityOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordQualityCommand {
    #[serde(default)]
    pub job_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub step_code: String,
    #[validate(length(min = 1, max = 64))]
    pub key: String,
    pub outcome: QualityOutcome,
}
