use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::services::steps::StepDefinition;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertStepCommand {
    #[serde(default)]
    pub job_id: Uuid,
    #[validate]
    pub step: StepDefinition,
}
