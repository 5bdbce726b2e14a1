use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::services::materials::MaterialUsageInput;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddMaterialCommand {
    #[serde(default)]
    pub job_id: Uuid,
    #[validate]
    pub usage: MaterialUsageInput,
}
