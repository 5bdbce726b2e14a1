use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UnassignEmployeeCommand {
    #[serde(default)]
    pub job_id: Uuid,
    pub employee_id: Uuid,
}
