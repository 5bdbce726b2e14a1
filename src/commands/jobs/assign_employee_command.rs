use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::job::{AssigneeRole, EntityRef};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_allocation"))]
pub struct AssignEmployeeCommand {
    #[serde(default)]
    pub job_id: Uuid,
    /// Employee reference; resolved against the directory before the
    /// assignment is accepted.
    pub employee: EntityRef,
    pub role: AssigneeRole,
    #[serde(default)]
    pub planned_minutes: i64,
}

fn validate_allocation(command: &AssignEmployeeCommand) -> Result<(), ValidationError> {
    if command.planned_minutes < 0 {
        return Err(ValidationError::new("negative_planned_minutes"));
    }
    Ok(())
}
