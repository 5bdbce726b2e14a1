use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Register the frozen finance snapshot with the invoicing system and store
/// the returned references. Allowed exactly once, on a completed job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttachInvoiceCommand {
    #[serde(default)]
    pub job_id: Uuid,
}
