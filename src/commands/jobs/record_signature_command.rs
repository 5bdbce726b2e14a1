use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::job::{EntityRef, SignatureKind};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordSignatureCommand {
    #[serde(default)]
    pub job_id: Uuid,
    pub kind: SignatureKind,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub signer: Option<EntityRef>,
    #[serde(default)]
    pub image_url: Option<String>,
}
