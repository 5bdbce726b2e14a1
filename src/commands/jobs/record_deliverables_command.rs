use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Merge photo sets, notes and attachments into the job's deliverables.
/// Lists are appended; the note replaces the previous one when present.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordDeliverablesCommand {
    #[serde(default)]
    pub job_id: Uuid,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub before_photos: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub after_photos: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub attachments: Vec<String>,
}
