use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ToggleChecklistCommand {
    #[serde(default)]
    pub job_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub step_code: String,
    pub item_index: usize,
    pub checked: bool,
    /// Photo evidence for the item, replacing previously attached urls.
    #[serde(default)]
    pub photo_urls: Option<Vec<String>>,
    #[serde(default)]
    pub note: Option<String>,
}
