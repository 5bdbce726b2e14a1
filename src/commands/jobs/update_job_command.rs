use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::job::JobPriority;

/// Patch of the fields not governed by a lifecycle command. Status, schedule
/// timestamps and derived figures are deliberately typed as opaque values
/// here: if a caller sends one, the patch is rejected with
/// `UseLifecycleCommand` instead of being silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateJobCommand {
    #[serde(default)]
    pub job_id: Uuid,
    #[serde(default)]
    pub title: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub description: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub priority: Option<JobPriority>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub billable: Option<bool>,

    // Lifecycle-governed fields; present means the caller used the wrong
    // surface.
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub planned_start: Option<serde_json::Value>,
    #[serde(default)]
    pub planned_end: Option<serde_json::Value>,
    #[serde(default)]
    pub due_at: Option<serde_json::Value>,
    #[serde(default)]
    pub started_at: Option<serde_json::Value>,
    #[serde(default)]
    pub paused_at: Option<serde_json::Value>,
    #[serde(default)]
    pub resumed_at: Option<serde_json::Value>,
    #[serde(default)]
    pub completed_at: Option<serde_json::Value>,
    #[serde(default)]
    pub cancelled_at: Option<serde_json::Value>,
    #[serde(default)]
    pub actual_duration_minutes: Option<serde_json::Value>,
    #[serde(default)]
    pub on_time: Option<serde_json::Value>,
    #[serde(default)]
    pub finance: Option<serde_json::Value>,
}

impl UpdateJobCommand {
    /// First lifecycle-governed field present in the patch, if any.
    pub fn rejected_field(&self) -> Option<&'static str> {
        if self.status.is_some() {
            Some("status")
        } else if self.planned_start.is_some() {
            Some("planned_start")
        } else if self.planned_end.is_some() {
            Some("planned_end")
        } else if self.due_at.is_some() {
            Some("due_at")
        } else if self.started_at.is_some() {
            Some("started_at")
        } else if self.paused_at.is_some() {
            Some("paused_at")
        } else if self.resumed_at.is_some() {
            Some("resumed_at")
        } else if self.completed_at.is_some() {
            Some("completed_at")
        } else if self.cancelled_at.is_some() {
            Some("cancelled_at")
        } else if self.actual_duration_minutes.is_some() {
            Some("actual_duration_minutes")
        } else if self.on_time.is_some() {
            Some("on_time")
        } else if self.finance.is_some() {
            Some("finance")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_status_patch_is_flagged() {
        let command: UpdateJobCommand = serde_json::from_value(serde_json::json!({
            "tags": ["winter"],
            "status": "completed",
        }))
        .unwrap();
        assert_eq!(command.rejected_field(), Some("status"));
    }

    #[test]
    fn derived_figures_cannot_be_patched() {
        let command: UpdateJobCommand = serde_json::from_value(serde_json::json!({
            "actual_duration_minutes": 5,
        }))
        .unwrap();
        assert_eq!(command.rejected_field(), Some("actual_duration_minutes"));
    }

    #[test]
    fn plain_patch_passes() {
        let command: UpdateJobCommand = serde_json::from_value(serde_json::json!({
            "tags": ["winter"],
            "priority": "high",
        }))
        .unwrap();
        assert_eq!(command.rejected_field(), None);
    }
}
