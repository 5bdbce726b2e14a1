use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::job::{EntityRef, JobPriority, JobSource};
use crate::services::steps::StepDefinition;

/// Creatable fields of a job. Identity, tenant, timestamps and every derived
/// field are engine-computed; they are not part of this payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateJobCommand {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(custom = "validate_locale_map")]
    pub title: BTreeMap<String, String>,
    #[serde(default)]
    pub description: BTreeMap<String, String>,
    #[serde(default = "default_source")]
    pub source: JobSource,
    #[serde(default = "default_priority")]
    pub priority: JobPriority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub billable: bool,
    #[serde(default)]
    pub apartment: Option<EntityRef>,
    #[serde(default)]
    pub service: Option<EntityRef>,
    #[serde(default)]
    pub contract: Option<EntityRef>,
    #[serde(default)]
    pub category: Option<EntityRef>,
    /// Initial step definitions; more can be added while the job is a draft.
    #[serde(default)]
    #[validate]
    pub steps: Vec<StepDefinition>,
}

fn default_source() -> JobSource {
    JobSource::Manual
}

fn default_priority() -> JobPriority {
    JobPriority::Normal
}

fn default_true() -> bool {
    true
}

fn validate_locale_map(map: &BTreeMap<String, String>) -> Result<(), ValidationError> {
    if map.is_empty() {
        return Err(ValidationError::new("empty_locale_map"));
    }
    if map.iter().any(|(locale, text)| {
        locale.is_empty() || locale.len() > 8 || text.trim().is_empty()
    }) {
        return Err(ValidationError::new("invalid_locale_entry"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_must_carry_at_least_one_locale() {
        let command: CreateJobCommand = serde_json::from_value(serde_json::json!({
            "code": "JOB-1",
            "title": {},
        }))
        .unwrap();
        assert!(command.validate().is_err());

        let command: CreateJobCommand = serde_json::from_value(serde_json::json!({
            "code": "JOB-1",
            "title": { "en": "Radiator bleed" },
        }))
        .unwrap();
        assert!(command.validate().is_ok());
        assert!(command.billable);
        assert_eq!(command.priority, JobPriority::Normal);
    }
}
