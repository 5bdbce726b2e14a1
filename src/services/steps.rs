//! Step execution: checklist toggles, quality results, and the completion
//! gate. Step definitions are frozen once work starts so that what the
//! technician saw on site is what the audit trail shows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::job::{
    ChecklistItem, JobAggregate, QualityCheck, QualityOutcome, StepKind, StepResult,
};

/// Reject elapsed times beyond a week; retried mobile submissions have been
/// seen carrying garbage values.
pub const MAX_STEP_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ChecklistItemDefinition {
    #[validate(length(min = 1, max = 300))]
    pub label: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct StepDefinition {
    #[validate(length(min = 1, max = 64))]
    pub step_code: String,
    pub kind: StepKind,
    #[serde(default)]
    #[validate]
    pub checklist: Vec<ChecklistItemDefinition>,
    #[serde(default)]
    pub estimated_minutes: Option<i64>,
}

/// Insert a step or replace an existing definition with the same code.
/// Replacing resets execution state; only allowed while the job is still
/// being planned.
pub fn upsert_step(job: &mut JobAggregate, definition: StepDefinition) -> Result<(), ServiceError> {
    if !job.status.allows_step_definition() {
        return Err(job.invalid_transition("upsert_step"));
    }

    let step = StepResult {
        step_code: definition.step_code.clone(),
        kind: definition.kind,
        checklist: definition
            .checklist
            .into_iter()
            .map(|item| ChecklistItem {
                label: item.label,
                required: item.required,
                checked: false,
                photo_urls: Vec::new(),
                note: None,
            })
            .collect(),
        quality: Vec::new(),
        estimated_minutes: definition.estimated_minutes,
        actual_minutes: None,
        completed: false,
    };

    match job.step_mut(&step.step_code) {
        Some(existing) => *existing = step,
        None => job.steps.push(step),
    }
    Ok(())
}

pub fn remove_step(job: &mut JobAggregate, step_code: &str) -> Result<(), ServiceError> {
    if !job.status.allows_step_definition() {
        return Err(job.invalid_transition("remove_step"));
    }
    let index = job
        .steps
        .iter()
        .position(|s| s.step_code == step_code)
        .ok_or_else(|| ServiceError::StepNotFound(step_code.to_string()))?;
    job.steps.remove(index);
    Ok(())
}

/// Set a checklist item's checked state, optionally attaching photo evidence
/// and a note. Re-applying the same state is a no-op so that retried requests
/// from flaky field connectivity cannot corrupt state.
pub fn toggle_checklist(
    job: &mut JobAggregate,
    step_code: &str,
    item_index: usize,
    checked: bool,
    photo_urls: Option<Vec<String>>,
    note: Option<String>,
) -> Result<(), ServiceError> {
    if !job.status.allows_execution() {
        return Err(job.invalid_transition("toggle_checklist"));
    }
    let step = job
        .step_mut(step_code)
        .ok_or_else(|| ServiceError::StepNotFound(step_code.to_string()))?;
    let item = step.checklist.get_mut(item_index).ok_or_else(|| {
        ServiceError::ValidationError(format!(
            "step `{step_code}` has no checklist item {item_index}"
        ))
    })?;

    item.checked = checked;
    if let Some(urls) = photo_urls {
        item.photo_urls = urls;
    }
    if note.is_some() {
        item.note = note;
    }
    Ok(())
}

/// Record a typed quality result, replacing any previous result for the same
/// key.
pub fn record_quality(
    job: &mut JobAggregate,
    step_code: &str,
    key: String,
    outcome: QualityOutcome,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    if !job.status.allows_execution() {
        return Err(job.invalid_transition("record_quality"));
    }
    let step = job
        .step_mut(step_code)
        .ok_or_else(|| ServiceError::StepNotFound(step_code.to_string()))?;

    let check = QualityCheck {
        key,
        outcome,
        recorded_at: now,
    };
    match step.quality.iter_mut().find(|q| q.key == check.key) {
        Some(existing) => *existing = check,
        None => step.quality.push(check),
    }
    Ok(())
}

/// Mark a step complete. Idempotent: completing an already-completed step
/// returns `Ok(false)` and changes nothing. Returns `Ok(true)` when the step
/// transitioned.
pub fn complete_step(
    job: &mut JobAggregate,
    step_code: &str,
    elapsed_minutes: i64,
) -> Result<bool, ServiceError> {
    if !job.status.allows_execution() {
        return Err(job.invalid_transition("complete_step"));
    }
    let step = job
        .step_mut(step_code)
        .ok_or_else(|| ServiceError::StepNotFound(step_code.to_string()))?;

    if step.completed {
        return Ok(false);
    }
    if !(0..=MAX_STEP_MINUTES).contains(&elapsed_minutes) {
        return Err(ServiceError::InvalidDuration(elapsed_minutes));
    }
    let pending = step.pending_required_items();
    if !pending.is_empty() {
        return Err(ServiceError::RequiredItemsPending {
            step_code: step_code.to_string(),
            pending,
        });
    }

    step.completed = true;
    step.actual_minutes = Some(elapsed_minutes);
    Ok(true)
}
