//! Persistence shape of a job. Scalar/filterable attributes are first-class
//! columns; owned collections travel as Json payloads and are replaced
//! wholesale on save, so a row is always one consistent aggregate version.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::job::{JobAggregate, JobPriority, JobSource, JobStatus, Schedule};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant: String,
    pub code: String,
    #[sea_orm(column_type = "Json")]
    pub title: serde_json::Value,
    #[sea_orm(column_type = "Json")]
    pub description: serde_json::Value,
    pub source: JobSource,
    pub status: JobStatus,
    pub priority: JobPriority,
    #[sea_orm(column_type = "Json")]
    pub tags: serde_json::Value,
    pub is_active: bool,
    pub apartment_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub contract_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub planned_start: Option<DateTime<Utc>>,
    pub planned_end: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub accrued_seconds: i64,
    pub actual_duration_minutes: Option<i64>,
    pub on_time: Option<bool>,
    /// Comma-joined assignee ids; lets SQL filter by employee without
    /// unpacking the assignments payload.
    pub assignee_ids: String,
    #[sea_orm(column_type = "Json")]
    pub assignments: serde_json::Value,
    #[sea_orm(column_type = "Json")]
    pub steps: serde_json::Value,
    #[sea_orm(column_type = "Json")]
    pub materials: serde_json::Value,
    #[sea_orm(column_type = "Json", nullable)]
    pub deliverables: Option<serde_json::Value>,
    #[sea_orm(column_type = "Json")]
    pub finance: serde_json::Value,
    pub pause_reason: Option<String>,
    pub cancel_reason: Option<String>,
    /// Lowercased code plus localized titles, for the `q` free-text filter.
    pub search_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(value)
        .map_err(|e| ServiceError::SerializationError(format!("encoding {what}: {e}")))
}

fn from_json<T: DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> Result<T, ServiceError> {
    serde_json::from_value(value)
        .map_err(|e| ServiceError::SerializationError(format!("decoding {what}: {e}")))
}

pub fn assignee_ids(job: &JobAggregate) -> String {
    job.assignments
        .iter()
        .map(|a| a.employee_ref.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn search_text(job: &JobAggregate) -> String {
    let mut parts = vec![job.code.to_lowercase()];
    parts.extend(job.title.values().map(|t| t.to_lowercase()));
    parts.join(" ")
}

impl Model {
    pub fn into_aggregate(self) -> Result<JobAggregate, ServiceError> {
        Ok(JobAggregate {
            id: self.id,
            tenant: self.tenant,
            code: self.code,
            title: from_json(self.title, "title")?,
            description: from_json(self.description, "description")?,
            source: self.source,
            status: self.status,
            priority: self.priority,
            tags: from_json(self.tags, "tags")?,
            is_active: self.is_active,
            apartment_ref: self.apartment_id,
            service_ref: self.service_id,
            contract_ref: self.contract_id,
            category_ref: self.category_id,
            schedule: Schedule {
                planned_start: self.planned_start,
                planned_end: self.planned_end,
                due_at: self.due_at,
                started_at: self.started_at,
                paused_at: self.paused_at,
                resumed_at: self.resumed_at,
                completed_at: self.completed_at,
                cancelled_at: self.cancelled_at,
                accrued_seconds: self.accrued_seconds,
                actual_duration_minutes: self.actual_duration_minutes,
                on_time: self.on_time,
            },
            assignments: from_json(self.assignments, "assignments")?,
            steps: from_json(self.steps, "steps")?,
            materials: from_json(self.materials, "materials")?,
            deliverables: match self.deliverables {
                Some(value) => Some(from_json(value, "deliverables")?),
                None => None,
            },
            finance: from_json(self.finance, "finance")?,
            pause_reason: self.pause_reason,
            cancel_reason: self.cancel_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        })
    }
}

/// Build a fully-set active model for the aggregate at the given version.
/// Every column is written; saves replace the whole row atomically.
pub fn active_model_from(
    job: &JobAggregate,
    version: i32,
) -> Result<ActiveModel, ServiceError> {
    Ok(ActiveModel {
        id: Set(job.id),
        tenant: Set(job.tenant.clone()),
        code: Set(job.code.clone()),
        title: Set(to_json(&job.title, "title")?),
        description: Set(to_json(&job.description, "description")?),
        source: Set(job.source),
        status: Set(job.status),
        priority: Set(job.priority),
        tags: Set(to_json(&job.tags, "tags")?),
        is_active: Set(job.is_active),
        apartment_id: Set(job.apartment_ref),
        service_id: Set(job.service_ref),
        contract_id: Set(job.contract_ref),
        category_id: Set(job.category_ref),
        planned_start: Set(job.schedule.planned_start),
        planned_end: Set(job.schedule.planned_end),
        due_at: Set(job.schedule.due_at),
        started_at: Set(job.schedule.started_at),
        paused_at: Set(job.schedule.paused_at),
        resumed_at: Set(job.schedule.resumed_at),
        completed_at: Set(job.schedule.completed_at),
        cancelled_at: Set(job.schedule.cancelled_at),
        accrued_seconds: Set(job.schedule.accrued_seconds),
        actual_duration_minutes: Set(job.schedule.actual_duration_minutes),
        on_time: Set(job.schedule.on_time),
        assignee_ids: Set(assignee_ids(job)),
        assignments: Set(to_json(&job.assignments, "assignments")?),
        steps: Set(to_json(&job.steps, "steps")?),
        materials: Set(to_json(&job.materials, "materials")?),
        deliverables: Set(match &job.deliverables {
            Some(d) => Some(to_json(d, "deliverables")?),
            None => None,
        }),
        finance: Set(to_json(&job.finance, "finance")?),
        pause_reason: Set(job.pause_reason.clone()),
        cancel_reason: Set(job.cancel_reason.clone()),
        search_text: Set(search_text(job)),
        created_at: Set(job.created_at),
        updated_at: Set(job.updated_at),
        version: Set(version),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{Assignment, AssigneeRole};
    use chrono::Utc;

    #[test]
    fn aggregate_round_trips_through_the_row_shape() {
        let mut job = JobAggregate::new("acme", "JOB-050", "EUR", Utc::now());
        job.title.insert("en".into(), "Boiler service".into());
        job.assignments.push(Assignment {
            employee_ref: Uuid::new_v4(),
            role: AssigneeRole::Lead,
            planned_minutes: 60,
            actual_minutes: 0,
            time_entry_refs: vec![],
        });

        let active = active_model_from(&job, 3).unwrap();
        let model = Model {
            id: job.id,
            tenant: job.tenant.clone(),
            code: job.code.clone(),
            title: active.title.clone().unwrap(),
            description: active.description.clone().unwrap(),
            source: job.source,
            status: job.status,
            priority: job.priority,
            tags: active.tags.clone().unwrap(),
            is_active: job.is_active,
            apartment_id: None,
            service_id: None,
            contract_id: None,
            category_id: None,
            planned_start: None,
            planned_end: None,
            due_at: None,
            started_at: None,
            paused_at: None,
            resumed_at: None,
            completed_at: None,
            cancelled_at: None,
            accrued_seconds: 0,
            actual_duration_minutes: None,
            on_time: None,
            assignee_ids: active.assignee_ids.clone().unwrap(),
            assignments: active.assignments.clone().unwrap(),
            steps: active.steps.clone().unwrap(),
            materials: active.materials.clone().unwrap(),
            deliverables: None,
            finance: active.finance.clone().unwrap(),
            pause_reason: None,
            cancel_reason: None,
            search_text: active.search_text.clone().unwrap(),
            created_at: job.created_at,
            updated_at: job.updated_at,
            version: 3,
        };

        let restored = model.into_aggregate().unwrap();
        assert_eq!(restored.code, "JOB-050");
        assert_eq!(restored.assignments, job.assignments);
        assert_eq!(restored.version, 3);
        assert!(search_text(&job).contains("boiler service"));
    }
}
