use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// Steps are fixed once work starts, to keep execution auditable.
    pub fn allows_step_definition(&self) -> bool {
        matches!(self, JobStatus::Draft | JobStatus::Scheduled)
    }

    /// Checklist toggles, quality results and step completion happen on site.
    pub fn allows_execution(&self) -> bool {
        matches!(self, JobStatus::InProgress | JobStatus::Paused)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobPriority {
    #[sea_orm(num_value = 1)]
    Low,
    #[sea_orm(num_value = 2)]
    Normal,
    #[sea_orm(num_value = 3)]
    High,
    #[sea_orm(num_value = 4)]
    Critical,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_source")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobSource {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "recurrence")]
    Recurrence,
    #[sea_orm(string_value = "contract")]
    Contract,
    #[sea_orm(string_value = "adhoc")]
    Adhoc,
}

/// Reference to an external entity: either a bare id or a resolved snapshot as
/// sent by clients that already hold the display form. The engine normalizes
/// to bare ids before storing; snapshots are produced again only at the query
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum EntityRef {
    Id(Uuid),
    Snapshot {
        #[serde(rename = "_id")]
        id: Uuid,
        #[serde(default)]
        label: Option<String>,
    },
}

impl EntityRef {
    pub fn id(&self) -> Uuid {
        match self {
            EntityRef::Id(id) => *id,
            EntityRef::Snapshot { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Schedule {
    pub planned_start: Option<DateTime<Utc>>,
    pub planned_end: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Seconds spent in `in_progress` across closed intervals. Paused spans
    /// are excluded; the open interval is added when it closes.
    pub accrued_seconds: i64,
    pub actual_duration_minutes: Option<i64>,
    pub on_time: Option<bool>,
}

impl Schedule {
    /// Start of the currently open in-progress interval, if any.
    fn open_interval_start(&self) -> Option<DateTime<Utc>> {
        self.resumed_at.or(self.started_at)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssigneeRole {
    Lead,
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    pub employee_ref: Uuid,
    pub role: AssigneeRole,
    pub planned_minutes: i64,
    /// Derived from linked time entries; never accepted from client input.
    pub actual_minutes: i64,
    pub time_entry_refs: Vec<Uuid>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepKind {
    Task,
    Inspection,
    Safety,
    Handover,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChecklistItem {
    pub label: String,
    pub required: bool,
    pub checked: bool,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QualityOutcome {
    Pass,
    Fail,
    Measurement {
        value: Decimal,
        #[serde(default)]
        unit: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QualityCheck {
    pub key: String,
    pub outcome: QualityOutcome,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StepResult {
    pub step_code: String,
    pub kind: StepKind,
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub quality: Vec<QualityCheck>,
    pub estimated_minutes: Option<i64>,
    pub actual_minutes: Option<i64>,
    pub completed: bool,
}

impl StepResult {
    pub fn pending_required_items(&self) -> Vec<String> {
        self.checklist
            .iter()
            .filter(|item| item.required && !item.checked)
            .map(|item| item.label.clone())
            .collect()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChargeTo {
    Expense,
    Customer,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaterialUsage {
    pub id: Uuid,
    pub item_ref: Option<Uuid>,
    pub sku: Option<String>,
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Decimal,
    pub currency: String,
    /// Always `quantity * cost_per_unit`; recomputed on every write, never
    /// trusted from input.
    pub total_cost: Decimal,
    pub charge_to: ChargeTo,
}

impl MaterialUsage {
    pub fn recompute_total(&mut self) {
        self.total_cost = self.quantity * self.cost_per_unit;
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SignatureKind {
    Customer,
    Supervisor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SignatureCapture {
    pub kind: SignatureKind,
    pub name: String,
    pub signer_ref: Option<Uuid>,
    pub signed_at: DateTime<Utc>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliverableResult {
    #[serde(default)]
    pub before_photos: Vec<String>,
    #[serde(default)]
    pub after_photos: Vec<String>,
    #[serde(default)]
    pub signatures: Vec<SignatureCapture>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobFinance {
    pub billable: bool,
    pub revenue_snapshot: Decimal,
    pub labor_cost_snapshot: Decimal,
    pub material_cost_snapshot: Decimal,
    pub currency: String,
    /// Set at `complete()`; once frozen the cost/revenue snapshots are
    /// immutable.
    pub frozen: bool,
    pub invoice_ref: Option<String>,
    pub invoice_line_id: Option<String>,
}

impl JobFinance {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            billable: true,
            revenue_snapshot: Decimal::ZERO,
            labor_cost_snapshot: Decimal::ZERO,
            material_cost_snapshot: Decimal::ZERO,
            currency: currency.into(),
            frozen: false,
            invoice_ref: None,
            invoice_line_id: None,
        }
    }
}

/// One field-service work order. Mutated exclusively through lifecycle
/// commands; derived fields are recomputed by the owning services and never
/// accepted from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobAggregate {
    pub id: Uuid,
    pub tenant: String,
    pub code: String,
    pub title: BTreeMap<String, String>,
    pub description: BTreeMap<String, String>,
    pub source: JobSource,
    pub status: JobStatus,
    pub priority: JobPriority,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub apartment_ref: Option<Uuid>,
    pub service_ref: Option<Uuid>,
    pub contract_ref: Option<Uuid>,
    pub category_ref: Option<Uuid>,
    pub schedule: Schedule,
    pub assignments: Vec<Assignment>,
    pub steps: Vec<StepResult>,
    pub materials: Vec<MaterialUsage>,
    pub deliverables: Option<DeliverableResult>,
    pub finance: JobFinance,
    pub pause_reason: Option<String>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl JobAggregate {
    pub fn new(
        tenant: impl Into<String>,
        code: impl Into<String>,
        currency: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant: tenant.into(),
            code: code.into(),
            title: BTreeMap::new(),
            description: BTreeMap::new(),
            source: JobSource::Manual,
            status: JobStatus::Draft,
            priority: JobPriority::Normal,
            tags: Vec::new(),
            is_active: true,
            apartment_ref: None,
            service_ref: None,
            contract_ref: None,
            category_ref: None,
            schedule: Schedule::default(),
            assignments: Vec::new(),
            steps: Vec::new(),
            materials: Vec::new(),
            deliverables: None,
            finance: JobFinance::new(currency),
            pause_reason: None,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn lead(&self) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.role == AssigneeRole::Lead)
    }

    pub fn step(&self, step_code: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.step_code == step_code)
    }

    pub fn step_mut(&mut self, step_code: &str) -> Option<&mut StepResult> {
        self.steps.iter_mut().find(|s| s.step_code == step_code)
    }

    /// Step codes that block `complete()`: not yet completed, or completed
    /// with required checklist items still pending.
    pub fn incomplete_step_codes(&self) -> Vec<String> {
        self.steps
            .iter()
            .filter(|s| !s.completed || !s.pending_required_items().is_empty())
            .map(|s| s.step_code.clone())
            .collect()
    }

    pub fn invalid_transition(&self, command: &str) -> ServiceError {
        ServiceError::InvalidTransition {
            status: self.status,
            command: command.to_string(),
        }
    }

    /// Close the open in-progress interval and add it to the accrued total.
    fn accrue(&mut self, now: DateTime<Utc>) {
        if let Some(open) = self.schedule.open_interval_start() {
            self.schedule.accrued_seconds += (now - open).num_seconds().max(0);
        }
    }

    pub fn schedule_window(
        &mut self,
        planned_start: DateTime<Utc>,
        planned_end: DateTime<Utc>,
        due_at: Option<DateTime<Utc>>,
    ) -> Result<(), ServiceError> {
        if self.status != JobStatus::Draft {
            return Err(self.invalid_transition("schedule"));
        }
        if planned_start >= planned_end {
            return Err(ServiceError::ValidationError(
                "planned_start must precede planned_end".to_string(),
            ));
        }
        if let Some(due) = due_at {
            if due < planned_start {
                return Err(ServiceError::ValidationError(
                    "due_at must not precede planned_start".to_string(),
                ));
            }
        }
        self.schedule.planned_start = Some(planned_start);
        self.schedule.planned_end = Some(planned_end);
        self.schedule.due_at = due_at;
        self.status = JobStatus::Scheduled;
        Ok(())
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), ServiceError> {
        if self.status != JobStatus::Scheduled {
            return Err(self.invalid_transition("start"));
        }
        if self.lead().is_none() {
            return Err(ServiceError::ValidationError(
                "job cannot start without a lead assignee".to_string(),
            ));
        }
        self.schedule.started_at = Some(now);
        self.status = JobStatus::InProgress;
        Ok(())
    }

    pub fn pause(&mut self, now: DateTime<Utc>, reason: String) -> Result<(), ServiceError> {
        if self.status != JobStatus::InProgress {
            return Err(self.invalid_transition("pause"));
        }
        self.accrue(now);
        self.schedule.paused_at = Some(now);
        self.pause_reason = Some(reason);
        self.status = JobStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), ServiceError> {
        if self.status != JobStatus::Paused {
            return Err(self.invalid_transition("resume"));
        }
        self.schedule.resumed_at = Some(now);
        self.pause_reason = None;
        self.status = JobStatus::InProgress;
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), ServiceError> {
        if !matches!(self.status, JobStatus::InProgress | JobStatus::Paused) {
            return Err(self.invalid_transition("complete"));
        }
        let blocking = self.incomplete_step_codes();
        if !blocking.is_empty() {
            return Err(ServiceError::IncompleteSteps(blocking));
        }
        if self.status == JobStatus::InProgress {
            self.accrue(now);
        }
        self.schedule.completed_at = Some(now);
        self.schedule.actual_duration_minutes = Some(self.schedule.accrued_seconds / 60);
        self.schedule.on_time = self.schedule.due_at.map(|due| now <= due);
        self.status = JobStatus::Completed;
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>, reason: String) -> Result<(), ServiceError> {
        if self.status.is_terminal() {
            return Err(self.invalid_transition("cancel"));
        }
        if self.status == JobStatus::InProgress {
            self.accrue(now);
        }
        self.schedule.cancelled_at = Some(now);
        self.cancel_reason = Some(reason);
        self.status = JobStatus::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn draft_job() -> JobAggregate {
        JobAggregate::new("acme", "JOB-001", "EUR", ts(0))
    }

    fn scheduled_job_with_lead() -> JobAggregate {
        let mut job = draft_job();
        job.schedule_window(ts(10), ts(120), Some(ts(240))).unwrap();
        job.assignments.push(Assignment {
            employee_ref: Uuid::new_v4(),
            role: AssigneeRole::Lead,
            planned_minutes: 90,
            actual_minutes: 0,
            time_entry_refs: vec![],
        });
        job
    }

    #[test]
    fn schedule_validates_window_and_transitions() {
        let mut job = draft_job();
        job.schedule_window(ts(10), ts(120), Some(ts(240))).unwrap();
        assert_eq!(job.status, JobStatus::Scheduled);
        assert_eq!(job.schedule.planned_start, Some(ts(10)));
    }

    #[test]
    fn schedule_rejects_inverted_window_without_mutation() {
        let mut job = draft_job();
        let err = job.schedule_window(ts(120), ts(10), None).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
        assert_eq!(job.status, JobStatus::Draft);
        assert!(job.schedule.planned_start.is_none());
    }

    #[test]
    fn schedule_rejects_due_before_start() {
        let mut job = draft_job();
        let err = job
            .schedule_window(ts(60), ts(120), Some(ts(30)))
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
        assert_eq!(job.status, JobStatus::Draft);
    }

    #[test]
    fn start_requires_lead() {
        let mut job = draft_job();
        job.schedule_window(ts(10), ts(120), None).unwrap();
        let err = job.start(ts(10)).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
        assert_eq!(job.status, JobStatus::Scheduled);

        job.assignments.push(Assignment {
            employee_ref: Uuid::new_v4(),
            role: AssigneeRole::Lead,
            planned_minutes: 60,
            actual_minutes: 0,
            time_entry_refs: vec![],
        });
        job.start(ts(10)).unwrap();
        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.schedule.started_at, Some(ts(10)));
    }

    #[rstest]
    #[case(JobStatus::Draft, "start")]
    #[case(JobStatus::Draft, "pause")]
    #[case(JobStatus::Draft, "resume")]
    #[case(JobStatus::Draft, "complete")]
    #[case(JobStatus::Scheduled, "schedule")]
    #[case(JobStatus::Scheduled, "pause")]
    #[case(JobStatus::Scheduled, "resume")]
    #[case(JobStatus::InProgress, "schedule")]
    #[case(JobStatus::InProgress, "start")]
    #[case(JobStatus::InProgress, "resume")]
    #[case(JobStatus::Paused, "schedule")]
    #[case(JobStatus::Paused, "start")]
    #[case(JobStatus::Paused, "pause")]
    #[case(JobStatus::Completed, "schedule")]
    #[case(JobStatus::Completed, "start")]
    #[case(JobStatus::Completed, "pause")]
    #[case(JobStatus::Completed, "resume")]
    #[case(JobStatus::Completed, "complete")]
    #[case(JobStatus::Completed, "cancel")]
    #[case(JobStatus::Cancelled, "schedule")]
    #[case(JobStatus::Cancelled, "start")]
    #[case(JobStatus::Cancelled, "complete")]
    #[case(JobStatus::Cancelled, "cancel")]
    fn illegal_transitions_leave_the_job_untouched(
        #[case] status: JobStatus,
        #[case] command: &str,
    ) {
        let mut job = scheduled_job_with_lead();
        job.status = status;
        let before = job.clone();

        let result = match command {
            "schedule" => job.schedule_window(ts(10), ts(120), None),
            "start" => job.start(ts(10)),
            "pause" => job.pause(ts(20), "weather".into()),
            "resume" => job.resume(ts(30)),
            "complete" => job.complete(ts(40)),
            "cancel" => job.cancel(ts(40), "duplicate".into()),
            other => panic!("unknown command {other}"),
        };

        assert_matches!(result, Err(ServiceError::InvalidTransition { .. }));
        assert_eq!(job, before);
    }

    #[test]
    fn duration_excludes_paused_span() {
        let mut job = scheduled_job_with_lead();
        job.start(ts(0)).unwrap();
        job.pause(ts(45), "lunch".into()).unwrap();
        job.resume(ts(75)).unwrap();
        job.complete(ts(105)).unwrap();

        // (T1-T0) + (T3-T2) = 45 + 30 minutes
        assert_eq!(job.schedule.actual_duration_minutes, Some(75));
        assert_eq!(job.schedule.on_time, Some(true));
    }

    #[test]
    fn complete_from_paused_does_not_accrue_the_pause() {
        let mut job = scheduled_job_with_lead();
        job.start(ts(0)).unwrap();
        job.pause(ts(30), "parts missing".into()).unwrap();
        job.complete(ts(90)).unwrap();

        assert_eq!(job.schedule.actual_duration_minutes, Some(30));
    }

    #[test]
    fn complete_is_gated_on_required_checklist_items() {
        let mut job = scheduled_job_with_lead();
        job.steps.push(StepResult {
            step_code: "prep".into(),
            kind: StepKind::Task,
            checklist: vec![ChecklistItem {
                label: "shut off water".into(),
                required: true,
                checked: false,
                photo_urls: vec![],
                note: None,
            }],
            quality: vec![],
            estimated_minutes: Some(15),
            actual_minutes: None,
            completed: true,
        });
        job.start(ts(0)).unwrap();

        let err = job.complete(ts(60)).unwrap_err();
        assert_matches!(err, ServiceError::IncompleteSteps(ref codes) if codes == &vec!["prep".to_string()]);
        assert_eq!(job.status, JobStatus::InProgress);

        job.steps[0].checklist[0].checked = true;
        job.complete(ts(60)).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[test]
    fn late_completion_is_flagged() {
        let mut job = scheduled_job_with_lead();
        job.start(ts(0)).unwrap();
        job.complete(ts(500)).unwrap();
        assert_eq!(job.schedule.on_time, Some(false));
    }

    #[test]
    fn entity_ref_accepts_bare_id_and_snapshot() {
        let id = Uuid::new_v4();
        let bare: EntityRef = serde_json::from_value(serde_json::json!(id)).unwrap();
        assert_eq!(bare.id(), id);

        let snapshot: EntityRef =
            serde_json::from_value(serde_json::json!({ "_id": id, "label": "Unit 4B" })).unwrap();
        assert_eq!(snapshot.id(), id);
    }

    #[test]
    fn material_total_is_quantity_times_unit_cost() {
        let mut usage = MaterialUsage {
            id: Uuid::new_v4(),
            item_ref: None,
            sku: Some("SEAL-12".into()),
            name: "Door seal".into(),
            quantity: Decimal::new(35, 1), // 3.5
            unit: "m".into(),
            cost_per_unit: Decimal::new(420, 2), // 4.20
            currency: "EUR".into(),
            total_cost: Decimal::ZERO,
            charge_to: ChargeTo::Customer,
        };
        usage.recompute_total();
        assert_eq!(usage.total_cost, Decimal::new(1470, 2));
    }
}
