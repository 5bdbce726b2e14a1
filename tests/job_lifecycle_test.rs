//! End-to-end lifecycle scenarios through the engine and the in-memory
//! repository: scheduling validation, the lead gate on start, the checklist
//! gate on completion, and the frozen finance snapshot afterwards.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{create_command, engine, guarded_step, open_step, TENANT};
use fieldops_api::commands::jobs::{
    AddMaterialCommand, AssignEmployeeCommand, AttachInvoiceCommand, CancelJobCommand,
    CompleteJobCommand, CompleteStepCommand, PauseJobCommand, ResumeJobCommand,
    ScheduleJobCommand, StartJobCommand, ToggleChecklistCommand, UpdateJobCommand,
};
use fieldops_api::errors::ServiceError;
use fieldops_api::models::job::{AssigneeRole, EntityRef, JobStatus};
use fieldops_api::repositories::JobRepository;
use fieldops_api::services::jobs::JobLifecycleService;

async fn assign_lead(engine: &JobLifecycleService, job_id: Uuid) -> Uuid {
    let employee = Uuid::new_v4();
    engine
        .assign_employee(AssignEmployeeCommand {
            job_id,
            employee: EntityRef::Id(employee),
            role: AssigneeRole::Lead,
            planned_minutes: 90,
        })
        .await
        .unwrap();
    employee
}

#[tokio::test]
async fn scheduling_validates_the_window() {
    let (engine, repository) = engine();
    let job = engine
        .create_job(TENANT, create_command("JOB-A1"))
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Draft);

    let now = Utc::now();

    // An inverted window is rejected and the aggregate stays in draft.
    let err = engine
        .schedule(ScheduleJobCommand {
            job_id: job.id,
            planned_start: now + ChronoDuration::hours(2),
            planned_end: now + ChronoDuration::hours(1),
            due_at: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let stored = repository.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Draft);
    assert_eq!(stored.version, job.version);
    assert!(stored.schedule.planned_start.is_none());

    // A due date before the window start is also rejected.
    let err = engine
        .schedule(ScheduleJobCommand {
            job_id: job.id,
            planned_start: now + ChronoDuration::hours(1),
            planned_end: now + ChronoDuration::hours(2),
            due_at: Some(now),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    // A consistent window moves the job to scheduled.
    let scheduled = engine
        .schedule(ScheduleJobCommand {
            job_id: job.id,
            planned_start: now + ChronoDuration::hours(1),
            planned_end: now + ChronoDuration::hours(3),
            due_at: Some(now + ChronoDuration::days(1)),
        })
        .await
        .unwrap();
    assert_eq!(scheduled.status, JobStatus::Scheduled);
}

#[tokio::test]
async fn start_requires_a_lead_assignee() {
    let (engine, repository) = engine();
    let job = engine
        .create_job(TENANT, create_command("JOB-B1"))
        .await
        .unwrap();
    let now = Utc::now();
    engine
        .schedule(ScheduleJobCommand {
            job_id: job.id,
            planned_start: now,
            planned_end: now + ChronoDuration::hours(2),
            due_at: None,
        })
        .await
        .unwrap();

    let err = engine
        .start(StartJobCommand { job_id: job.id })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
    let stored = repository.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Scheduled);

    assign_lead(&engine, job.id).await;
    let started = engine
        .start(StartJobCommand { job_id: job.id })
        .await
        .unwrap();
    assert_eq!(started.status, JobStatus::InProgress);
    assert!(started.schedule.started_at.is_some());
}

#[tokio::test]
async fn completion_is_gated_on_required_checklist_items() {
    let (engine, _) = engine();
    let mut command = create_command("JOB-C1");
    command.steps = vec![serde_json::from_value(guarded_step("prep")).unwrap()];
    let job = engine.create_job(TENANT, command).await.unwrap();

    let now = Utc::now();
    engine
        .schedule(ScheduleJobCommand {
            job_id: job.id,
            planned_start: now,
            planned_end: now + ChronoDuration::hours(2),
            due_at: Some(now + ChronoDuration::days(1)),
        })
        .await
        .unwrap();
    assign_lead(&engine, job.id).await;
    engine
        .start(StartJobCommand { job_id: job.id })
        .await
        .unwrap();

    // Required item unchecked: both step completion and job completion fail.
    let err = engine
        .complete_step(CompleteStepCommand {
            job_id: job.id,
            step_code: "prep".into(),
            elapsed_minutes: 20,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::RequiredItemsPending { .. });

    let err = engine
        .complete(CompleteJobCommand { job_id: job.id })
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::IncompleteSteps(ref codes) if codes == &vec!["prep".to_string()]
    );

    // Check the item, complete the step, then the job.
    engine
        .toggle_checklist(ToggleChecklistCommand {
            job_id: job.id,
            step_code: "prep".into(),
            item_index: 0,
            checked: true,
            photo_urls: Some(vec!["https://cdn.example/valve.jpg".into()]),
            note: None,
        })
        .await
        .unwrap();
    engine
        .complete_step(CompleteStepCommand {
            job_id: job.id,
            step_code: "prep".into(),
            elapsed_minutes: 20,
        })
        .await
        .unwrap();

    let completed = engine
        .complete(CompleteJobCommand { job_id: job.id })
        .await
        .unwrap();
    assert_eq!(completed.status, JobStatus::Completed);
    assert_eq!(completed.schedule.on_time, Some(true));
    assert!(completed.schedule.actual_duration_minutes.is_some());
    assert!(completed.finance.frozen);
}

#[tokio::test]
async fn step_completion_retries_are_no_ops() {
    let (engine, _) = engine();
    let mut command = create_command("JOB-C2");
    command.steps = vec![serde_json::from_value(open_step("flush")).unwrap()];
    let job = engine.create_job(TENANT, command).await.unwrap();

    let now = Utc::now();
    engine
        .schedule(ScheduleJobCommand {
            job_id: job.id,
            planned_start: now,
            planned_end: now + ChronoDuration::hours(1),
            due_at: None,
        })
        .await
        .unwrap();
    assign_lead(&engine, job.id).await;
    engine
        .start(StartJobCommand { job_id: job.id })
        .await
        .unwrap();

    let first = engine
        .complete_step(CompleteStepCommand {
            job_id: job.id,
            step_code: "flush".into(),
            elapsed_minutes: 30,
        })
        .await
        .unwrap();

    // The retried request succeeds and leaves the step exactly as the first
    // call recorded it, even with a different elapsed time.
    let second = engine
        .complete_step(CompleteStepCommand {
            job_id: job.id,
            step_code: "flush".into(),
            elapsed_minutes: 999,
        })
        .await
        .unwrap();
    assert_eq!(first.steps, second.steps);
    assert_eq!(second.steps[0].actual_minutes, Some(30));
}

#[tokio::test]
async fn pause_spans_are_excluded_from_duration() {
    let (engine, _) = engine();
    let job = engine
        .create_job(TENANT, create_command("JOB-D1"))
        .await
        .unwrap();
    let now = Utc::now();
    engine
        .schedule(ScheduleJobCommand {
            job_id: job.id,
            planned_start: now,
            planned_end: now + ChronoDuration::hours(2),
            due_at: None,
        })
        .await
        .unwrap();
    assign_lead(&engine, job.id).await;
    engine
        .start(StartJobCommand { job_id: job.id })
        .await
        .unwrap();
    let paused = engine
        .pause(PauseJobCommand {
            job_id: job.id,
            reason: "parts missing".into(),
        })
        .await
        .unwrap();
    assert_eq!(paused.status, JobStatus::Paused);
    assert_eq!(paused.pause_reason.as_deref(), Some("parts missing"));

    let resumed = engine
        .resume(ResumeJobCommand { job_id: job.id })
        .await
        .unwrap();
    assert_eq!(resumed.status, JobStatus::InProgress);
    assert!(resumed.pause_reason.is_none());

    // Wall-clock elapses microseconds here; the derived duration must not
    // count the paused span as worked time.
    let completed = engine
        .complete(CompleteJobCommand { job_id: job.id })
        .await
        .unwrap();
    assert_eq!(completed.schedule.actual_duration_minutes, Some(0));
}

#[tokio::test]
async fn lifecycle_fields_cannot_be_patched() {
    let (engine, _) = engine();
    let job = engine
        .create_job(TENANT, create_command("JOB-E1"))
        .await
        .unwrap();

    let patch: UpdateJobCommand = serde_json::from_value(serde_json::json!({
        "job_id": job.id,
        "tags": ["winter"],
        "status": "completed",
    }))
    .unwrap();
    let err = engine.update_job(patch).await.unwrap_err();
    assert_matches!(err, ServiceError::UseLifecycleCommand(field) if field == "status");

    // The same patch without the governed field applies cleanly.
    let patch: UpdateJobCommand = serde_json::from_value(serde_json::json!({
        "job_id": job.id,
        "tags": ["winter"],
        "priority": "high",
    }))
    .unwrap();
    let updated = engine.update_job(patch).await.unwrap();
    assert_eq!(updated.tags, vec!["winter".to_string()]);
}

#[tokio::test]
async fn invoice_attachment_freezes_the_snapshot_once() {
    let (engine, _) = engine();
    let job = engine
        .create_job(TENANT, create_command("JOB-F1"))
        .await
        .unwrap();

    // Record a customer-chargeable material while still mutable.
    engine
        .add_material(AddMaterialCommand {
            job_id: job.id,
            usage: serde_json::from_value(serde_json::json!({
                "name": "Door seal",
                "quantity": "2",
                "unit": "pcs",
                "cost_per_unit": "12.50",
                "currency": "EUR",
                "charge_to": "customer",
            }))
            .unwrap(),
        })
        .await
        .unwrap();

    let err = engine
        .attach_invoice(AttachInvoiceCommand { job_id: job.id })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition { .. });

    let now = Utc::now();
    engine
        .schedule(ScheduleJobCommand {
            job_id: job.id,
            planned_start: now,
            planned_end: now + ChronoDuration::hours(1),
            due_at: None,
        })
        .await
        .unwrap();
    assign_lead(&engine, job.id).await;
    engine
        .start(StartJobCommand { job_id: job.id })
        .await
        .unwrap();
    let completed = engine
        .complete(CompleteJobCommand { job_id: job.id })
        .await
        .unwrap();
    // Ad hoc revenue: customer materials plus the flat fee.
    assert_eq!(completed.finance.revenue_snapshot, dec!(70.00));
    assert_eq!(completed.finance.material_cost_snapshot, dec!(25.00));

    let invoiced = engine
        .attach_invoice(AttachInvoiceCommand { job_id: job.id })
        .await
        .unwrap();
    assert_eq!(invoiced.finance.invoice_ref.as_deref(), Some("INV-JOB-F1"));
    assert!(invoiced.finance.invoice_line_id.is_some());

    let err = engine
        .attach_invoice(AttachInvoiceCommand { job_id: job.id })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::SnapshotFrozen(_));

    // Terminal state: the ledger is closed.
    let err = engine
        .add_material(AddMaterialCommand {
            job_id: job.id,
            usage: serde_json::from_value(serde_json::json!({
                "name": "Extra clamp",
                "quantity": "1",
                "unit": "pcs",
                "cost_per_unit": "3",
                "currency": "EUR",
                "charge_to": "expense",
            }))
            .unwrap(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition { .. });
}

#[tokio::test]
async fn cancellation_is_terminal() {
    let (engine, repository) = engine();
    let job = engine
        .create_job(TENANT, create_command("JOB-G1"))
        .await
        .unwrap();

    let cancelled = engine
        .cancel(CancelJobCommand {
            job_id: job.id,
            reason: "duplicate order".into(),
        })
        .await
        .unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("duplicate order"));
    assert!(cancelled.schedule.cancelled_at.is_some());

    let now = Utc::now();
    let err = engine
        .schedule(ScheduleJobCommand {
            job_id: job.id,
            planned_start: now,
            planned_end: now + ChronoDuration::hours(1),
            due_at: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition { .. });

    let stored = repository.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Cancelled);
    assert_eq!(stored.version, cancelled.version);
}

#[tokio::test]
async fn unknown_jobs_are_reported_as_not_found() {
    let (engine, _) = engine();
    let err = engine
        .start(StartJobCommand {
            job_id: Uuid::new_v4(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::JobNotFound(_));
}
