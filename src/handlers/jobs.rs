use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::commands::jobs::{
    AddMaterialCommand, AssignEmployeeCommand, AttachInvoiceCommand, CancelJobCommand,
    CompleteJobCommand, CompleteStepCommand, CreateJobCommand, JobCommand, PauseJobCommand,
    RecordDeliverablesCommand, RecordQualityCommand, RecordSignatureCommand,
    RemoveMaterialCommand, RemoveStepCommand, ResumeJobCommand, ScheduleJobCommand,
    StartJobCommand, SyncTimeEntriesCommand, ToggleChecklistCommand, UnassignEmployeeCommand,
    UpdateJobCommand, UpsertStepCommand,
};
use crate::errors::ServiceError;
use crate::models::job::{
    AssigneeRole, EntityRef, JobPriority, JobSource, JobStatus, QualityOutcome, SignatureKind,
};
use crate::repositories::JobFilters;
use crate::services::materials::MaterialUsageInput;
use crate::services::steps::StepDefinition;
use crate::AppState;

pub fn jobs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route(
            "/:id",
            get(get_job).put(update_job).delete(delete_job),
        )
        .route("/:id/commands", post(dispatch_command))
        .route("/:id/schedule", post(schedule_job))
        .route("/:id/start", post(start_job))
        .route("/:id/pause", post(pause_job))
        .route("/:id/resume", post(resume_job))
        .route("/:id/complete", post(complete_job))
        .route("/:id/cancel", post(cancel_job))
        .route("/:id/assignments", post(assign_employee))
        .route("/:id/assignments/:employee_id", axum::routing::delete(unassign_employee))
        .route(
            "/:id/assignments/:employee_id/time-entries",
            put(sync_time_entries),
        )
        .route("/:id/steps", post(upsert_step))
        .route("/:id/steps/:step_code", axum::routing::delete(remove_step))
        .route(
            "/:id/steps/:step_code/checklist/:item_index",
            put(toggle_checklist),
        )
        .route("/:id/steps/:step_code/quality", post(record_quality))
        .route("/:id/steps/:step_code/complete", post(complete_step))
        .route("/:id/materials", post(add_material))
        .route("/:id/materials/:usage_id", axum::routing::delete(remove_material))
        .route("/:id/deliverables", put(record_deliverables))
        .route("/:id/deliverables/signatures", post(record_signature))
        .route("/:id/invoice", post(attach_invoice))
}

fn tenant_from(headers: &HeaderMap) -> Result<String, ServiceError> {
    headers
        .get("x-tenant-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .filter(|tenant| !tenant.is_empty())
        .ok_or_else(|| ServiceError::ValidationError("X-Tenant-Id header is required".to_string()))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListJobsParams {
    pub status: Option<String>,
    pub source: Option<String>,
    pub priority: Option<String>,
    pub apartment: Option<Uuid>,
    pub service: Option<Uuid>,
    pub contract: Option<Uuid>,
    pub employee: Option<Uuid>,
    /// Free-text match on code and title.
    pub q: Option<String>,
    pub planned_from: Option<DateTime<Utc>>,
    pub planned_to: Option<DateTime<Utc>>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListJobsParams {
    fn into_filters(self, tenant: String) -> Result<(JobFilters, u64, u64), ServiceError> {
        let status = self
            .status
            .map(|s| {
                JobStatus::from_str(&s)
                    .map_err(|_| ServiceError::ValidationError(format!("unknown status `{s}`")))
            })
            .transpose()?;
        let source = self
            .source
            .map(|s| {
                JobSource::from_str(&s)
                    .map_err(|_| ServiceError::ValidationError(format!("unknown source `{s}`")))
            })
            .transpose()?;
        let priority = self
            .priority
            .map(|s| {
                JobPriority::from_str(&s)
                    .map_err(|_| ServiceError::ValidationError(format!("unknown priority `{s}`")))
            })
            .transpose()?;

        let filters = JobFilters {
            tenant: Some(tenant),
            status,
            source,
            priority,
            apartment_ref: self.apartment,
            service_ref: self.service,
            contract_ref: self.contract,
            employee_ref: self.employee,
            q: self.q,
            planned_from: self.planned_from,
            planned_to: self.planned_to,
            due_from: self.due_from,
            due_to: self.due_to,
            is_active: self.is_active,
        };
        Ok((filters, self.page.unwrap_or(1), self.limit.unwrap_or(20)))
    }
}

/// List jobs in dispatch-board order
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    params(ListJobsParams),
    responses(
        (status = 200, description = "Page of jobs", body = crate::queries::JobPage),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListJobsParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_from(&headers)?;
    let (filters, page, limit) = params.into_filters(tenant)?;
    let page = state.queries.list(&filters, page, limit).await?;
    Ok(Json(page))
}

/// Create a job in `draft`
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = CreateJobCommand,
    responses(
        (status = 201, description = "Job created", body = crate::models::job::JobAggregate),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn create_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateJobCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_from(&headers)?;
    let job = state.engine.create_job(&tenant, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// Fetch one job with resolved display references
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job detail", body = crate::queries::JobView),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state.queries.get(id).await?;
    Ok(Json(view))
}

/// Patch fields not governed by a lifecycle command
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = UpdateJobCommand,
    responses(
        (status = 200, description = "Job updated", body = crate::models::job::JobAggregate),
        (status = 400, description = "Lifecycle-governed field in patch", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateJobCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.job_id = id;
    let job = state.engine.update_job(payload).await?;
    Ok(Json(job))
}

/// Administrative delete; bypasses the lifecycle and is audited
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.engine.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Dispatch a tagged command envelope
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/commands",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = JobCommand,
    responses(
        (status = 200, description = "Command applied", body = crate::models::job::JobAggregate),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 409, description = "Version conflict", body = crate::errors::ErrorResponse),
        (status = 422, description = "Precondition not met", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn dispatch_command(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(command): Json<JobCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state.engine.dispatch(id, command).await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleRequest {
    pub planned_start: DateTime<Utc>,
    pub planned_end: DateTime<Utc>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
}

/// Schedule a draft job
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/schedule",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Job scheduled", body = crate::models::job::JobAggregate),
        (status = 400, description = "Invalid window or state", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn schedule_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .schedule(ScheduleJobCommand {
            job_id: id,
            planned_start: payload.planned_start,
            planned_end: payload.planned_end,
            due_at: payload.due_at,
        })
        .await?;
    Ok(Json(job))
}

/// Start a scheduled job
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/start",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job started", body = crate::models::job::JobAggregate),
        (status = 400, description = "Invalid state or no lead", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn start_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state.engine.start(StartJobCommand { job_id: id }).await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReasonRequest {
    pub reason: String,
}

/// Pause an in-progress job
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/pause",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Job paused", body = crate::models::job::JobAggregate),
        (status = 400, description = "Invalid state", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn pause_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .pause(PauseJobCommand {
            job_id: id,
            reason: payload.reason,
        })
        .await?;
    Ok(Json(job))
}

/// Resume a paused job
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/resume",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job resumed", body = crate::models::job::JobAggregate),
        (status = 400, description = "Invalid state", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn resume_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state.engine.resume(ResumeJobCommand { job_id: id }).await?;
    Ok(Json(job))
}

/// Complete a job; every step must clear its checklist gate
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/complete",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job completed", body = crate::models::job::JobAggregate),
        (status = 422, description = "Incomplete steps", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn complete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .complete(CompleteJobCommand { job_id: id })
        .await?;
    Ok(Json(job))
}

/// Cancel a job (terminal)
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/cancel",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Job cancelled", body = crate::models::job::JobAggregate),
        (status = 400, description = "Already terminal", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .cancel(CancelJobCommand {
            job_id: id,
            reason: payload.reason,
        })
        .await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    pub employee: EntityRef,
    pub role: AssigneeRole,
    #[serde(default)]
    pub planned_minutes: i64,
}

/// Assign an employee
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/assignments",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Employee assigned", body = crate::models::job::JobAggregate),
        (status = 400, description = "Duplicate lead or unknown employee", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn assign_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .assign_employee(AssignEmployeeCommand {
            job_id: id,
            employee: payload.employee,
            role: payload.role,
            planned_minutes: payload.planned_minutes,
        })
        .await?;
    Ok(Json(job))
}

/// Remove an assignment
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}/assignments/{employee_id}",
    params(
        ("id" = Uuid, Path, description = "Job id"),
        ("employee_id" = Uuid, Path, description = "Employee id")
    ),
    responses(
        (status = 200, description = "Employee unassigned", body = crate::models::job::JobAggregate),
        (status = 422, description = "Would leave a running job unassigned", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn unassign_employee(
    State(state): State<AppState>,
    Path((id, employee_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .unassign_employee(UnassignEmployeeCommand {
            job_id: id,
            employee_id,
        })
        .await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncTimeEntriesRequest {
    pub time_entry_refs: Vec<Uuid>,
}

/// Attach time entries and recompute actual minutes
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/assignments/{employee_id}/time-entries",
    params(
        ("id" = Uuid, Path, description = "Job id"),
        ("employee_id" = Uuid, Path, description = "Employee id")
    ),
    request_body = SyncTimeEntriesRequest,
    responses(
        (status = 200, description = "Minutes recomputed", body = crate::models::job::JobAggregate),
        (status = 502, description = "Time source unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn sync_time_entries(
    State(state): State<AppState>,
    Path((id, employee_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SyncTimeEntriesRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .sync_time_entries(SyncTimeEntriesCommand {
            job_id: id,
            employee_id,
            time_entry_refs: payload.time_entry_refs,
        })
        .await?;
    Ok(Json(job))
}

/// Add or redefine a step (draft/scheduled only)
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/steps",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = StepDefinition,
    responses(
        (status = 200, description = "Step upserted", body = crate::models::job::JobAggregate),
        (status = 400, description = "Steps frozen after start", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn upsert_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StepDefinition>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .upsert_step(UpsertStepCommand {
            job_id: id,
            step: payload,
        })
        .await?;
    Ok(Json(job))
}

/// Remove a step (draft/scheduled only)
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}/steps/{step_code}",
    params(
        ("id" = Uuid, Path, description = "Job id"),
        ("step_code" = String, Path, description = "Step code")
    ),
    responses(
        (status = 200, description = "Step removed", body = crate::models::job::JobAggregate),
        (status = 404, description = "Step not found", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn remove_step(
    State(state): State<AppState>,
    Path((id, step_code)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .remove_step(RemoveStepCommand {
            job_id: id,
            step_code,
        })
        .await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleChecklistRequest {
    pub checked: bool,
    #[serde(default)]
    pub photo_urls: Option<Vec<String>>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Toggle a checklist item, optionally attaching evidence
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/steps/{step_code}/checklist/{item_index}",
    params(
        ("id" = Uuid, Path, description = "Job id"),
        ("step_code" = String, Path, description = "Step code"),
        ("item_index" = usize, Path, description = "Checklist item index")
    ),
    request_body = ToggleChecklistRequest,
    responses(
        (status = 200, description = "Item toggled", body = crate::models::job::JobAggregate),
        (status = 400, description = "Not executable in this state", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn toggle_checklist(
    State(state): State<AppState>,
    Path((id, step_code, item_index)): Path<(Uuid, String, usize)>,
    Json(payload): Json<ToggleChecklistRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .toggle_checklist(ToggleChecklistCommand {
            job_id: id,
            step_code,
            item_index,
            checked: payload.checked,
            photo_urls: payload.photo_urls,
            note: payload.note,
        })
        .await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordQualityRequest {
    pub key: String,
    pub outcome: QualityOutcome,
}

/// Record a quality result for a step
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/steps/{step_code}/quality",
    params(
        ("id" = Uuid, Path, description = "Job id"),
        ("step_code" = String, Path, description = "Step code")
    ),
    request_body = RecordQualityRequest,
    responses(
        (status = 200, description = "Quality recorded", body = crate::models::job::JobAggregate),
        (status = 404, description = "Step not found", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn record_quality(
    State(state): State<AppState>,
    Path((id, step_code)): Path<(Uuid, String)>,
    Json(payload): Json<RecordQualityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .record_quality(RecordQualityCommand {
            job_id: id,
            step_code,
            key: payload.key,
            outcome: payload.outcome,
        })
        .await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteStepRequest {
    pub elapsed_minutes: i64,
}

/// Complete a step (idempotent)
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/steps/{step_code}/complete",
    params(
        ("id" = Uuid, Path, description = "Job id"),
        ("step_code" = String, Path, description = "Step code")
    ),
    request_body = CompleteStepRequest,
    responses(
        (status = 200, description = "Step completed", body = crate::models::job::JobAggregate),
        (status = 422, description = "Required items pending", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn complete_step(
    State(state): State<AppState>,
    Path((id, step_code)): Path<(Uuid, String)>,
    Json(payload): Json<CompleteStepRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .complete_step(CompleteStepCommand {
            job_id: id,
            step_code,
            elapsed_minutes: payload.elapsed_minutes,
        })
        .await?;
    Ok(Json(job))
}

/// Record a material usage line
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/materials",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = MaterialUsageInput,
    responses(
        (status = 200, description = "Usage recorded", body = crate::models::job::JobAggregate),
        (status = 400, description = "Invalid usage", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn add_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaterialUsageInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .add_material(AddMaterialCommand {
            job_id: id,
            usage: payload,
        })
        .await?;
    Ok(Json(job))
}

/// Remove a material usage line
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}/materials/{usage_id}",
    params(
        ("id" = Uuid, Path, description = "Job id"),
        ("usage_id" = Uuid, Path, description = "Usage id")
    ),
    responses(
        (status = 200, description = "Usage removed", body = crate::models::job::JobAggregate),
        (status = 404, description = "Usage not found", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn remove_material(
    State(state): State<AppState>,
    Path((id, usage_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .remove_material(RemoveMaterialCommand {
            job_id: id,
            usage_id,
        })
        .await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeliverablesRequest {
    #[serde(default)]
    pub before_photos: Vec<String>,
    #[serde(default)]
    pub after_photos: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Merge photos, notes and attachments into the deliverables
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/deliverables",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = DeliverablesRequest,
    responses(
        (status = 200, description = "Deliverables recorded", body = crate::models::job::JobAggregate),
        (status = 400, description = "Not executable in this state", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn record_deliverables(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeliverablesRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .record_deliverables(RecordDeliverablesCommand {
            job_id: id,
            before_photos: payload.before_photos,
            after_photos: payload.after_photos,
            notes: payload.notes,
            attachments: payload.attachments,
        })
        .await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignatureRequest {
    pub kind: SignatureKind,
    pub name: String,
    #[serde(default)]
    pub signer: Option<EntityRef>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Capture a customer or supervisor signature
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/deliverables/signatures",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = SignatureRequest,
    responses(
        (status = 200, description = "Signature captured", body = crate::models::job::JobAggregate),
        (status = 400, description = "Not executable in this state", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn record_signature(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SignatureRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .record_signature(RecordSignatureCommand {
            job_id: id,
            kind: payload.kind,
            name: payload.name,
            signer: payload.signer,
            image_url: payload.image_url,
        })
        .await?;
    Ok(Json(job))
}

/// Register the frozen snapshot with invoicing and store the references
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/invoice",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Invoice attached", body = crate::models::job::JobAggregate),
        (status = 409, description = "Already invoiced", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn attach_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state
        .engine
        .attach_invoice(AttachInvoiceCommand { job_id: id })
        .await?;
    Ok(Json(job))
}
