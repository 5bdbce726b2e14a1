use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FieldOps API",
        version = "0.3.0",
        description = r#"
# FieldOps Job Lifecycle & Scheduling API

Backend engine for dispatchable field-service work orders: lifecycle state
machine, employee assignments, step execution with checklist and quality
gates, material usage, and billable finance rollups.

## Tenancy

Every request that creates or lists jobs is scoped by the `X-Tenant-Id`
header. Tenant resolution itself happens upstream.

## Commands vs patches

Job status and schedule timestamps are governed exclusively by lifecycle
commands (`/jobs/{id}/schedule`, `/start`, `/pause`, ... or the tagged
envelope at `/jobs/{id}/commands`). Sending them in a plain update is
rejected with `use_lifecycle_command`.

## Concurrency

Aggregates carry a version for optimistic locking. The engine retries
conflicting commands a bounded number of times before returning HTTP 409
with the conflicting versions in the error details.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "jobs", description = "Job lifecycle, assignments, steps, materials, deliverables, invoicing"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::jobs::list_jobs,
        crate::handlers::jobs::create_job,
        crate::handlers::jobs::get_job,
        crate::handlers::jobs::update_job,
        crate::handlers::jobs::delete_job,
        crate::handlers::jobs::dispatch_command,
        crate::handlers::jobs::schedule_job,
        crate::handlers::jobs::start_job,
        crate::handlers::jobs::pause_job,
        crate::handlers::jobs::resume_job,
        crate::handlers::jobs::complete_job,
        crate::handlers::jobs::cancel_job,
        crate::handlers::jobs::assign_employee,
        crate::handlers::jobs::unassign_employee,
        crate::handlers::jobs::sync_time_entries,
        crate::handlers::jobs::upsert_step,
        crate::handlers::jobs::remove_step,
        crate::handlers::jobs::toggle_checklist,
        crate::handlers::jobs::record_quality,
        crate::handlers::jobs::complete_step,
        crate::handlers::jobs::add_material,
        crate::handlers::jobs::remove_material,
        crate::handlers::jobs::record_deliverables,
        crate::handlers::jobs::record_signature,
        crate::handlers::jobs::attach_invoice,
        crate::handlers::health::health,
    ),
    components(
        schemas(
            // Aggregate and owned types
            crate::models::job::JobAggregate,
            crate::models::job::JobStatus,
            crate::models::job::JobPriority,
            crate::models::job::JobSource,
            crate::models::job::EntityRef,
            crate::models::job::Schedule,
            crate::models::job::Assignment,
            crate::models::job::AssigneeRole,
            crate::models::job::StepResult,
            crate::models::job::StepKind,
            crate::models::job::ChecklistItem,
            crate::models::job::QualityCheck,
            crate::models::job::QualityOutcome,
            crate::models::job::MaterialUsage,
            crate::models::job::ChargeTo,
            crate::models::job::DeliverableResult,
            crate::models::job::SignatureCapture,
            crate::models::job::SignatureKind,
            crate::models::job::JobFinance,

            // Command payloads
            crate::commands::jobs::JobCommand,
            crate::commands::jobs::CreateJobCommand,
            crate::commands::jobs::UpdateJobCommand,
            crate::commands::jobs::ScheduleJobCommand,
            crate::commands::jobs::StartJobCommand,
            crate::commands::jobs::PauseJobCommand,
            crate::commands::jobs::ResumeJobCommand,
            crate::commands::jobs::CompleteJobCommand,
            crate::commands::jobs::CancelJobCommand,
            crate::commands::jobs::AssignEmployeeCommand,
            crate::commands::jobs::UnassignEmployeeCommand,
            crate::commands::jobs::SyncTimeEntriesCommand,
            crate::commands::jobs::UpsertStepCommand,
            crate::commands::jobs::RemoveStepCommand,
            crate::commands::jobs::ToggleChecklistCommand,
            crate::commands::jobs::RecordQualityCommand,
            crate::commands::jobs::CompleteStepCommand,
            crate::commands::jobs::AddMaterialCommand,
            crate::commands::jobs::RemoveMaterialCommand,
            crate::commands::jobs::RecordDeliverablesCommand,
            crate::commands::jobs::RecordSignatureCommand,
            crate::commands::jobs::AttachInvoiceCommand,

            // Request/response shapes
            crate::handlers::jobs::ScheduleRequest,
            crate::handlers::jobs::ReasonRequest,
            crate::handlers::jobs::AssignRequest,
            crate::handlers::jobs::SyncTimeEntriesRequest,
            crate::handlers::jobs::ToggleChecklistRequest,
            crate::handlers::jobs::RecordQualityRequest,
            crate::handlers::jobs::CompleteStepRequest,
            crate::handlers::jobs::DeliverablesRequest,
            crate::handlers::jobs::SignatureRequest,
            crate::services::steps::StepDefinition,
            crate::services::steps::ChecklistItemDefinition,
            crate::services::materials::MaterialUsageInput,
            crate::queries::JobPage,
            crate::queries::JobListItem,
            crate::queries::JobView,
            crate::collaborators::DisplayRef,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
