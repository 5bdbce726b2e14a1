use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::job::JobStatus;

/// Standard error body returned by every endpoint.
///
/// `kind` is the machine-readable discriminant a dispatch board or mobile
/// client switches on; `details` carries command-specific context such as the
/// offending step codes or the conflicting versions.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Conflict", "Unprocessable Entity")
    pub error: String,
    /// Machine-readable error kind (e.g., "invalid_transition")
    pub kind: String,
    /// Human-readable error description
    pub message: String,
    /// Structured context for the failure, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    // Validation: caller error, nothing was mutated.
    #[error("command not allowed: job is {status} and cannot accept `{command}`")]
    InvalidTransition { status: JobStatus, command: String },

    #[error("invalid duration: {0} minutes")]
    InvalidDuration(i64),

    #[error("job already has a lead assignee (attempted to add {0})")]
    DuplicateLead(Uuid),

    #[error("employee {0} is not known to the directory")]
    UnknownEmployee(Uuid),

    #[error("field `{0}` is governed by a lifecycle command and cannot be patched")]
    UseLifecycleCommand(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    // Precondition: business rule not yet satisfied; resolve and retry.
    #[error("job has incomplete steps: {0:?}")]
    IncompleteSteps(Vec<String>),

    #[error("step `{step_code}` has required checklist items pending: {pending:?}")]
    RequiredItemsPending {
        step_code: String,
        pending: Vec<String>,
    },

    #[error("cannot remove the last assignee from job {0} while work is underway")]
    LastLeadRemoval(Uuid),

    #[error("finance snapshot for job {0} is frozen")]
    SnapshotFrozen(Uuid),

    // Concurrency: safe to retry after reloading.
    #[error("version conflict on job {job_id}: expected {expected}, found {actual}")]
    VersionConflict {
        job_id: Uuid,
        expected: i32,
        actual: i32,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    // External dependencies: transient, retry with backoff.
    #[error("time-entry source unavailable: {0}")]
    TimeSourceUnavailable(String),

    #[error("external lookup timed out: {0}")]
    ExternalLookupTimeout(String),

    #[error("external service error: {0}")]
    ExternalServiceError(String),

    // Not found: terminal for the request.
    #[error("job {0} not found")]
    JobNotFound(Uuid),

    #[error("step `{0}` not found")]
    StepNotFound(String),

    #[error("not found: {0}")]
    NotFound(String),

    // Infrastructure.
    #[error("database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("event error: {0}")]
    EventError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Machine-readable discriminant used in responses and failure metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::InvalidDuration(_) => "invalid_duration",
            Self::DuplicateLead(_) => "duplicate_lead",
            Self::UnknownEmployee(_) => "unknown_employee",
            Self::UseLifecycleCommand(_) => "use_lifecycle_command",
            Self::ValidationError(_) => "validation_error",
            Self::IncompleteSteps(_) => "incomplete_steps",
            Self::RequiredItemsPending { .. } => "required_items_pending",
            Self::LastLeadRemoval(_) => "last_lead_removal",
            Self::SnapshotFrozen(_) => "snapshot_frozen",
            Self::VersionConflict { .. } => "version_conflict",
            Self::Conflict(_) => "conflict",
            Self::TimeSourceUnavailable(_) => "time_source_unavailable",
            Self::ExternalLookupTimeout(_) => "external_lookup_timeout",
            Self::ExternalServiceError(_) => "external_service_error",
            Self::JobNotFound(_) => "job_not_found",
            Self::StepNotFound(_) => "step_not_found",
            Self::NotFound(_) => "not_found",
            Self::DatabaseError(_) => "database_error",
            Self::SerializationError(_) => "serialization_error",
            Self::EventError(_) => "event_error",
            Self::InternalError(_) => "internal_error",
        }
    }

    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidTransition { .. }
            | Self::InvalidDuration(_)
            | Self::DuplicateLead(_)
            | Self::UnknownEmployee(_)
            | Self::UseLifecycleCommand(_)
            | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::IncompleteSteps(_)
            | Self::RequiredItemsPending { .. }
            | Self::LastLeadRemoval(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SnapshotFrozen(_) | Self::VersionConflict { .. } | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::TimeSourceUnavailable(_) | Self::ExternalServiceError(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::ExternalLookupTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::JobNotFound(_) | Self::StepNotFound(_) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::DatabaseError(_)
            | Self::SerializationError(_)
            | Self::EventError(_)
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for HTTP responses. Internal errors return a generic
    /// message so implementation details never leak to callers.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_)
            | Self::SerializationError(_)
            | Self::EventError(_)
            | Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Structured context for the failure, so the UI can explain it instead of
    /// showing a generic error.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::IncompleteSteps(codes) => Some(serde_json::json!({ "step_codes": codes })),
            Self::RequiredItemsPending { step_code, pending } => Some(serde_json::json!({
                "step_code": step_code,
                "pending_items": pending,
            })),
            Self::VersionConflict {
                job_id,
                expected,
                actual,
            } => Some(serde_json::json!({
                "job_id": job_id,
                "expected_version": expected,
                "actual_version": actual,
            })),
            Self::InvalidTransition { status, command } => Some(serde_json::json!({
                "status": status,
                "command": command,
            })),
            Self::UseLifecycleCommand(field) => Some(serde_json::json!({ "field": field })),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            kind: self.kind().to_string(),
            message: self.response_message(),
            details: self.details(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::JobNotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidTransition {
                status: JobStatus::Completed,
                command: "start".into(),
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::IncompleteSteps(vec!["prep".into()]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::VersionConflict {
                job_id: Uuid::nil(),
                expected: 1,
                actual: 2,
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::TimeSourceUnavailable("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ServiceError::ExternalLookupTimeout("rates".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::InternalError("sensitive".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::SerializationError("field layout".into()).response_message(),
            "Internal server error"
        );

        // User-facing errors keep the actual message.
        assert!(ServiceError::StepNotFound("seal-check".into())
            .response_message()
            .contains("seal-check"));
    }

    #[tokio::test]
    async fn error_body_carries_kind_and_details() {
        let err = ServiceError::RequiredItemsPending {
            step_code: "handover".into(),
            pending: vec!["customer walkthrough".into()],
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.kind, "required_items_pending");
        let details = payload.details.expect("details present");
        assert_eq!(details["step_code"], "handover");
    }
}
