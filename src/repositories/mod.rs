use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::job::{JobAggregate, JobPriority, JobSource, JobStatus};

pub mod job_repository;
pub mod memory;

pub use job_repository::SqlJobRepository;
pub use memory::InMemoryJobRepository;

/// Storage-level filter set for job listings. All criteria are ANDed.
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub tenant: Option<String>,
    pub status: Option<JobStatus>,
    pub source: Option<JobSource>,
    pub priority: Option<JobPriority>,
    pub apartment_ref: Option<Uuid>,
    pub service_ref: Option<Uuid>,
    pub contract_ref: Option<Uuid>,
    pub employee_ref: Option<Uuid>,
    /// Free-text match against job code and localized titles.
    pub q: Option<String>,
    pub planned_from: Option<DateTime<Utc>>,
    pub planned_to: Option<DateTime<Utc>>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// Whole-aggregate persistence with optimistic concurrency.
///
/// `save` replaces the entire row atomically: pass the version the aggregate
/// was loaded at (`0` for a new aggregate) and receive the stored copy with
/// the incremented version, or `VersionConflict` if another writer got there
/// first. Listings use the dispatch-board ordering: `due_at` ascending with
/// nulls last, then priority descending, then `created_at` ascending, ties
/// broken by id so pagination stays stable.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobAggregate>, ServiceError>;

    async fn find_by_code(
        &self,
        tenant: &str,
        code: &str,
    ) -> Result<Option<JobAggregate>, ServiceError>;

    async fn save(
        &self,
        job: &JobAggregate,
        expected_version: i32,
    ) -> Result<JobAggregate, ServiceError>;

    /// Administrative removal; bypasses the lifecycle on purpose.
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;

    /// Returns the requested page (1-based) and the total match count.
    async fn list(
        &self,
        filters: &JobFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<JobAggregate>, u64), ServiceError>;
}
