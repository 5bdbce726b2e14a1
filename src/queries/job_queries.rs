//! Read side. No mutation rights: this service only loads aggregates,
//! resolves external references into display snapshots, and shapes pages for
//! dispatch boards. Reference resolution is best-effort — a collaborator
//! outage degrades labels to ids instead of failing the read.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::collaborators::{
    with_deadline, ApartmentReader, ContractReader, DisplayRef, ServiceCatalog,
};
use crate::errors::ServiceError;
use crate::models::job::{JobAggregate, JobPriority, JobSource, JobStatus};
use crate::repositories::{JobFilters, JobRepository};

const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Serialize, ToSchema)]
pub struct JobPage {
    pub items: Vec<JobListItem>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Dispatch-board row: the scalar attributes plus resolved display labels.
#[derive(Debug, Serialize, ToSchema)]
pub struct JobListItem {
    pub id: Uuid,
    pub tenant: String,
    pub code: String,
    pub title: BTreeMap<String, String>,
    pub status: JobStatus,
    pub priority: JobPriority,
    pub source: JobSource,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub planned_start: Option<DateTime<Utc>>,
    pub planned_end: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub on_time: Option<bool>,
    pub assignee_count: usize,
    pub lead_ref: Option<Uuid>,
    pub apartment: Option<DisplayRef>,
    pub service: Option<DisplayRef>,
    pub contract: Option<DisplayRef>,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

/// Full aggregate plus resolved references, for the detail view.
#[derive(Debug, Serialize, ToSchema)]
pub struct JobView {
    pub job: JobAggregate,
    pub apartment: Option<DisplayRef>,
    pub service: Option<DisplayRef>,
    pub contract: Option<DisplayRef>,
}

pub struct JobQueryService {
    repository: Arc<dyn JobRepository>,
    apartments: Arc<dyn ApartmentReader>,
    services: Arc<dyn ServiceCatalog>,
    contracts: Arc<dyn ContractReader>,
    lookup_deadline: Duration,
}

impl JobQueryService {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        apartments: Arc<dyn ApartmentReader>,
        services: Arc<dyn ServiceCatalog>,
        contracts: Arc<dyn ContractReader>,
        lookup_deadline: Duration,
    ) -> Self {
        Self {
            repository,
            apartments,
            services,
            contracts,
            lookup_deadline,
        }
    }

    #[instrument(skip(self, filters))]
    pub async fn list(
        &self,
        filters: &JobFilters,
        page: u64,
        limit: u64,
    ) -> Result<JobPage, ServiceError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);

        let (jobs, total) = self.repository.list(filters, page, limit).await?;
        let items = join_all(jobs.into_iter().map(|job| self.to_list_item(job))).await;

        Ok(JobPage {
            items,
            total,
            page,
            limit,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<JobView, ServiceError> {
        let job = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::JobNotFound(id))?;

        let apartment = self.resolve_apartment(job.apartment_ref).await;
        let service = self.resolve_service(job.service_ref).await;
        let contract = self.resolve_contract(job.contract_ref).await;

        Ok(JobView {
            job,
            apartment,
            service,
            contract,
        })
    }

    async fn to_list_item(&self, job: JobAggregate) -> JobListItem {
        let apartment = self.resolve_apartment(job.apartment_ref).await;
        let service = self.resolve_service(job.service_ref).await;
        let contract = self.resolve_contract(job.contract_ref).await;

        JobListItem {
            id: job.id,
            tenant: job.tenant,
            code: job.code,
            title: job.title,
            status: job.status,
            priority: job.priority,
            source: job.source,
            tags: job.tags,
            is_active: job.is_active,
            planned_start: job.schedule.planned_start,
            planned_end: job.schedule.planned_end,
            due_at: job.schedule.due_at,
            on_time: job.schedule.on_time,
            assignee_count: job.assignments.len(),
            lead_ref: job
                .assignments
                .iter()
                .find(|a| a.role == crate::models::job::AssigneeRole::Lead)
                .map(|a| a.employee_ref),
            apartment,
            service,
            contract,
            created_at: job.created_at,
            version: job.version,
        }
    }

    async fn resolve_apartment(&self, id: Option<Uuid>) -> Option<DisplayRef> {
        let id = id?;
        match with_deadline(
            "apartment reader",
            self.lookup_deadline,
            self.apartments.resolve(id),
        )
        .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!(apartment_id = %id, error = %e, "apartment label unresolved");
                None
            }
        }
    }

    async fn resolve_service(&self, id: Option<Uuid>) -> Option<DisplayRef> {
        let id = id?;
        match with_deadline(
            "service catalog",
            self.lookup_deadline,
            self.services.resolve(id),
        )
        .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!(service_id = %id, error = %e, "service label unresolved");
                None
            }
        }
    }

    async fn resolve_contract(&self, id: Option<Uuid>) -> Option<DisplayRef> {
        let id = id?;
        match with_deadline(
            "contract reader",
            self.lookup_deadline,
            self.contracts.resolve(id),
        )
        .await
        {
            Ok(found) => found.map(|c| DisplayRef {
                id: c.id,
                label: c.label,
            }),
            Err(e) => {
                warn!(contract_id = %id, error = %e, "contract label unresolved");
                None
            }
        }
    }
}
