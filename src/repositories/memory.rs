use std::cmp::Ordering;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::job::JobAggregate;
use crate::repositories::{JobFilters, JobRepository};

/// In-memory backend. The per-id dashmap entry lock makes each save an atomic
/// compare-and-swap on the version, which is all the optimistic-concurrency
/// contract needs. Used by the test suite and the `in-memory` storage backend.
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    jobs: DashMap<Uuid, JobAggregate>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Dispatch-board ordering: soonest due first with undated jobs last, then
/// most critical, then oldest; ids break ties so pagination is stable.
pub fn dispatch_board_cmp(a: &JobAggregate, b: &JobAggregate) -> Ordering {
    let due = match (a.schedule.due_at, b.schedule.due_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    due.then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn matches_filters(job: &JobAggregate, filters: &JobFilters) -> bool {
    if let Some(tenant) = &filters.tenant {
        if &job.tenant != tenant {
            return false;
        }
    }
    if let Some(status) = filters.status {
        if job.status != status {
            return false;
        }
    }
    if let Some(source) = filters.source {
        if job.source != source {
            return false;
        }
    }
    if let Some(priority) = filters.priority {
        if job.priority != priority {
            return false;
        }
    }
    if let Some(id) = filters.apartment_ref {
        if job.apartment_ref != Some(id) {
            return false;
        }
    }
    if let Some(id) = filters.service_ref {
        if job.service_ref != Some(id) {
            return false;
        }
    }
    if let Some(id) = filters.contract_ref {
        if job.contract_ref != Some(id) {
            return false;
        }
    }
    if let Some(id) = filters.employee_ref {
        if !job.assignments.iter().any(|a| a.employee_ref == id) {
            return false;
        }
    }
    if let Some(q) = &filters.q {
        let needle = q.to_lowercase();
        let in_code = job.code.to_lowercase().contains(&needle);
        let in_title = job
            .title
            .values()
            .any(|t| t.to_lowercase().contains(&needle));
        if !in_code && !in_title {
            return false;
        }
    }
    if let Some(from) = filters.planned_from {
        if !job.schedule.planned_start.map_or(false, |v| v >= from) {
            return false;
        }
    }
    if let Some(to) = filters.planned_to {
        if !job.schedule.planned_start.map_or(false, |v| v <= to) {
            return false;
        }
    }
    if let Some(from) = filters.due_from {
        if !job.schedule.due_at.map_or(false, |v| v >= from) {
            return false;
        }
    }
    if let Some(to) = filters.due_to {
        if !job.schedule.due_at.map_or(false, |v| v <= to) {
            return false;
        }
    }
    if let Some(active) = filters.is_active {
        if job.is_active != active {
            return false;
        }
    }
    true
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobAggregate>, ServiceError> {
        Ok(self.jobs.get(&id).map(|entry| entry.clone()))
    }

    async fn find_by_code(
        &self,
        tenant: &str,
        code: &str,
    ) -> Result<Option<JobAggregate>, ServiceError> {
        Ok(self
            .jobs
            .iter()
            .find(|entry| entry.tenant == tenant && entry.code == code)
            .map(|entry| entry.clone()))
    }

    async fn save(
        &self,
        job: &JobAggregate,
        expected_version: i32,
    ) -> Result<JobAggregate, ServiceError> {
        match self.jobs.entry(job.id) {
            Entry::Vacant(slot) => {
                if expected_version != 0 {
                    return Err(ServiceError::JobNotFound(job.id));
                }
                let mut stored = job.clone();
                stored.version = 1;
                slot.insert(stored.clone());
                Ok(stored)
            }
            Entry::Occupied(mut slot) => {
                if expected_version == 0 {
                    return Err(ServiceError::Conflict(format!(
                        "job {} already exists",
                        job.id
                    )));
                }
                let actual = slot.get().version;
                if actual != expected_version {
                    return Err(ServiceError::VersionConflict {
                        job_id: job.id,
                        expected: expected_version,
                        actual,
                    });
                }
                let mut stored = job.clone();
                stored.version = expected_version + 1;
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.jobs
            .remove(&id)
            .map(|_| ())
            .ok_or(ServiceError::JobNotFound(id))
    }

    async fn list(
        &self,
        filters: &JobFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<JobAggregate>, u64), ServiceError> {
        let page = page.max(1);
        let limit = limit.max(1) as usize;

        let mut matches: Vec<JobAggregate> = self
            .jobs
            .iter()
            .filter(|entry| matches_filters(entry, filters))
            .map(|entry| entry.clone())
            .collect();
        matches.sort_by(dispatch_board_cmp);

        let total = matches.len() as u64;
        let start = ((page - 1) as usize).saturating_mul(limit);
        let items = matches.into_iter().skip(start).take(limit).collect();
        Ok((items, total))
    }
}
