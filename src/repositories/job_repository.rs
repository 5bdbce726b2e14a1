use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionError, TransactionTrait,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::entities::job::{self, Entity as JobEntity};
use crate::errors::ServiceError;
use crate::models::job::JobAggregate;
use crate::repositories::{JobFilters, JobRepository};

/// sea-orm-backed repository. Each save rewrites the whole row inside a
/// transaction after re-checking the version column, so concurrent writers
/// surface as `VersionConflict` instead of silently overwriting each other.
#[derive(Debug, Clone)]
pub struct SqlJobRepository {
    db: Arc<DatabaseConnection>,
}

impl SqlJobRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn conditions(filters: &JobFilters) -> Condition {
        let mut cond = Condition::all();
        if let Some(tenant) = &filters.tenant {
            cond = cond.add(job::Column::Tenant.eq(tenant.clone()));
        }
        if let Some(status) = filters.status {
            cond = cond.add(job::Column::Status.eq(status));
        }
        if let Some(source) = filters.source {
            cond = cond.add(job::Column::Source.eq(source));
        }
        if let Some(priority) = filters.priority {
            cond = cond.add(job::Column::Priority.eq(priority));
        }
        if let Some(id) = filters.apartment_ref {
            cond = cond.add(job::Column::ApartmentId.eq(id));
        }
        if let Some(id) = filters.service_ref {
            cond = cond.add(job::Column::ServiceId.eq(id));
        }
        if let Some(id) = filters.contract_ref {
            cond = cond.add(job::Column::ContractId.eq(id));
        }
        if let Some(id) = filters.employee_ref {
            cond = cond.add(job::Column::AssigneeIds.contains(id.to_string()));
        }
        if let Some(q) = &filters.q {
            cond = cond.add(job::Column::SearchText.contains(q.to_lowercase()));
        }
        if let Some(from) = filters.planned_from {
            cond = cond.add(job::Column::PlannedStart.gte(from));
        }
        if let Some(to) = filters.planned_to {
            cond = cond.add(job::Column::PlannedStart.lte(to));
        }
        if let Some(from) = filters.due_from {
            cond = cond.add(job::Column::DueAt.gte(from));
        }
        if let Some(to) = filters.due_to {
            cond = cond.add(job::Column::DueAt.lte(to));
        }
        if let Some(active) = filters.is_active {
            cond = cond.add(job::Column::IsActive.eq(active));
        }
        cond
    }
}

#[async_trait]
impl JobRepository for SqlJobRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobAggregate>, ServiceError> {
        JobEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(job::Model::into_aggregate)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_code(
        &self,
        tenant: &str,
        code: &str,
    ) -> Result<Option<JobAggregate>, ServiceError> {
        JobEntity::find()
            .filter(job::Column::Tenant.eq(tenant))
            .filter(job::Column::Code.eq(code))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(job::Model::into_aggregate)
            .transpose()
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, expected_version))]
    async fn save(
        &self,
        job: &JobAggregate,
        expected_version: i32,
    ) -> Result<JobAggregate, ServiceError> {
        if expected_version == 0 {
            let active = job::active_model_from(job, 1)?;
            let model = active
                .insert(&*self.db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            return model.into_aggregate();
        }

        let aggregate = job.clone();
        let model = self
            .db
            .transaction::<_, job::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let current = JobEntity::find_by_id(aggregate.id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .ok_or(ServiceError::JobNotFound(aggregate.id))?;

                    if current.version != expected_version {
                        warn!(
                            job_id = %aggregate.id,
                            expected = expected_version,
                            actual = current.version,
                            "optimistic lock rejected stale write"
                        );
                        return Err(ServiceError::VersionConflict {
                            job_id: aggregate.id,
                            expected: expected_version,
                            actual: current.version,
                        });
                    }

                    let active = job::active_model_from(&aggregate, expected_version + 1)?;
                    active.update(txn).await.map_err(ServiceError::DatabaseError)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        model.into_aggregate()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = JobEntity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::JobNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self, filters))]
    async fn list(
        &self,
        filters: &JobFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<JobAggregate>, u64), ServiceError> {
        let page = page.max(1);
        let limit = limit.max(1);

        let paginator = JobEntity::find()
            .filter(Self::conditions(filters))
            .order_by_with_nulls(job::Column::DueAt, Order::Asc, NullOrdering::Last)
            .order_by_desc(job::Column::Priority)
            .order_by_asc(job::Column::CreatedAt)
            .order_by_asc(job::Column::Id)
            .paginate(&*self.db, limit);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let jobs = models
            .into_iter()
            .map(job::Model::into_aggregate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((jobs, total))
    }
}
