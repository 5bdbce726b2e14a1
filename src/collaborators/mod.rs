//! Contracts for the external systems this engine consumes. All of them are
//! fallible remote calls; the engine wraps transport failures into its own
//! error taxonomy and bounds every lookup with a deadline.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::job::JobAggregate;

pub mod http;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: Uuid,
    pub name: String,
    pub hourly_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractInfo {
    pub id: Uuid,
    pub label: String,
    pub fixed_price: Option<Decimal>,
}

/// Display snapshot of an external entity, produced at the read boundary.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DisplayRef {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceReceipt {
    pub invoice_ref: String,
    pub invoice_line_id: String,
}

/// Employee master data: id to name and hourly rate.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn resolve(&self, id: Uuid) -> Result<Option<EmployeeProfile>, ServiceError>;
}

/// External time tracking; the sole source for assignment `actual_minutes`.
#[async_trait]
pub trait TimeEntryStore: Send + Sync {
    async fn durations(&self, refs: &[Uuid]) -> Result<Vec<TimeEntry>, ServiceError>;
}

#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn resolve(&self, id: Uuid) -> Result<Option<ContractInfo>, ServiceError>;
}

#[async_trait]
pub trait ApartmentReader: Send + Sync {
    async fn resolve(&self, id: Uuid) -> Result<Option<DisplayRef>, ServiceError>;
}

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn resolve(&self, id: Uuid) -> Result<Option<DisplayRef>, ServiceError>;
}

/// Invoicing system; receives the frozen finance snapshot after completion.
#[async_trait]
pub trait InvoiceWriter: Send + Sync {
    async fn register(&self, job: &JobAggregate) -> Result<InvoiceReceipt, ServiceError>;
}

/// Bound a collaborator call with a deadline. On expiry the engine reports a
/// retryable `ExternalLookupTimeout` and guarantees nothing was persisted.
pub async fn with_deadline<T, F>(
    label: &str,
    deadline: Duration,
    fut: F,
) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| ServiceError::ExternalLookupTimeout(label.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn deadline_expiry_maps_to_lookup_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, ServiceError>(1)
        };
        let err = with_deadline("employee directory", Duration::from_millis(5), slow)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ExternalLookupTimeout(label) if label == "employee directory");
    }

    #[tokio::test]
    async fn fast_lookups_pass_through() {
        let value = with_deadline("rates", Duration::from_millis(50), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
