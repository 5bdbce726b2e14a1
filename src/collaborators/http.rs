//! reqwest-backed collaborator clients. Each client is a thin wrapper over
//! one base URL; error mapping is the interesting part — transport failures
//! become the retryable external-dependency kinds, 404s become `None`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::collaborators::{
    ApartmentReader, ContractInfo, ContractReader, DisplayRef, EmployeeDirectory, EmployeeProfile,
    InvoiceReceipt, InvoiceWriter, ServiceCatalog, TimeEntry, TimeEntryStore,
};
use crate::errors::ServiceError;
use crate::models::job::JobAggregate;

fn external(err: reqwest::Error) -> ServiceError {
    ServiceError::ExternalServiceError(err.to_string())
}

async fn get_optional<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: String,
) -> Result<Option<T>, ServiceError> {
    let response = client.get(&url).send().await.map_err(external)?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let response = response.error_for_status().map_err(external)?;
    response.json::<T>().await.map_err(external).map(Some)
}

#[derive(Debug, Clone)]
pub struct HttpEmployeeDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEmployeeDirectory {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EmployeeDirectory for HttpEmployeeDirectory {
    async fn resolve(&self, id: Uuid) -> Result<Option<EmployeeProfile>, ServiceError> {
        get_optional(&self.client, format!("{}/employees/{}", self.base_url, id)).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpTimeEntryStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTimeEntryStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TimeEntryStore for HttpTimeEntryStore {
    async fn durations(&self, refs: &[Uuid]) -> Result<Vec<TimeEntry>, ServiceError> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let ids = refs
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/time-entries?ids={}", self.base_url, ids);

        // Any transport or decode failure here means the command that needed
        // the durations must be rejected, not applied speculatively.
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::TimeSourceUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| ServiceError::TimeSourceUnavailable(e.to_string()))?;
        response
            .json::<Vec<TimeEntry>>()
            .await
            .map_err(|e| ServiceError::TimeSourceUnavailable(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct HttpContractReader {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContractReader {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ContractReader for HttpContractReader {
    async fn resolve(&self, id: Uuid) -> Result<Option<ContractInfo>, ServiceError> {
        get_optional(&self.client, format!("{}/contracts/{}", self.base_url, id)).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpApartmentReader {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApartmentReader {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ApartmentReader for HttpApartmentReader {
    async fn resolve(&self, id: Uuid) -> Result<Option<DisplayRef>, ServiceError> {
        get_optional(&self.client, format!("{}/apartments/{}", self.base_url, id)).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpServiceCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpServiceCatalog {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ServiceCatalog for HttpServiceCatalog {
    async fn resolve(&self, id: Uuid) -> Result<Option<DisplayRef>, ServiceError> {
        get_optional(&self.client, format!("{}/services/{}", self.base_url, id)).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpInvoiceWriter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInvoiceWriter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl InvoiceWriter for HttpInvoiceWriter {
    async fn register(&self, job: &JobAggregate) -> Result<InvoiceReceipt, ServiceError> {
        let body = json!({
            "job_id": job.id,
            "tenant": job.tenant,
            "code": job.code,
            "currency": job.finance.currency,
            "revenue": job.finance.revenue_snapshot,
            "labor_cost": job.finance.labor_cost_snapshot,
            "material_cost": job.finance.material_cost_snapshot,
        });
        let response = self
            .client
            .post(format!("{}/invoices", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(external)?
            .error_for_status()
            .map_err(external)?;
        response.json::<InvoiceReceipt>().await.map_err(external)
    }
}
