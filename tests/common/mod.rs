//! Shared support for the integration suites: a lifecycle engine wired to the
//! in-memory repository and deterministic collaborator stubs.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

use fieldops_api::collaborators::{
    ContractInfo, ContractReader, EmployeeDirectory, EmployeeProfile, InvoiceReceipt,
    InvoiceWriter, TimeEntry, TimeEntryStore,
};
use fieldops_api::commands::jobs::CreateJobCommand;
use fieldops_api::errors::ServiceError;
use fieldops_api::events::EventSender;
use fieldops_api::models::job::JobAggregate;
use fieldops_api::repositories::InMemoryJobRepository;
use fieldops_api::services::jobs::JobLifecycleService;

pub const TENANT: &str = "acme";
pub const HOURLY_RATE: &str = "60";
pub const ADHOC_FEE: &str = "45";

/// Resolves every employee at a fixed hourly rate.
pub struct StubDirectory {
    pub rate: Decimal,
}

#[async_trait]
impl EmployeeDirectory for StubDirectory {
    async fn resolve(&self, id: Uuid) -> Result<Option<EmployeeProfile>, ServiceError> {
        Ok(Some(EmployeeProfile {
            id,
            name: "Sam Technician".into(),
            hourly_rate: self.rate,
        }))
    }
}

/// Every referenced time entry is worth the same number of minutes.
pub struct StubTimeEntries {
    pub minutes_per_entry: i64,
}

#[async_trait]
impl TimeEntryStore for StubTimeEntries {
    async fn durations(&self, refs: &[Uuid]) -> Result<Vec<TimeEntry>, ServiceError> {
        Ok(refs
            .iter()
            .map(|r| TimeEntry {
                id: *r,
                minutes: self.minutes_per_entry,
            })
            .collect())
    }
}

pub struct StubContracts {
    pub fixed_price: Option<Decimal>,
}

#[async_trait]
impl ContractReader for StubContracts {
    async fn resolve(&self, id: Uuid) -> Result<Option<ContractInfo>, ServiceError> {
        Ok(Some(ContractInfo {
            id,
            label: "Annual maintenance".into(),
            fixed_price: self.fixed_price,
        }))
    }
}

pub struct StubInvoices;

#[async_trait]
impl InvoiceWriter for StubInvoices {
    async fn register(&self, job: &JobAggregate) -> Result<InvoiceReceipt, ServiceError> {
        Ok(InvoiceReceipt {
            invoice_ref: format!("INV-{}", job.code),
            invoice_line_id: format!("INV-{}/1", job.code),
        })
    }
}

/// Engine over the in-memory repository with the given directory and time
/// source. Events are drained so sends never block the engine under test.
pub fn engine_with(
    directory: Arc<dyn EmployeeDirectory>,
    time_entries: Arc<dyn TimeEntryStore>,
    lookup_deadline: Duration,
) -> (Arc<JobLifecycleService>, Arc<InMemoryJobRepository>) {
    let repository = Arc::new(InMemoryJobRepository::new());
    let (tx, mut rx) = mpsc::channel(256);
    tokio::spawn(async move { while rx.recv().await.is_some() {} });

    let service = JobLifecycleService::new(
        repository.clone(),
        directory,
        time_entries,
        Arc::new(StubContracts { fixed_price: None }),
        Arc::new(StubInvoices),
        EventSender::new(tx),
        lookup_deadline,
        ADHOC_FEE.parse().unwrap(),
        "EUR".into(),
    );
    (Arc::new(service), repository)
}

pub fn engine() -> (Arc<JobLifecycleService>, Arc<InMemoryJobRepository>) {
    engine_with(
        Arc::new(StubDirectory {
            rate: HOURLY_RATE.parse().unwrap(),
        }),
        Arc::new(StubTimeEntries {
            minutes_per_entry: 30,
        }),
        Duration::from_millis(200),
    )
}

pub fn create_command(code: &str) -> CreateJobCommand {
    serde_json::from_value(serde_json::json!({
        "code": code,
        "title": { "en": "Radiator bleed, unit 4B" },
    }))
    .unwrap()
}

/// Step with a single required checklist item, in create-payload form.
pub fn guarded_step(step_code: &str) -> serde_json::Value {
    serde_json::json!({
        "step_code": step_code,
        "kind": "task",
        "checklist": [
            { "label": "shut off water", "required": true }
        ],
        "estimated_minutes": 15,
    })
}

/// Step with no required items, in create-payload form.
pub fn open_step(step_code: &str) -> serde_json::Value {
    serde_json::json!({
        "step_code": step_code,
        "kind": "task",
        "checklist": [],
    })
}
