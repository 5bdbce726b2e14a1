use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Domain events emitted after an aggregate change has been durably saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    JobCreated(Uuid),
    JobUpdated(Uuid),
    JobScheduled(Uuid),
    JobStarted(Uuid),
    JobPaused {
        job_id: Uuid,
        reason: String,
    },
    JobResumed(Uuid),
    JobCompleted {
        job_id: Uuid,
        on_time: Option<bool>,
    },
    JobCancelled {
        job_id: Uuid,
        reason: String,
    },
    JobDeleted(Uuid),
    EmployeeAssigned {
        job_id: Uuid,
        employee_id: Uuid,
        role: String,
    },
    EmployeeUnassigned {
        job_id: Uuid,
        employee_id: Uuid,
    },
    TimeEntriesSynced {
        job_id: Uuid,
        employee_id: Uuid,
        actual_minutes: i64,
    },
    StepUpserted {
        job_id: Uuid,
        step_code: String,
    },
    StepRemoved {
        job_id: Uuid,
        step_code: String,
    },
    StepCompleted {
        job_id: Uuid,
        step_code: String,
    },
    ChecklistToggled {
        job_id: Uuid,
        step_code: String,
        item_index: usize,
        checked: bool,
    },
    QualityRecorded {
        job_id: Uuid,
        step_code: String,
        key: String,
    },
    MaterialRecorded {
        job_id: Uuid,
        usage_id: Uuid,
    },
    MaterialRemoved {
        job_id: Uuid,
        usage_id: Uuid,
    },
    DeliverablesRecorded(Uuid),
    SignatureCaptured {
        job_id: Uuid,
        kind: String,
    },
    InvoiceAttached {
        job_id: Uuid,
        invoice_ref: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Event processing loop. Downstream consumers (notifications, reporting)
/// hang off this; for now every event is logged.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");
    while let Some(event) = rx.recv().await {
        info!(?event, "domain event");
    }
    info!("Event channel closed; stopping event processing loop");
}
