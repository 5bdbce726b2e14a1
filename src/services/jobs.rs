//! The lifecycle engine. Every mutating command goes through the same path:
//! load the aggregate, apply the pure mutation, recompute the finance
//! rollup, and save at the loaded version. A `VersionConflict` triggers a
//! bounded reload-and-reapply (commands are idempotent), so two technicians
//! working different steps of the same job both succeed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::collaborators::{
    with_deadline, ContractReader, EmployeeDirectory, InvoiceWriter, TimeEntryStore,
};
use crate::commands::jobs::{
    AddMaterialCommand, AssignEmployeeCommand, AttachInvoiceCommand, CancelJobCommand,
    CompleteJobCommand, CompleteStepCommand, CreateJobCommand, JobCommand, PauseJobCommand,
    RecordDeliverablesCommand, RecordQualityCommand, RecordSignatureCommand,
    RemoveMaterialCommand, RemoveStepCommand, ResumeJobCommand, ScheduleJobCommand,
    StartJobCommand, SyncTimeEntriesCommand, ToggleChecklistCommand, UnassignEmployeeCommand,
    UpdateJobCommand, UpsertStepCommand,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::job::{DeliverableResult, EntityRef, JobAggregate, JobStatus, SignatureCapture};
use crate::repositories::JobRepository;
use crate::services::finance::{self, PricingInputs};
use crate::services::{assignments, materials, steps};

lazy_static! {
    static ref JOB_COMMANDS: IntCounterVec = register_int_counter_vec!(
        "fieldops_job_commands_total",
        "Job commands executed successfully",
        &["command"]
    )
    .expect("metric can be created");
    static ref JOB_COMMAND_FAILURES: IntCounterVec = register_int_counter_vec!(
        "fieldops_job_command_failures_total",
        "Job commands rejected, labelled by error kind",
        &["command", "kind"]
    )
    .expect("metric can be created");
}

/// Reload-and-reapply attempts before a `VersionConflict` is surfaced.
const MAX_SAVE_ATTEMPTS: u32 = 3;

pub struct JobLifecycleService {
    repository: Arc<dyn JobRepository>,
    directory: Arc<dyn EmployeeDirectory>,
    time_entries: Arc<dyn TimeEntryStore>,
    contracts: Arc<dyn ContractReader>,
    invoices: Arc<dyn InvoiceWriter>,
    event_sender: EventSender,
    lookup_deadline: Duration,
    adhoc_service_fee: Decimal,
    default_currency: String,
}

impl JobLifecycleService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository: Arc<dyn JobRepository>,
        directory: Arc<dyn EmployeeDirectory>,
        time_entries: Arc<dyn TimeEntryStore>,
        contracts: Arc<dyn ContractReader>,
        invoices: Arc<dyn InvoiceWriter>,
        event_sender: EventSender,
        lookup_deadline: Duration,
        adhoc_service_fee: Decimal,
        default_currency: String,
    ) -> Self {
        Self {
            repository,
            directory,
            time_entries,
            contracts,
            invoices,
            event_sender,
            lookup_deadline,
            adhoc_service_fee,
            default_currency,
        }
    }

    fn fail(command: &'static str, err: ServiceError) -> ServiceError {
        JOB_COMMAND_FAILURES
            .with_label_values(&[command, err.kind()])
            .inc();
        err
    }

    /// Load, apply, roll up finance, save at the loaded version. Retries on
    /// `VersionConflict`; any other error aborts the whole command with no
    /// partial write.
    async fn execute<F>(
        &self,
        command: &'static str,
        job_id: Uuid,
        apply: F,
    ) -> Result<JobAggregate, ServiceError>
    where
        F: Fn(&mut JobAggregate, DateTime<Utc>) -> Result<Event, ServiceError>,
    {
        let mut attempt = 0;
        let result = loop {
            attempt += 1;
            let mut job = self
                .repository
                .find_by_id(job_id)
                .await?
                .ok_or(ServiceError::JobNotFound(job_id))?;
            let loaded_version = job.version;
            let now = Utc::now();

            let event = match apply(&mut job, now) {
                Ok(event) => event,
                Err(e) => break Err(e),
            };
            if let Err(e) = self.refresh_finance(&mut job).await {
                break Err(e);
            }
            if job.status == JobStatus::Completed && !job.finance.frozen {
                finance::freeze(&mut job);
            }
            job.updated_at = now;

            match self.repository.save(&job, loaded_version).await {
                Ok(saved) => {
                    if let Err(e) = self.event_sender.send(event).await {
                        warn!(job_id = %job_id, error = %e, "event emission failed after save");
                    }
                    break Ok(saved);
                }
                Err(ServiceError::VersionConflict { .. }) if attempt < MAX_SAVE_ATTEMPTS => {
                    warn!(job_id = %job_id, attempt, "version conflict; reloading and reapplying");
                    continue;
                }
                Err(e) => break Err(e),
            }
        };

        match result {
            Ok(saved) => {
                JOB_COMMANDS.with_label_values(&[command]).inc();
                Ok(saved)
            }
            Err(e) => Err(Self::fail(command, e)),
        }
    }

    async fn refresh_finance(&self, job: &mut JobAggregate) -> Result<(), ServiceError> {
        if job.finance.frozen {
            return Ok(());
        }
        let pricing = self.pricing_inputs(job).await?;
        finance::recompute(job, &pricing)
    }

    async fn pricing_inputs(&self, job: &JobAggregate) -> Result<PricingInputs, ServiceError> {
        let mut hourly_rates = HashMap::new();
        for assignment in &job.assignments {
            let profile = with_deadline(
                "employee directory",
                self.lookup_deadline,
                self.directory.resolve(assignment.employee_ref),
            )
            .await?
            .ok_or(ServiceError::UnknownEmployee(assignment.employee_ref))?;
            hourly_rates.insert(assignment.employee_ref, profile.hourly_rate);
        }

        let contract_price = match job.contract_ref {
            Some(contract_id) => with_deadline(
                "contract reader",
                self.lookup_deadline,
                self.contracts.resolve(contract_id),
            )
            .await?
            .and_then(|c| c.fixed_price),
            None => None,
        };

        Ok(PricingInputs {
            hourly_rates,
            contract_price,
            adhoc_service_fee: self.adhoc_service_fee,
        })
    }

    #[instrument(skip(self, command), fields(code = %command.code))]
    pub async fn create_job(
        &self,
        tenant: &str,
        command: CreateJobCommand,
    ) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("create", e.into()))?;
        if self
            .repository
            .find_by_code(tenant, &command.code)
            .await?
            .is_some()
        {
            return Err(Self::fail(
                "create",
                ServiceError::Conflict(format!(
                    "job code `{}` already exists for this tenant",
                    command.code
                )),
            ));
        }

        let now = Utc::now();
        let mut job = JobAggregate::new(
            tenant,
            command.code.clone(),
            self.default_currency.clone(),
            now,
        );
        job.title = command.title;
        job.description = command.description;
        job.source = command.source;
        job.priority = command.priority;
        job.tags = command.tags;
        job.finance.billable = command.billable;
        job.apartment_ref = command.apartment.as_ref().map(EntityRef::id);
        job.service_ref = command.service.as_ref().map(EntityRef::id);
        job.contract_ref = command.contract.as_ref().map(EntityRef::id);
        job.category_ref = command.category.as_ref().map(EntityRef::id);
        for step in command.steps {
            steps::upsert_step(&mut job, step).map_err(|e| Self::fail("create", e))?;
        }
        self.refresh_finance(&mut job)
            .await
            .map_err(|e| Self::fail("create", e))?;

        let saved = self
            .repository
            .save(&job, 0)
            .await
            .map_err(|e| Self::fail("create", e))?;
        JOB_COMMANDS.with_label_values(&["create"]).inc();
        info!(job_id = %saved.id, tenant = %saved.tenant, "job created");

        if let Err(e) = self.event_sender.send(Event::JobCreated(saved.id)).await {
            warn!(job_id = %saved.id, error = %e, "event emission failed after save");
        }
        Ok(saved)
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn update_job(&self, command: UpdateJobCommand) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("update", e.into()))?;
        if let Some(field) = command.rejected_field() {
            return Err(Self::fail(
                "update",
                ServiceError::UseLifecycleCommand(field.to_string()),
            ));
        }

        self.execute("update", command.job_id, move |job, _now| {
            if job.status.is_terminal() {
                return Err(job.invalid_transition("update"));
            }
            if let Some(title) = &command.title {
                job.title = title.clone();
            }
            if let Some(description) = &command.description {
                job.description = description.clone();
            }
            if let Some(tags) = &command.tags {
                job.tags = tags.clone();
            }
            if let Some(priority) = command.priority {
                job.priority = priority;
            }
            if let Some(is_active) = command.is_active {
                job.is_active = is_active;
            }
            if let Some(billable) = command.billable {
                job.finance.billable = billable;
            }
            Ok(Event::JobUpdated(job.id))
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn schedule(&self, command: ScheduleJobCommand) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("schedule", e.into()))?;
        self.execute("schedule", command.job_id, move |job, _now| {
            job.schedule_window(command.planned_start, command.planned_end, command.due_at)?;
            Ok(Event::JobScheduled(job.id))
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn start(&self, command: StartJobCommand) -> Result<JobAggregate, ServiceError> {
        self.execute("start", command.job_id, move |job, now| {
            job.start(now)?;
            Ok(Event::JobStarted(job.id))
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn pause(&self, command: PauseJobCommand) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("pause", e.into()))?;
        self.execute("pause", command.job_id, move |job, now| {
            job.pause(now, command.reason.clone())?;
            Ok(Event::JobPaused {
                job_id: job.id,
                reason: command.reason.clone(),
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn resume(&self, command: ResumeJobCommand) -> Result<JobAggregate, ServiceError> {
        self.execute("resume", command.job_id, move |job, now| {
            job.resume(now)?;
            Ok(Event::JobResumed(job.id))
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn complete(&self, command: CompleteJobCommand) -> Result<JobAggregate, ServiceError> {
        self.execute("complete", command.job_id, move |job, now| {
            job.complete(now)?;
            Ok(Event::JobCompleted {
                job_id: job.id,
                on_time: job.schedule.on_time,
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn cancel(&self, command: CancelJobCommand) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("cancel", e.into()))?;
        self.execute("cancel", command.job_id, move |job, now| {
            job.cancel(now, command.reason.clone())?;
            Ok(Event::JobCancelled {
                job_id: job.id,
                reason: command.reason.clone(),
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn assign_employee(
        &self,
        command: AssignEmployeeCommand,
    ) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("assign", e.into()))?;

        // Resolve before touching the aggregate so an unknown employee or a
        // directory outage rejects the command with no state change.
        let employee_id = command.employee.id();
        let profile = with_deadline(
            "employee directory",
            self.lookup_deadline,
            self.directory.resolve(employee_id),
        )
        .await
        .map_err(|e| Self::fail("assign", e))?
        .ok_or_else(|| Self::fail("assign", ServiceError::UnknownEmployee(employee_id)))?;

        let role = command.role;
        info!(employee = %profile.name, role = %role, "assigning employee");
        self.execute("assign", command.job_id, move |job, _now| {
            assignments::add_assignment(job, employee_id, role, command.planned_minutes)?;
            Ok(Event::EmployeeAssigned {
                job_id: job.id,
                employee_id,
                role: role.to_string(),
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn unassign_employee(
        &self,
        command: UnassignEmployeeCommand,
    ) -> Result<JobAggregate, ServiceError> {
        self.execute("unassign", command.job_id, move |job, _now| {
            assignments::remove_assignment(job, command.employee_id)?;
            Ok(Event::EmployeeUnassigned {
                job_id: job.id,
                employee_id: command.employee_id,
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn sync_time_entries(
        &self,
        command: SyncTimeEntriesCommand,
    ) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("sync_time_entries", e.into()))?;

        // Fetch durations first; if the time source is down the command is
        // rejected and the aggregate left unchanged.
        let entries = with_deadline(
            "time-entry store",
            self.lookup_deadline,
            self.time_entries.durations(&command.time_entry_refs),
        )
        .await
        .map_err(|e| Self::fail("sync_time_entries", e))?;
        let minutes: Vec<i64> = entries.iter().map(|e| e.minutes).collect();

        self.execute("sync_time_entries", command.job_id, move |job, _now| {
            assignments::apply_time_entries(
                job,
                command.employee_id,
                command.time_entry_refs.clone(),
                &minutes,
            )?;
            let actual_minutes = job
                .assignments
                .iter()
                .find(|a| a.employee_ref == command.employee_id)
                .map(|a| a.actual_minutes)
                .unwrap_or(0);
            Ok(Event::TimeEntriesSynced {
                job_id: job.id,
                employee_id: command.employee_id,
                actual_minutes,
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn upsert_step(&self, command: UpsertStepCommand) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("upsert_step", e.into()))?;
        self.execute("upsert_step", command.job_id, move |job, _now| {
            steps::upsert_step(job, command.step.clone())?;
            Ok(Event::StepUpserted {
                job_id: job.id,
                step_code: command.step.step_code.clone(),
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn remove_step(&self, command: RemoveStepCommand) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("remove_step", e.into()))?;
        self.execute("remove_step", command.job_id, move |job, _now| {
            steps::remove_step(job, &command.step_code)?;
            Ok(Event::StepRemoved {
                job_id: job.id,
                step_code: command.step_code.clone(),
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn toggle_checklist(
        &self,
        command: ToggleChecklistCommand,
    ) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("toggle_checklist", e.into()))?;
        self.execute("toggle_checklist", command.job_id, move |job, _now| {
            steps::toggle_checklist(
                job,
                &command.step_code,
                command.item_index,
                command.checked,
                command.photo_urls.clone(),
                command.note.clone(),
            )?;
            Ok(Event::ChecklistToggled {
                job_id: job.id,
                step_code: command.step_code.clone(),
                item_index: command.item_index,
                checked: command.checked,
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn record_quality(
        &self,
        command: RecordQualityCommand,
    ) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("record_quality", e.into()))?;
        self.execute("record_quality", command.job_id, move |job, now| {
            steps::record_quality(
                job,
                &command.step_code,
                command.key.clone(),
                command.outcome.clone(),
                now,
            )?;
            Ok(Event::QualityRecorded {
                job_id: job.id,
                step_code: command.step_code.clone(),
                key: command.key.clone(),
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn complete_step(
        &self,
        command: CompleteStepCommand,
    ) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("complete_step", e.into()))?;
        self.execute("complete_step", command.job_id, move |job, _now| {
            let changed = steps::complete_step(job, &command.step_code, command.elapsed_minutes)?;
            if !changed {
                info!(step_code = %command.step_code, "step already completed; retry is a no-op");
            }
            Ok(Event::StepCompleted {
                job_id: job.id,
                step_code: command.step_code.clone(),
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn add_material(&self, command: AddMaterialCommand) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("add_material", e.into()))?;
        self.execute("add_material", command.job_id, move |job, _now| {
            let usage_id = materials::add_usage(job, command.usage.clone())?;
            Ok(Event::MaterialRecorded {
                job_id: job.id,
                usage_id,
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn remove_material(
        &self,
        command: RemoveMaterialCommand,
    ) -> Result<JobAggregate, ServiceError> {
        self.execute("remove_material", command.job_id, move |job, _now| {
            materials::remove_usage(job, command.usage_id)?;
            Ok(Event::MaterialRemoved {
                job_id: job.id,
                usage_id: command.usage_id,
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn record_deliverables(
        &self,
        command: RecordDeliverablesCommand,
    ) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("record_deliverables", e.into()))?;
        self.execute("record_deliverables", command.job_id, move |job, _now| {
            if !job.status.allows_execution() {
                return Err(job.invalid_transition("record_deliverables"));
            }
            let deliverables = job.deliverables.get_or_insert_with(DeliverableResult::default);
            deliverables
                .before_photos
                .extend(command.before_photos.iter().cloned());
            deliverables
                .after_photos
                .extend(command.after_photos.iter().cloned());
            if command.notes.is_some() {
                deliverables.notes = command.notes.clone();
            }
            deliverables
                .attachments
                .extend(command.attachments.iter().cloned());
            Ok(Event::DeliverablesRecorded(job.id))
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn record_signature(
        &self,
        command: RecordSignatureCommand,
    ) -> Result<JobAggregate, ServiceError> {
        command
            .validate()
            .map_err(|e| Self::fail("record_signature", e.into()))?;
        self.execute("record_signature", command.job_id, move |job, now| {
            if !job.status.allows_execution() {
                return Err(job.invalid_transition("record_signature"));
            }
            let deliverables = job.deliverables.get_or_insert_with(DeliverableResult::default);
            deliverables.signatures.push(SignatureCapture {
                kind: command.kind,
                name: command.name.clone(),
                signer_ref: command.signer.as_ref().map(EntityRef::id),
                signed_at: now,
                image_url: command.image_url.clone(),
            });
            Ok(Event::SignatureCaptured {
                job_id: job.id,
                kind: command.kind.to_string(),
            })
        })
        .await
    }

    #[instrument(skip(self, command), fields(job_id = %command.job_id))]
    pub async fn attach_invoice(
        &self,
        command: AttachInvoiceCommand,
    ) -> Result<JobAggregate, ServiceError> {
        let job = self
            .repository
            .find_by_id(command.job_id)
            .await?
            .ok_or_else(|| Self::fail("attach_invoice", ServiceError::JobNotFound(command.job_id)))?;
        if job.status != JobStatus::Completed {
            return Err(Self::fail(
                "attach_invoice",
                job.invalid_transition("attach_invoice"),
            ));
        }
        if job.finance.invoice_ref.is_some() {
            return Err(Self::fail(
                "attach_invoice",
                ServiceError::SnapshotFrozen(job.id),
            ));
        }

        let receipt = with_deadline(
            "invoice writer",
            self.lookup_deadline,
            self.invoices.register(&job),
        )
        .await
        .map_err(|e| Self::fail("attach_invoice", e))?;

        self.execute("attach_invoice", command.job_id, move |job, _now| {
            if job.status != JobStatus::Completed {
                return Err(job.invalid_transition("attach_invoice"));
            }
            if job.finance.invoice_ref.is_some() {
                return Err(ServiceError::SnapshotFrozen(job.id));
            }
            job.finance.invoice_ref = Some(receipt.invoice_ref.clone());
            job.finance.invoice_line_id = Some(receipt.invoice_line_id.clone());
            Ok(Event::InvoiceAttached {
                job_id: job.id,
                invoice_ref: receipt.invoice_ref.clone(),
            })
        })
        .await
    }

    /// Administrative removal; not a lifecycle command, always audited.
    #[instrument(skip(self))]
    pub async fn delete_job(&self, id: Uuid) -> Result<(), ServiceError> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| Self::fail("delete", e))?;
        JOB_COMMANDS.with_label_values(&["delete"]).inc();
        info!(job_id = %id, "job deleted administratively");
        if let Err(e) = self.event_sender.send(Event::JobDeleted(id)).await {
            warn!(job_id = %id, error = %e, "event emission failed after delete");
        }
        Ok(())
    }

    /// The `dispatchCommand` surface: route a tagged command envelope to the
    /// matching handler. The path id wins over any id inside the payload.
    pub async fn dispatch(
        &self,
        job_id: Uuid,
        command: JobCommand,
    ) -> Result<JobAggregate, ServiceError> {
        match command {
            JobCommand::Schedule(mut c) => {
                c.job_id = job_id;
                self.schedule(c).await
            }
            JobCommand::Start(mut c) => {
                c.job_id = job_id;
                self.start(c).await
            }
            JobCommand::Pause(mut c) => {
                c.job_id = job_id;
                self.pause(c).await
            }
            JobCommand::Resume(mut c) => {
                c.job_id = job_id;
                self.resume(c).await
            }
            JobCommand::Complete(mut c) => {
                c.job_id = job_id;
                self.complete(c).await
            }
            JobCommand::Cancel(mut c) => {
                c.job_id = job_id;
                self.cancel(c).await
            }
            JobCommand::Assign(mut c) => {
                c.job_id = job_id;
                self.assign_employee(c).await
            }
            JobCommand::Unassign(mut c) => {
                c.job_id = job_id;
                self.unassign_employee(c).await
            }
            JobCommand::SyncTimeEntries(mut c) => {
                c.job_id = job_id;
                self.sync_time_entries(c).await
            }
            JobCommand::UpsertStep(mut c) => {
                c.job_id = job_id;
                self.upsert_step(c).await
            }
            JobCommand::RemoveStep(mut c) => {
                c.job_id = job_id;
                self.remove_step(c).await
            }
            JobCommand::ToggleChecklist(mut c) => {
                c.job_id = job_id;
                self.toggle_checklist(c).await
            }
            JobCommand::RecordQuality(mut c) => {
                c.job_id = job_id;
                self.record_quality(c).await
            }
            JobCommand::CompleteStep(mut c) => {
                c.job_id = job_id;
                self.complete_step(c).await
            }
            JobCommand::AddMaterial(mut c) => {
                c.job_id = job_id;
                self.add_material(c).await
            }
            JobCommand::RemoveMaterial(mut c) => {
                c.job_id = job_id;
                self.remove_material(c).await
            }
            JobCommand::RecordDeliverables(mut c) => {
                c.job_id = job_id;
                self.record_deliverables(c).await
            }
            JobCommand::RecordSignature(mut c) => {
                c.job_id = job_id;
                self.record_signature(c).await
            }
            JobCommand::AttachInvoice(mut c) => {
                c.job_id = job_id;
                self.attach_invoice(c).await
            }
        }
    }
}
