pub mod job;

pub use job::{
    Assignment, AssigneeRole, ChargeTo, ChecklistItem, DeliverableResult, EntityRef, JobAggregate,
    JobFinance, JobPriority, JobSource, JobStatus, MaterialUsage, QualityCheck, QualityOutcome,
    Schedule, SignatureCapture, SignatureKind, StepKind, StepResult,
};
