//! Assignment bookkeeping for a job: who is bound to it, in which role, and
//! how much of their time it has consumed.
//!
//! `actual_minutes` is derived from linked time entries and only ever written
//! by [`apply_time_entries`]; client input never reaches it.

use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::job::{Assignment, AssigneeRole, JobAggregate, JobStatus};

/// Upper bound on planned allocation for a single assignee (one month of
/// around-the-clock work); anything larger is a client bug.
const MAX_PLANNED_MINUTES: i64 = 31 * 24 * 60;

/// Add an employee to the job, or update their role/allocation if already
/// assigned. At most one lead per job.
pub fn add_assignment(
    job: &mut JobAggregate,
    employee_ref: Uuid,
    role: AssigneeRole,
    planned_minutes: i64,
) -> Result<(), ServiceError> {
    if job.status.is_terminal() {
        return Err(job.invalid_transition("assign"));
    }
    if !(0..=MAX_PLANNED_MINUTES).contains(&planned_minutes) {
        return Err(ServiceError::InvalidDuration(planned_minutes));
    }
    if role == AssigneeRole::Lead {
        if let Some(lead) = job.lead() {
            if lead.employee_ref != employee_ref {
                return Err(ServiceError::DuplicateLead(employee_ref));
            }
        }
    }

    match job
        .assignments
        .iter_mut()
        .find(|a| a.employee_ref == employee_ref)
    {
        Some(existing) => {
            existing.role = role;
            existing.planned_minutes = planned_minutes;
        }
        None => job.assignments.push(Assignment {
            employee_ref,
            role,
            planned_minutes,
            actual_minutes: 0,
            time_entry_refs: Vec::new(),
        }),
    }
    Ok(())
}

/// Remove an employee from the job. A job with work underway must always keep
/// at least one assignee.
pub fn remove_assignment(job: &mut JobAggregate, employee_ref: Uuid) -> Result<(), ServiceError> {
    if job.status.is_terminal() {
        return Err(job.invalid_transition("unassign"));
    }
    let index = job
        .assignments
        .iter()
        .position(|a| a.employee_ref == employee_ref)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("employee {employee_ref} is not assigned to this job"))
        })?;

    let underway = matches!(job.status, JobStatus::InProgress | JobStatus::Paused);
    if underway && job.assignments.len() == 1 {
        return Err(ServiceError::LastLeadRemoval(job.id));
    }

    job.assignments.remove(index);
    Ok(())
}

/// Overwrite an assignment's time-entry links and its derived
/// `actual_minutes` with durations fetched from the time-tracking
/// collaborator. This is the only writer of `actual_minutes`.
pub fn apply_time_entries(
    job: &mut JobAggregate,
    employee_ref: Uuid,
    refs: Vec<Uuid>,
    minutes: &[i64],
) -> Result<(), ServiceError> {
    if job.status.is_terminal() {
        return Err(job.invalid_transition("sync_time_entries"));
    }
    let assignment = job
        .assignments
        .iter_mut()
        .find(|a| a.employee_ref == employee_ref)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("employee {employee_ref} is not assigned to this job"))
        })?;

    assignment.actual_minutes = minutes.iter().copied().filter(|m| *m > 0).sum();
    assignment.time_entry_refs = refs;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn job() -> JobAggregate {
        JobAggregate::new("acme", "JOB-010", "EUR", Utc::now())
    }

    #[test]
    fn at_most_one_lead() {
        let mut job = job();
        let lead = Uuid::new_v4();
        let second = Uuid::new_v4();

        add_assignment(&mut job, lead, AssigneeRole::Lead, 120).unwrap();
        let err = add_assignment(&mut job, second, AssigneeRole::Lead, 60).unwrap_err();
        assert_matches!(err, ServiceError::DuplicateLead(id) if id == second);

        // The existing lead may be re-upserted without tripping the invariant.
        add_assignment(&mut job, lead, AssigneeRole::Lead, 150).unwrap();
        assert_eq!(job.assignments.len(), 1);
        assert_eq!(job.assignments[0].planned_minutes, 150);
    }

    #[test]
    fn reassignment_updates_in_place() {
        let mut job = job();
        let member = Uuid::new_v4();
        add_assignment(&mut job, member, AssigneeRole::Member, 60).unwrap();
        add_assignment(&mut job, member, AssigneeRole::Lead, 90).unwrap();

        assert_eq!(job.assignments.len(), 1);
        assert_eq!(job.assignments[0].role, AssigneeRole::Lead);
    }

    #[test]
    fn rejects_absurd_planned_minutes() {
        let mut job = job();
        let err = add_assignment(&mut job, Uuid::new_v4(), AssigneeRole::Member, -5).unwrap_err();
        assert_matches!(err, ServiceError::InvalidDuration(-5));
    }

    #[test]
    fn cannot_remove_last_assignee_while_underway() {
        let mut job = job();
        let lead = Uuid::new_v4();
        add_assignment(&mut job, lead, AssigneeRole::Lead, 60).unwrap();
        job.status = JobStatus::InProgress;

        let err = remove_assignment(&mut job, lead).unwrap_err();
        assert_matches!(err, ServiceError::LastLeadRemoval(_));
        assert_eq!(job.assignments.len(), 1);

        // With a second assignee present the removal goes through.
        let member = Uuid::new_v4();
        add_assignment(&mut job, member, AssigneeRole::Member, 30).unwrap();
        remove_assignment(&mut job, lead).unwrap();
        assert_eq!(job.assignments.len(), 1);
    }

    #[test]
    fn removal_is_unrestricted_before_start() {
        let mut job = job();
        let lead = Uuid::new_v4();
        add_assignment(&mut job, lead, AssigneeRole::Lead, 60).unwrap();
        remove_assignment(&mut job, lead).unwrap();
        assert!(job.assignments.is_empty());
    }

    #[test]
    fn time_entries_overwrite_actual_minutes() {
        let mut job = job();
        let lead = Uuid::new_v4();
        add_assignment(&mut job, lead, AssigneeRole::Lead, 60).unwrap();

        let refs = vec![Uuid::new_v4(), Uuid::new_v4()];
        apply_time_entries(&mut job, lead, refs.clone(), &[25, 40]).unwrap();
        assert_eq!(job.assignments[0].actual_minutes, 65);
        assert_eq!(job.assignments[0].time_entry_refs, refs);

        // A later sync replaces rather than accumulates.
        apply_time_entries(&mut job, lead, refs, &[30]).unwrap();
        assert_eq!(job.assignments[0].actual_minutes, 30);
    }

    #[test]
    fn unknown_assignee_is_not_found() {
        let mut job = job();
        let err = apply_time_entries(&mut job, Uuid::new_v4(), vec![], &[]).unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
    }
}
