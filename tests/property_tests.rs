//! Property-based tests for the job engine's derived-value invariants.
//!
//! These use proptest to verify that the material rollup can never drift from
//! its line items, that duration derivation excludes paused spans for any
//! interval layout, and that the checklist gate holds for arbitrary
//! checklists.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use fieldops_api::models::job::{
    Assignment, AssigneeRole, ChargeTo, ChecklistItem, JobAggregate, JobStatus, StepKind,
    StepResult,
};
use fieldops_api::repositories::memory::dispatch_board_cmp;
use fieldops_api::services::{materials, materials::MaterialUsageInput, steps};

fn job() -> JobAggregate {
    let created = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
    JobAggregate::new("acme", "JOB-P1", "EUR", created)
}

// Strategies for generating test data
fn money_strategy() -> impl Strategy<Value = Decimal> {
    // Cent amounts up to 10_000.00
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    // Tenths from 0.1 to 500.0
    (1i64..5_000).prop_map(|tenths| Decimal::new(tenths, 1))
}

fn charge_to_strategy() -> impl Strategy<Value = ChargeTo> {
    prop_oneof![
        Just(ChargeTo::Expense),
        Just(ChargeTo::Customer),
        Just(ChargeTo::Internal),
    ]
}

#[derive(Debug, Clone)]
enum LedgerOp {
    Add {
        quantity: Decimal,
        cost_per_unit: Decimal,
        charge_to: ChargeTo,
    },
    /// Remove the usage at this position (modulo the current length).
    Remove(usize),
}

fn ledger_op_strategy() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        3 => (quantity_strategy(), money_strategy(), charge_to_strategy()).prop_map(
            |(quantity, cost_per_unit, charge_to)| LedgerOp::Add {
                quantity,
                cost_per_unit,
                charge_to,
            }
        ),
        1 => (0usize..16).prop_map(LedgerOp::Remove),
    ]
}

proptest! {
    /// For any sequence of add/remove calls the snapshot input equals the sum
    /// of the remaining lines' quantity * cost_per_unit.
    #[test]
    fn material_cost_never_drifts(ops in proptest::collection::vec(ledger_op_strategy(), 1..40)) {
        let mut job = job();

        for op in ops {
            match op {
                LedgerOp::Add { quantity, cost_per_unit, charge_to } => {
                    materials::add_usage(&mut job, MaterialUsageInput {
                        item: None,
                        sku: None,
                        name: "Part".into(),
                        quantity,
                        unit: "pcs".into(),
                        cost_per_unit,
                        currency: "EUR".into(),
                        charge_to,
                    }).unwrap();
                }
                LedgerOp::Remove(slot) => {
                    if !job.materials.is_empty() {
                        let id = job.materials[slot % job.materials.len()].id;
                        materials::remove_usage(&mut job, id).unwrap();
                    }
                }
            }

            let expected: Decimal = job
                .materials
                .iter()
                .map(|u| u.quantity * u.cost_per_unit)
                .sum();
            prop_assert_eq!(materials::material_cost(&job), expected);

            let expected_customer: Decimal = job
                .materials
                .iter()
                .filter(|u| u.charge_to == ChargeTo::Customer)
                .map(|u| u.quantity * u.cost_per_unit)
                .sum();
            prop_assert_eq!(materials::customer_charged_total(&job), expected_customer);
        }
    }

    /// actualDurationMinutes == (T1-T0) + (T3-T2) for any interval layout; the
    /// paused span never counts.
    #[test]
    fn duration_excludes_the_paused_span(
        work_before in 0i64..10_000,
        paused in 0i64..10_000,
        work_after in 0i64..10_000,
    ) {
        let mut job = job();
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        job.schedule_window(t0, t0 + Duration::minutes(1), None).unwrap();
        job.assignments.push(Assignment {
            employee_ref: Uuid::new_v4(),
            role: AssigneeRole::Lead,
            planned_minutes: 60,
            actual_minutes: 0,
            time_entry_refs: vec![],
        });

        job.start(t0).unwrap();
        job.pause(t0 + Duration::minutes(work_before), "hold".into()).unwrap();
        job.resume(t0 + Duration::minutes(work_before + paused)).unwrap();
        job.complete(t0 + Duration::minutes(work_before + paused + work_after)).unwrap();

        prop_assert_eq!(
            job.schedule.actual_duration_minutes,
            Some(work_before + work_after)
        );
    }

    /// A step never completes while any required checklist item is unchecked,
    /// and always completes once every required item is checked.
    #[test]
    fn checklist_gate_holds_for_arbitrary_checklists(
        items in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..12),
        elapsed in 0i64..steps::MAX_STEP_MINUTES,
    ) {
        let mut job = job();
        job.status = JobStatus::InProgress;
        job.steps.push(StepResult {
            step_code: "gate".into(),
            kind: StepKind::Inspection,
            checklist: items
                .iter()
                .map(|(required, checked)| ChecklistItem {
                    label: "item".into(),
                    required: *required,
                    checked: *checked,
                    photo_urls: vec![],
                    note: None,
                })
                .collect(),
            quality: vec![],
            estimated_minutes: None,
            actual_minutes: None,
            completed: false,
        });

        let blocked = items.iter().any(|(required, checked)| *required && !checked);
        let result = steps::complete_step(&mut job, "gate", elapsed);

        if blocked {
            let is_required_items_pending = matches!(
                result,
                Err(fieldops_api::errors::ServiceError::RequiredItemsPending { .. })
            );
            prop_assert!(is_required_items_pending);
            prop_assert!(!job.steps[0].completed);
        } else {
            prop_assert!(result.unwrap());
            prop_assert!(job.steps[0].completed);
        }
    }

    /// The dispatch-board comparator is a total order that puts sooner due
    /// dates first, undated jobs last, and higher priority first within a due
    /// date.
    #[test]
    fn dispatch_board_order_is_consistent(
        specs in proptest::collection::vec(
            (proptest::option::of(0i64..10_000), 0usize..4),
            2..30
        )
    ) {
        use fieldops_api::models::job::JobPriority;

        let base = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let priorities = [
            JobPriority::Low,
            JobPriority::Normal,
            JobPriority::High,
            JobPriority::Critical,
        ];
        let mut jobs: Vec<JobAggregate> = specs
            .into_iter()
            .enumerate()
            .map(|(i, (due, priority))| {
                let mut j = JobAggregate::new("acme", format!("JOB-{i}"), "EUR", base);
                j.schedule.due_at = due.map(|m| base + Duration::minutes(m));
                j.priority = priorities[priority];
                j
            })
            .collect();

        jobs.sort_by(dispatch_board_cmp);

        for pair in jobs.windows(2) {
            prop_assert_ne!(
                dispatch_board_cmp(&pair[0], &pair[1]),
                std::cmp::Ordering::Greater
            );
            match (pair[0].schedule.due_at, pair[1].schedule.due_at) {
                // An undated job may never precede a dated one.
                (None, Some(_)) => prop_assert!(false, "undated job sorted before a dated one"),
                (Some(a), Some(b)) => {
                    prop_assert!(a <= b);
                    if a == b {
                        prop_assert!(pair[0].priority >= pair[1].priority);
                    }
                }
                _ => {}
            }
        }
    }
}
