//! Material usage ledger. `total_cost` is always derived from
//! `quantity * cost_per_unit`, recomputed on every write so that quantity or
//! price edits can never drift from the stored totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::job::{ChargeTo, EntityRef, JobAggregate, MaterialUsage};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct MaterialUsageInput {
    /// Catalog item, when the material came from stock.
    #[serde(default)]
    pub item: Option<EntityRef>,
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub quantity: Decimal,
    #[validate(length(min = 1, max = 16))]
    pub unit: String,
    pub cost_per_unit: Decimal,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    pub charge_to: ChargeTo,
}

/// Record a usage line. Returns the generated usage id.
pub fn add_usage(job: &mut JobAggregate, input: MaterialUsageInput) -> Result<Uuid, ServiceError> {
    if job.status.is_terminal() {
        return Err(job.invalid_transition("add_material"));
    }
    if input.quantity <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "material quantity must be positive".to_string(),
        ));
    }
    if input.cost_per_unit < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "cost_per_unit must not be negative".to_string(),
        ));
    }

    let mut usage = MaterialUsage {
        id: Uuid::new_v4(),
        item_ref: input.item.as_ref().map(EntityRef::id),
        sku: input.sku,
        name: input.name,
        quantity: input.quantity,
        unit: input.unit,
        cost_per_unit: input.cost_per_unit,
        currency: input.currency,
        total_cost: Decimal::ZERO,
        charge_to: input.charge_to,
    };
    usage.recompute_total();

    let id = usage.id;
    job.materials.push(usage);
    Ok(id)
}

pub fn remove_usage(job: &mut JobAggregate, usage_id: Uuid) -> Result<(), ServiceError> {
    if job.status.is_terminal() {
        return Err(job.invalid_transition("remove_material"));
    }
    let index = job
        .materials
        .iter()
        .position(|u| u.id == usage_id)
        .ok_or_else(|| ServiceError::NotFound(format!("material usage {usage_id} not found")))?;
    job.materials.remove(index);
    Ok(())
}

/// Re-derive every stored total. Called by the finance rollup so a snapshot
/// can never be computed from stale totals.
pub fn recompute_totals(job: &mut JobAggregate) {
    for usage in &mut job.materials {
        usage.recompute_total();
    }
}

pub fn material_cost(job: &JobAggregate) -> Decimal {
    job.materials.iter().map(|u| u.total_cost).sum()
}

pub fn customer_charged_total(job: &JobAggregate) -> Decimal {
    job.materials
        .iter()
        .filter(|u| u.charge_to == ChargeTo::Customer)
        .map(|u| u.total_cost)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobStatus;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn job() -> JobAggregate {
        JobAggregate::new("acme", "JOB-030", "EUR", Utc::now())
    }

    fn input(quantity: Decimal, cost: Decimal, charge_to: ChargeTo) -> MaterialUsageInput {
        MaterialUsageInput {
            item: None,
            sku: None,
            name: "Pipe clamp".into(),
            quantity,
            unit: "pcs".into(),
            cost_per_unit: cost,
            currency: "EUR".into(),
            charge_to,
        }
    }

    #[test]
    fn totals_are_derived_not_trusted() {
        let mut job = job();
        add_usage(&mut job, input(dec!(4), dec!(2.50), ChargeTo::Expense)).unwrap();
        assert_eq!(job.materials[0].total_cost, dec!(10.00));

        // Tamper with the stored total; the next recompute repairs it.
        job.materials[0].total_cost = dec!(999);
        recompute_totals(&mut job);
        assert_eq!(job.materials[0].total_cost, dec!(10.00));
    }

    #[test]
    fn cost_sums_track_additions_and_removals() {
        let mut job = job();
        let a = add_usage(&mut job, input(dec!(4), dec!(2.50), ChargeTo::Expense)).unwrap();
        let _b = add_usage(&mut job, input(dec!(1), dec!(30), ChargeTo::Customer)).unwrap();
        assert_eq!(material_cost(&job), dec!(40.00));
        assert_eq!(customer_charged_total(&job), dec!(30));

        remove_usage(&mut job, a).unwrap();
        assert_eq!(material_cost(&job), dec!(30));
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let mut job = job();
        assert_matches!(
            add_usage(&mut job, input(dec!(0), dec!(1), ChargeTo::Internal)),
            Err(ServiceError::ValidationError(_))
        );
        assert!(job.materials.is_empty());
    }

    #[test]
    fn terminal_jobs_reject_material_changes() {
        let mut job = job();
        let id = add_usage(&mut job, input(dec!(1), dec!(1), ChargeTo::Internal)).unwrap();
        job.status = JobStatus::Completed;

        assert_matches!(
            add_usage(&mut job, input(dec!(1), dec!(1), ChargeTo::Internal)),
            Err(ServiceError::InvalidTransition { .. })
        );
        assert_matches!(
            remove_usage(&mut job, id),
            Err(ServiceError::InvalidTransition { .. })
        );
    }

    #[test]
    fn missing_usage_is_not_found() {
        let mut job = job();
        assert_matches!(
            remove_usage(&mut job, Uuid::new_v4()),
            Err(ServiceError::NotFound(_))
        );
    }
}
