//! Finance rollup: a pure function of the aggregate plus externally supplied
//! pricing. Recomputed on every mutating command; a frozen snapshot is left
//! untouched.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::job::JobAggregate;
use crate::services::materials;

/// External pricing data gathered by the engine before the rollup runs:
/// hourly rates per assignee and the fixed contract price, when one applies.
#[derive(Debug, Clone, Default)]
pub struct PricingInputs {
    pub hourly_rates: HashMap<Uuid, Decimal>,
    pub contract_price: Option<Decimal>,
    pub adhoc_service_fee: Decimal,
}

/// Recompute the three snapshots from the line items.
///
/// - `material_cost_snapshot` = Σ usage totals (totals re-derived first)
/// - `labor_cost_snapshot` = Σ actual minutes / 60 × hourly rate
/// - `revenue_snapshot` = contract price when present, otherwise
///   customer-chargeable material totals plus the flat service fee
pub fn recompute(job: &mut JobAggregate, pricing: &PricingInputs) -> Result<(), ServiceError> {
    if job.finance.frozen {
        return Ok(());
    }

    materials::recompute_totals(job);
    let material_cost = materials::material_cost(job);

    let mut labor_cost = Decimal::ZERO;
    for assignment in &job.assignments {
        let rate = pricing
            .hourly_rates
            .get(&assignment.employee_ref)
            .copied()
            .ok_or(ServiceError::UnknownEmployee(assignment.employee_ref))?;
        labor_cost += Decimal::from(assignment.actual_minutes) / dec!(60) * rate;
    }

    let revenue = if !job.finance.billable {
        Decimal::ZERO
    } else if job.contract_ref.is_some() {
        // Contract jobs bill the agreed price even when no price is on file
        // yet; a missing price rolls up as zero until the contract is priced.
        pricing.contract_price.unwrap_or(Decimal::ZERO)
    } else {
        materials::customer_charged_total(job) + pricing.adhoc_service_fee
    };

    job.finance.material_cost_snapshot = material_cost;
    job.finance.labor_cost_snapshot = labor_cost.round_dp(2);
    job.finance.revenue_snapshot = revenue;
    Ok(())
}

/// Make the snapshot immutable. Called once, when the job completes.
pub fn freeze(job: &mut JobAggregate) {
    job.finance.frozen = true;
}
