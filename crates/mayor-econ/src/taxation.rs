//! Tax revenue and tax-policy eligibility.

use crate::{money_from_f64, Eligibility};
use mayor_catalog::TaxPolicyTemplate;
use mayor_core::{AccountType, GameState, Money, TaxKind, TaxationState, MAX_TAX_RATE};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Clamp a tax rate into `[0, MAX_TAX_RATE]`.
pub fn clamp_rate(rate: f32) -> f32 {
    mayor_core::clamp(rate, 0.0, MAX_TAX_RATE)
}

/// Revenue of one tax line per month after collection losses and evasion.
pub fn line_revenue(taxation: &TaxationState, tax: TaxKind) -> Money {
    let rate = taxation.rates.get(&tax).copied().unwrap_or(0.0);
    let base = taxation
        .base
        .get(&tax)
        .and_then(|b| b.to_f64())
        .unwrap_or(0.0);
    let collected = f64::from(taxation.collection_efficiency.clamp(0.0, 100.0)) / 100.0;
    let evaded = f64::from(taxation.evasion_rate.clamp(0.0, 100.0)) / 100.0;
    money_from_f64(f64::from(rate) * base * collected * (1.0 - evaded))
}

/// Total monthly tax revenue.
pub fn monthly_tax_revenue(taxation: &TaxationState) -> Money {
    TaxKind::ALL
        .iter()
        .map(|t| line_revenue(taxation, *t))
        .fold(Decimal::ZERO, |acc, x| acc + x)
}

/// Whether `policy` can be enacted now.
pub fn can_implement_tax_policy(policy: &TaxPolicyTemplate, state: &GameState) -> Eligibility {
    let taxation = &state.taxation;
    if taxation
        .active_policies
        .iter()
        .any(|p| p.policy_id == policy.id)
    {
        return Eligibility::denied(format!("{} is already active", policy.name));
    }
    if state.mayor_rating < policy.min_mayor_rating {
        return Eligibility::denied(format!(
            "{} needs a mayor rating of {:.0}",
            policy.name, policy.min_mayor_rating
        ));
    }
    let current = taxation.rates.get(&policy.tax).copied().unwrap_or(0.0);
    let proposed = current + policy.rate_change;
    if !(0.0..=MAX_TAX_RATE).contains(&proposed) {
        return Eligibility::denied(format!(
            "{:?} tax rate {proposed:.1} would leave [0, {MAX_TAX_RATE}]",
            policy.tax
        ));
    }
    if state.balance(AccountType::CityChecking) < policy.cost {
        return Eligibility::denied("insufficient city funds");
    }
    Eligibility::allowed()
}

/// Evasion response to a rate change: one point of evasion per two points
/// of rate increase, relieved symmetrically on cuts.
pub fn evasion_after_rate_change(evasion: f32, rate_change: f32) -> f32 {
    mayor_core::clamp_metric(evasion + rate_change * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use mayor_core::{ActiveTaxPolicy, MetricEffects};

    fn policy(change: f32) -> TaxPolicyTemplate {
        TaxPolicyTemplate {
            id: "surcharge".into(),
            name: "Surcharge".into(),
            tax: TaxKind::Business,
            rate_change: change,
            cost: money(300_000),
            duration_months: 12,
            min_mayor_rating: 40.0,
            effects: MetricEffects::default(),
        }
    }

    fn taxed_state() -> GameState {
        let mut s = state_with(AccountType::CityChecking, 1_000_000);
        s.mayor_rating = 50.0;
        s.taxation.rates.insert(TaxKind::Business, 20.0);
        s.taxation.base.insert(TaxKind::Business, money(100_000));
        s.taxation.collection_efficiency = 80.0;
        s.taxation.evasion_rate = 10.0;
        s
    }

    #[test]
    fn revenue_applies_collection_and_evasion() {
        let s = taxed_state();
        // 20 * 100,000 * 0.8 * 0.9
        assert_eq!(monthly_tax_revenue(&s.taxation), money(1_440_000));
    }

    #[test]
    fn rate_must_stay_in_range() {
        let s = taxed_state();
        assert!(can_implement_tax_policy(&policy(4.0), &s).allowed);
        assert!(!can_implement_tax_policy(&policy(45.0), &s).allowed);
        assert!(!can_implement_tax_policy(&policy(-25.0), &s).allowed);
    }

    #[test]
    fn duplicate_and_rating_checks() {
        let mut s = taxed_state();
        s.mayor_rating = 30.0;
        let r = can_implement_tax_policy(&policy(4.0), &s);
        assert!(r.reason.unwrap().contains("mayor rating"));
        s.mayor_rating = 60.0;
        s.taxation.active_policies.push(ActiveTaxPolicy {
            id: "tax-policy-1".into(),
            policy_id: "surcharge".into(),
            name: "Surcharge".into(),
            tax: TaxKind::Business,
            rate_change: 4.0,
            remaining_duration: 12,
            effects: MetricEffects::default(),
            implemented_on: s.date,
        });
        assert!(!can_implement_tax_policy(&policy(4.0), &s).allowed);
    }

    #[test]
    fn clamp_rate_bounds() {
        assert_eq!(clamp_rate(-1.0), 0.0);
        assert_eq!(clamp_rate(75.0), MAX_TAX_RATE);
        assert_eq!(evasion_after_rate_change(10.0, 4.0), 12.0);
    }
}
