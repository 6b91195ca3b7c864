//! Tax policies and direct rate changes.

use super::{apply_effects, gate, pay, HandlerResult};
use crate::command::{ImplementTaxPolicy, SetTaxRate};
use crate::error::CommandError;
use mayor_catalog::Catalog;
use mayor_core::{clamp_metric, AccountType, ActiveTaxPolicy, GameState, MAX_TAX_RATE};
use mayor_econ::taxation::{can_implement_tax_policy, clamp_rate, evasion_after_rate_change};

/// Happiness lost per percentage point of tax increase.
const HAPPINESS_PER_RATE_POINT: f32 = 0.5;

pub fn implement_tax_policy(state: &GameState, cmd: &ImplementTaxPolicy, catalog: &Catalog) -> HandlerResult {
    let policy = catalog
        .tax_policy(&cmd.policy_id)
        .ok_or_else(|| CommandError::not_found("tax policy", &cmd.policy_id))?;
    gate(
        can_implement_tax_policy(policy, state),
        &state.banking.accounts,
        AccountType::CityChecking,
        policy.cost,
    )?;

    let mut next = state.clone();
    pay(&mut next.banking.accounts, AccountType::CityChecking, policy.cost)?;
    let taxation = &mut next.taxation;
    let rate = taxation.rates.entry(policy.tax).or_insert(0.0);
    *rate = clamp_rate(*rate + policy.rate_change);
    taxation.evasion_rate = evasion_after_rate_change(taxation.evasion_rate, policy.rate_change);
    let id = next.allocate_id("tax-policy");
    next.taxation.active_policies.push(ActiveTaxPolicy {
        id,
        policy_id: policy.id.clone(),
        name: policy.name.clone(),
        tax: policy.tax,
        rate_change: policy.rate_change,
        remaining_duration: policy.duration_months,
        effects: policy.effects.clone(),
        implemented_on: state.date,
    });
    apply_effects(&mut next, &policy.effects, None);
    Ok(next)
}

pub fn set_tax_rate(state: &GameState, cmd: &SetTaxRate) -> HandlerResult {
    if !cmd.rate.is_finite() || !(0.0..=MAX_TAX_RATE).contains(&cmd.rate) {
        return Err(CommandError::invalid(format!(
            "tax rate {} is outside [0, {MAX_TAX_RATE}]",
            cmd.rate
        )));
    }
    let old = state.taxation.rates.get(&cmd.tax).copied().unwrap_or(0.0);
    let change = cmd.rate - old;
    let mut next = state.clone();
    next.taxation.rates.insert(cmd.tax, cmd.rate);
    next.taxation.evasion_rate = evasion_after_rate_change(next.taxation.evasion_rate, change);
    next.happiness = clamp_metric(next.happiness - change * HAPPINESS_PER_RATE_POINT);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::*;
    use mayor_core::TaxKind;

    #[test]
    fn tax_policy_shifts_rate_once() {
        let (catalog, s) = game();
        let cmd = ImplementTaxPolicy {
            policy_id: "business_surcharge".into(),
        };
        let next = implement_tax_policy(&s, &cmd, &catalog).unwrap();
        assert_eq!(next.taxation.rates[&TaxKind::Business], 24.0);
        assert_eq!(next.taxation.active_policies.len(), 1);
        assert_eq!(
            s.balance(AccountType::CityChecking) - next.balance(AccountType::CityChecking),
            money(300_000)
        );
        assert!(matches!(
            implement_tax_policy(&next, &cmd, &catalog),
            Err(CommandError::Precondition(_))
        ));
    }

    #[test]
    fn rate_bounds_are_validated() {
        let (_, s) = game();
        let too_high = SetTaxRate {
            tax: TaxKind::Income,
            rate: 75.0,
        };
        assert!(matches!(set_tax_rate(&s, &too_high), Err(CommandError::Invalid(_))));
        let nan = SetTaxRate {
            tax: TaxKind::Income,
            rate: f32::NAN,
        };
        assert!(set_tax_rate(&s, &nan).is_err());
    }

    #[test]
    fn raising_a_rate_costs_happiness() {
        let (_, s) = game();
        let cmd = SetTaxRate {
            tax: TaxKind::Income,
            rate: 19.0,
        };
        let next = set_tax_rate(&s, &cmd).unwrap();
        assert_eq!(next.taxation.rates[&TaxKind::Income], 19.0);
        assert_eq!(next.happiness, s.happiness - 2.0);
        assert_eq!(next.taxation.evasion_rate, s.taxation.evasion_rate + 2.0);
    }
}
