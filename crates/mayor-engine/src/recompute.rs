//! Derived-metric refresh run after every accepted command.
//!
//! Everything written here is a function of the authoritative fields
//! (accounts, staff, groups, assets), so running it twice changes nothing.

use mayor_core::{clamp_metric, clamp_rating, ledger, DepartmentId, FinanceRisks, GameState, Money};
use mayor_econ::citizens::{overall_satisfaction, protest_potential};
use mayor_econ::government::department_efficiency;
use mayor_econ::metrics::{audit_risk, corruption_risk_score};

/// Refresh the finance projection, department efficiency, citizen aggregates
/// and risk scores, clamping every bounded metric on the way.
pub fn recompute(state: &mut GameState) {
    project(state);
    refresh_efficiency(state);

    let citizens = &mut state.citizens;
    citizens.overall_satisfaction = overall_satisfaction(&citizens.groups);
    citizens.protest_risk = protest_potential(&citizens.groups).max(0.0);

    clamp_all(state);
    state.finance.risks = FinanceRisks {
        corruption_risk: corruption_risk_score(state),
        investigation_risk: clamp_metric(state.security.investigation_risk),
        audit_risk: audit_risk(state),
    };
}

/// Mirror the banking accounts into the finance views and `budget`.
pub fn project(state: &mut GameState) {
    let department_budgets: Money = state.government.departments.values().map(|d| d.budget).sum();
    let asset_value: Money = state
        .personal_spending
        .assets
        .iter()
        .map(|a| a.current_value)
        .sum();
    let (city, personal) = ledger::project_finances(&state.banking.accounts, department_budgets, asset_value);
    state.budget = city.total;
    state.finance.city_budget = city;
    state.finance.personal_finances = personal;
}

fn refresh_efficiency(state: &mut GameState) {
    let government = &state.government;
    let scores: Vec<(DepartmentId, f32)> = government
        .departments
        .keys()
        .map(|id| (id.clone(), department_efficiency(government.employees_of(id))))
        .collect();
    for (id, score) in scores {
        if let Some(d) = state.government.departments.get_mut(&id) {
            d.efficiency = score;
        }
    }
}

fn clamp_all(state: &mut GameState) {
    state.mayor_rating = clamp_rating(state.mayor_rating);
    for v in [
        &mut state.happiness,
        &mut state.infrastructure,
        &mut state.ecology,
        &mut state.unemployment,
        &mut state.government.corruption_risk,
        &mut state.security.investigation_risk,
        &mut state.security.protection_level,
        &mut state.construction.infrastructure_quality,
        &mut state.construction.coverage,
        &mut state.taxation.collection_efficiency,
        &mut state.taxation.evasion_rate,
        &mut state.citizens.overall_satisfaction,
    ] {
        *v = clamp_metric(*v);
    }
    for d in state.government.departments.values_mut() {
        d.satisfaction = clamp_metric(d.satisfaction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::*;
    use mayor_core::AccountType;

    #[test]
    fn projection_follows_the_accounts() {
        let (_, mut s) = game();
        set_balance(&mut s, AccountType::Offshore, 3_000_000);
        recompute(&mut s);
        let p = &s.finance.personal_finances;
        assert_eq!(p.offshore, money(3_000_000));
        assert_eq!(p.total_wealth, p.checking + p.savings + p.offshore + p.assets);
        assert_eq!(
            s.budget,
            s.balance(AccountType::CityChecking) + s.balance(AccountType::CitySavings)
        );
        assert_eq!(s.budget, s.finance.city_budget.total);
    }

    #[test]
    fn recompute_is_idempotent() {
        let (_, mut s) = game();
        s.happiness = 140.0;
        recompute(&mut s);
        let once = s.clone();
        recompute(&mut s);
        assert_eq!(once, s);
        assert_eq!(s.happiness, 100.0);
    }

    #[test]
    fn empty_department_has_zero_efficiency() {
        let (_, mut s) = game();
        let health = DepartmentId::new("health");
        s.government.employees.retain(|e| e.department != health);
        recompute(&mut s);
        assert_eq!(s.government.departments[&health].efficiency, 0.0);
        assert!(s.government.departments[&DepartmentId::new("finance")].efficiency > 0.0);
    }

    #[test]
    fn offshore_money_raises_the_risk_scores() {
        let (_, mut s) = game();
        recompute(&mut s);
        let before = s.finance.risks.clone();
        set_balance(&mut s, AccountType::Offshore, 20_000_000);
        recompute(&mut s);
        assert!(s.finance.risks.corruption_risk > before.corruption_risk);
        assert!(s.finance.risks.audit_risk >= before.audit_risk);
    }
}
