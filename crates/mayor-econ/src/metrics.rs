//! City-wide aggregates consumed by the presentation layer.
//!
//! These are recomputed on demand and never cached in the state.

use crate::banking::city_debt_service;
use crate::taxation::monthly_tax_revenue;
use crate::money_to_f32;
use mayor_core::{clamp_metric, AccountType, BudgetStatus, GameState, Money};
use rust_decimal::Decimal;

/// City total below which the budget is in crisis regardless of flows.
pub const CRITICAL_BUDGET: i64 = 1_000_000;

/// Cash across the personal accounts plus the current value of every asset.
pub fn total_personal_wealth(state: &GameState) -> Money {
    let cash: Money = [
        AccountType::PersonalChecking,
        AccountType::PersonalSavings,
        AccountType::Offshore,
    ]
    .into_iter()
    .map(|a| state.balance(a))
    .sum();
    let assets: Money = state
        .personal_spending
        .assets
        .iter()
        .map(|a| a.current_value)
        .sum();
    cash + assets
}

fn average_suspicion(state: &GameState) -> f32 {
    let agencies = &state.security.agencies;
    if agencies.is_empty() {
        return 0.0;
    }
    agencies.iter().map(|a| a.suspicion).sum::<f32>() / agencies.len() as f32
}

/// Headline corruption score in `[0, 100]`.
pub fn corruption_risk_score(state: &GameState) -> f32 {
    let offshore = money_to_f32(state.balance(AccountType::Offshore));
    let offshore_factor = (2.0 * offshore / 1_000_000.0).min(100.0);
    clamp_metric(
        0.3 * state.government.corruption_risk
            + 0.3 * state.security.investigation_risk
            + 0.2 * offshore_factor
            + 0.2 * average_suspicion(state),
    )
}

/// Audit risk in `[0, 100]`: the corruption score plus recorded incidents.
pub fn audit_risk(state: &GameState) -> f32 {
    let incidents: u32 = state
        .government
        .departments
        .values()
        .map(|d| d.corruption_incidents)
        .sum();
    clamp_metric(0.6 * corruption_risk_score(state) + 5.0 * incidents as f32)
}

/// Monthly city income: tax revenue.
pub fn monthly_income(state: &GameState) -> Money {
    monthly_tax_revenue(&state.taxation)
}

/// Monthly city expenses: payroll plus debt service on city loans.
pub fn monthly_expenses(state: &GameState) -> Money {
    let payroll: Money = state
        .government
        .departments
        .values()
        .map(|d| d.payroll)
        .sum();
    payroll + city_debt_service(state)
}

/// Coarse health tier of the city budget.
pub fn budget_status(state: &GameState) -> BudgetStatus {
    let total = state.balance(AccountType::CityChecking) + state.balance(AccountType::CitySavings);
    if total < Decimal::new(CRITICAL_BUDGET, 0) {
        return BudgetStatus::Critical;
    }
    let income = monthly_income(state);
    let expenses = monthly_expenses(state);
    if expenses > income {
        BudgetStatus::Deficit
    } else if income - expenses <= income / Decimal::TEN {
        BudgetStatus::Balanced
    } else {
        BudgetStatus::Surplus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use mayor_core::*;

    fn dept(id: &str, payroll: i64, incidents: u32) -> Department {
        Department {
            id: DepartmentId::new(id),
            name: id.into(),
            budget: money(0),
            payroll: money(payroll),
            satisfaction: 50.0,
            efficiency: 50.0,
            corruption_incidents: incidents,
            head: None,
        }
    }

    fn city(balance: i64, revenue_base: i64, payroll: i64) -> GameState {
        let mut s = state_with(AccountType::CityChecking, balance);
        s.taxation.rates.insert(TaxKind::Income, 10.0);
        s.taxation.base.insert(TaxKind::Income, money(revenue_base));
        s.taxation.collection_efficiency = 100.0;
        s.taxation.evasion_rate = 0.0;
        let d = dept("finance", payroll, 0);
        s.government.departments.insert(d.id.clone(), d);
        s
    }

    #[test]
    fn wealth_includes_assets() {
        let mut s = state_with(AccountType::PersonalChecking, 1_000);
        ledger::credit(&mut s.banking.accounts, AccountType::Offshore, money(500));
        ledger::credit(&mut s.banking.accounts, AccountType::CityChecking, money(9_999));
        s.personal_spending.assets.push(Asset {
            id: "asset-1".into(),
            option_id: "dacha".into(),
            name: "Dacha".into(),
            purchase_price: money(200),
            current_value: money(250),
            appreciation_rate: 0.05,
            purchased_on: s.date,
        });
        assert_eq!(total_personal_wealth(&s), money(1_750));
    }

    #[test]
    fn corruption_score_blend() {
        let mut s = state_with(AccountType::Offshore, 10_000_000);
        s.government.corruption_risk = 50.0;
        s.security.investigation_risk = 20.0;
        s.security.agencies.push(Agency {
            id: "a".into(),
            name: "A".into(),
            influence: InfluenceLevel::Neutral,
            suspicion: 30.0,
        });
        // 15 + 6 + 0.2*20 + 6
        assert!((corruption_risk_score(&s) - 31.0).abs() < 1e-3);
        let d = dept("police", 0, 2);
        s.government.departments.insert(d.id.clone(), d);
        assert!((audit_risk(&s) - (0.6 * 31.0 + 10.0)).abs() < 1e-3);
    }

    #[test]
    fn budget_status_tiers() {
        assert_eq!(budget_status(&city(999_999, 10_000, 0)), BudgetStatus::Critical);
        // income 100,000
        assert_eq!(budget_status(&city(5_000_000, 10_000, 120_000)), BudgetStatus::Deficit);
        assert_eq!(budget_status(&city(5_000_000, 10_000, 95_000)), BudgetStatus::Balanced);
        assert_eq!(budget_status(&city(5_000_000, 10_000, 50_000)), BudgetStatus::Surplus);
    }
}
