//! Construction of a fresh game from the catalog.

use crate::recompute::recompute;
use mayor_catalog::{Catalog, EmployeeTemplate};
use mayor_core::{
    clamp_metric, clamp_rating, ledger, Department, Employee, GameState, Position, SimConfig, TaxKind, MAX_TAX_RATE,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Issue templates placed on the desk when a game has none.
pub const SEEDED_ISSUES: usize = 3;

fn hire(t: &EmployeeTemplate) -> Option<Employee> {
    Some(Employee {
        id: t.id.clone(),
        name: t.name.clone(),
        department: t.department.clone()?,
        position: t.position,
        competence: clamp_metric(t.competence),
        mood: clamp_metric(t.mood),
        workload: clamp_metric(t.workload),
        loyalty: clamp_metric(t.loyalty),
        experience_years: t.experience_years.max(0.0),
        salary: t.salary,
        months_since_promotion: 0,
    })
}

/// Fill an empty active-issue list from the first catalog issues.
pub fn seed_issues(state: &mut GameState, catalog: &Catalog) {
    if state.citizens.active_issues.is_empty() {
        state.citizens.active_issues = catalog.issues.iter().take(SEEDED_ISSUES).cloned().collect();
    }
}

/// A new game: every account open, the catalog's staff in place and all
/// derived metrics computed.
pub fn default_state(catalog: &Catalog, config: &SimConfig) -> GameState {
    let start = &catalog.start;
    let mut state = GameState::default();

    state.banking.accounts = ledger::open_accounts();
    for (account, balance) in &start.balances {
        ledger::credit(&mut state.banking.accounts, *account, *balance);
    }

    let employees: Vec<Employee> = catalog.staff.iter().filter_map(hire).collect();
    for t in &catalog.departments {
        let staff = employees.iter().filter(|e| e.department == t.id);
        let payroll: Decimal = staff.clone().map(|e| e.salary).sum();
        let head = staff.clone().find(|e| e.position == Position::Head).map(|e| e.id.clone());
        state.government.departments.insert(
            t.id.clone(),
            Department {
                id: t.id.clone(),
                name: t.name.clone(),
                budget: t.budget.max(Decimal::ZERO),
                payroll,
                satisfaction: clamp_metric(t.satisfaction),
                efficiency: 0.0,
                corruption_incidents: 0,
                head,
            },
        );
    }
    state.government.employees = employees;
    state.government.corruption_risk = clamp_metric(start.corruption_risk);

    let mut rates: BTreeMap<TaxKind, f32> = TaxKind::ALL.iter().map(|t| (*t, 0.0)).collect();
    rates.extend(start.tax_rates.iter().map(|(k, v)| (*k, (*v).clamp(0.0, MAX_TAX_RATE))));
    state.taxation.rates = rates;
    state.taxation.base = start.tax_base.clone();
    state.taxation.collection_efficiency = clamp_metric(start.collection_efficiency);
    state.taxation.evasion_rate = clamp_metric(start.evasion_rate);

    state.security.agencies = catalog.agencies.clone();
    state.security.threats = catalog.threats.clone();
    state.security.investigation_risk = clamp_metric(start.investigation_risk);
    state.security.protection_level = clamp_metric(start.protection_level);

    state.construction.infrastructure_quality = clamp_metric(start.infrastructure_quality);
    state.construction.coverage = clamp_metric(start.coverage);

    state.citizens.groups = catalog.citizen_groups.clone();
    seed_issues(&mut state, catalog);

    state.mayor_rating = clamp_rating(start.mayor_rating);
    state.happiness = clamp_metric(start.happiness);
    state.infrastructure = clamp_metric(start.infrastructure);
    state.ecology = clamp_metric(start.ecology);
    state.unemployment = clamp_metric(start.unemployment);

    state.date = config.start_date;
    state.speed = 1;
    recompute(&mut state);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::*;
    use mayor_core::{validate_state, AccountType, DepartmentId};

    #[test]
    fn new_game_is_valid_and_complete() {
        let (catalog, s) = game();
        validate_state(&s).unwrap();
        assert_eq!(s.banking.accounts.len(), AccountType::ALL.len());
        assert_eq!(s.balance(AccountType::CityChecking), money(50_000_000));
        assert_eq!(s.government.departments.len(), catalog.departments.len());
        assert_eq!(s.citizens.active_issues.len(), SEEDED_ISSUES);
        assert_eq!(s.citizens.active_issues[0].id, "bus_fares");
        assert_eq!(s.taxation.rates.len(), TaxKind::ALL.len());
        assert_eq!(s.next_entity_id, 0);
        assert_eq!(s.date, SimConfig::default().start_date);
    }

    #[test]
    fn heads_and_payroll_come_from_staff() {
        let (_, s) = game();
        let finance = &s.government.departments[&DepartmentId::new("finance")];
        assert_eq!(finance.head.as_deref(), Some("staff_volkova"));
        assert_eq!(finance.payroll, money(340_000));
        assert!(finance.efficiency > 0.0);
        assert!(s.government.departments[&DepartmentId::new("health")].head.is_none());
    }

    #[test]
    fn empty_catalog_still_opens_every_account() {
        let s = default_state(&Catalog::default(), &SimConfig::default());
        validate_state(&s).unwrap();
        assert_eq!(s.banking.accounts.len(), AccountType::ALL.len());
        assert!(s.citizens.active_issues.is_empty());
    }
}
