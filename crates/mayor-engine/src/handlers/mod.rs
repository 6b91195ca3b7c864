//! One handler per command.
//!
//! Every handler takes the input state by reference, clones it into `next`,
//! mutates only `next` and returns it. An early `Err` drops `next`, so no
//! partial mutation can leak out of a rejected command.

use crate::error::CommandError;
use mayor_core::{
    clamp_metric, clamp_rating, ledger, AccountType, Accounts, DepartmentId, GameState, MetricEffects, Money,
};
use mayor_econ::Eligibility;
use rust_decimal::Decimal;

pub mod banking;
pub mod citizens;
pub mod construction;
pub mod government;
pub mod industry;
pub mod misc;
pub mod personal;
pub mod security;
pub mod taxation;

pub type HandlerResult = Result<GameState, CommandError>;

/// Turn a resolver denial into an error.
///
/// When the paying account cannot cover `cost` the shortfall is reported as
/// [`CommandError::InsufficientFunds`], otherwise as a precondition failure
/// carrying the resolver's reason.
pub(crate) fn gate(eligibility: Eligibility, accounts: &Accounts, account: AccountType, cost: Money) -> Result<(), CommandError> {
    if eligibility.allowed {
        return Ok(());
    }
    ensure_covered(accounts, account, cost)?;
    Err(CommandError::Precondition(
        eligibility.reason.unwrap_or_else(|| "not eligible".to_string()),
    ))
}

/// Like [`ledger::ensure_funds`] but a zero cost always passes.
pub(crate) fn ensure_covered(accounts: &Accounts, account: AccountType, cost: Money) -> Result<(), CommandError> {
    if cost <= Decimal::ZERO {
        return Ok(());
    }
    ledger::ensure_funds(accounts, account, cost)?;
    Ok(())
}

/// Debit `cost` unless it is zero.
pub(crate) fn pay(accounts: &mut Accounts, account: AccountType, cost: Money) -> Result<(), CommandError> {
    if cost > Decimal::ZERO {
        ledger::debit(accounts, account, cost)?;
    }
    Ok(())
}

/// Payload amounts must be positive and at most [`ledger::max_amount`].
pub(crate) fn require_positive(amount: Money, what: &str) -> Result<(), CommandError> {
    if amount <= Decimal::ZERO {
        return Err(CommandError::invalid(format!("{what} must be positive, got {amount}")));
    }
    if amount > ledger::max_amount() {
        return Err(CommandError::invalid(format!("{what} exceeds the largest supported amount")));
    }
    Ok(())
}

/// Apply a template's one-off metric shifts, clamped.
pub(crate) fn apply_effects(state: &mut GameState, effects: &MetricEffects, department: Option<&DepartmentId>) {
    state.mayor_rating = clamp_rating(state.mayor_rating + effects.mayor_rating);
    state.happiness = clamp_metric(state.happiness + effects.happiness);
    state.infrastructure = clamp_metric(state.infrastructure + effects.infrastructure);
    state.ecology = clamp_metric(state.ecology + effects.ecology);
    state.unemployment = clamp_metric(state.unemployment + effects.unemployment);
    state.government.corruption_risk = clamp_metric(state.government.corruption_risk + effects.corruption_risk);
    if effects.employee_mood != 0.0 {
        for e in state.government.employees.iter_mut() {
            if department.map_or(true, |d| &e.department == d) {
                e.mood = clamp_metric(e.mood + effects.employee_mood);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::init::default_state;
    use mayor_catalog::Catalog;
    use mayor_core::{ledger, AccountType, GameState, Money, SimConfig};
    use rust_decimal::Decimal;

    pub fn money(v: i64) -> Money {
        Decimal::new(v, 0)
    }

    pub fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    /// Default game built from the shipped catalog.
    pub fn game() -> (Catalog, GameState) {
        let catalog = catalog();
        let state = default_state(&catalog, &SimConfig::default());
        (catalog, state)
    }

    /// Force `account` to exactly `balance`.
    pub fn set_balance(state: &mut GameState, account: AccountType, balance: i64) {
        let current = state.balance(account);
        ledger::credit_debit(&mut state.banking.accounts, account, money(balance) - current);
    }

    /// Every account balance except `changed` equals its value in `before`.
    pub fn untouched_except(before: &GameState, after: &GameState, changed: &[AccountType]) -> bool {
        AccountType::ALL
            .iter()
            .filter(|a| !changed.contains(a))
            .all(|a| before.balance(*a) == after.balance(*a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::*;

    #[test]
    fn gate_prefers_the_funds_shortfall() {
        let mut accounts = ledger::open_accounts();
        ledger::credit(&mut accounts, AccountType::CityChecking, money(100));
        let denied = Eligibility::denied("already active");
        let e = gate(denied.clone(), &accounts, AccountType::CityChecking, money(500)).unwrap_err();
        assert!(matches!(e, CommandError::InsufficientFunds { .. }));
        let e = gate(denied, &accounts, AccountType::CityChecking, money(50)).unwrap_err();
        assert_eq!(e, CommandError::Precondition("already active".into()));
        assert!(gate(Eligibility::allowed(), &accounts, AccountType::CityChecking, money(500)).is_ok());
    }

    #[test]
    fn zero_cost_needs_no_funds() {
        let accounts = ledger::open_accounts();
        assert!(ensure_covered(&accounts, AccountType::PersonalChecking, Decimal::ZERO).is_ok());
        let mut accounts = accounts;
        assert!(pay(&mut accounts, AccountType::PersonalChecking, Decimal::ZERO).is_ok());
    }

    #[test]
    fn effects_are_clamped_and_scoped() {
        let (_, mut s) = game();
        s.mayor_rating = 95.0;
        let effects = MetricEffects {
            mayor_rating: 15.0,
            employee_mood: -200.0,
            ..MetricEffects::default()
        };
        let finance = DepartmentId::new("finance");
        apply_effects(&mut s, &effects, Some(&finance));
        assert_eq!(s.mayor_rating, 100.0);
        for e in &s.government.employees {
            if e.department == finance {
                assert_eq!(e.mood, 0.0);
            } else {
                assert!(e.mood > 0.0);
            }
        }
    }
}
