//! Personal spending: purchase availability and recurring costs.

use mayor_catalog::SpendingOption;
use mayor_core::{AccountType, GameState, Money, SpendingKind};
use serde::{Deserialize, Serialize};

/// Named sub-checks for a personal purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub affordable: bool,
    pub rating_ok: bool,
    /// Recurring expenses and assets can be held once per option.
    pub not_owned: bool,
    pub available: bool,
    pub reason: Option<String>,
}

fn already_owned(option: &SpendingOption, state: &GameState) -> bool {
    let spending = &state.personal_spending;
    match option.kind {
        SpendingKind::OneTime => false,
        SpendingKind::Recurring => spending
            .recurring_expenses
            .iter()
            .any(|e| e.option_id == option.id),
        SpendingKind::Investment => spending.assets.iter().any(|a| a.option_id == option.id),
    }
}

/// Whether the mayor can buy `option` from personal checking right now.
pub fn check_availability(option: &SpendingOption, state: &GameState) -> Availability {
    let affordable = state.balance(AccountType::PersonalChecking) >= option.cost;
    let rating_ok = state.mayor_rating >= option.min_mayor_rating;
    let not_owned = !already_owned(option, state);
    let reason = if !not_owned {
        Some(format!("{} is already owned", option.name))
    } else if !rating_ok {
        Some(format!(
            "{} needs a mayor rating of {:.0}",
            option.name, option.min_mayor_rating
        ))
    } else if !affordable {
        Some("insufficient personal funds".to_string())
    } else {
        None
    };
    Availability {
        affordable,
        rating_ok,
        not_owned,
        available: affordable && rating_ok && not_owned,
        reason,
    }
}

/// Sum of all recurring personal expenses per month.
pub fn monthly_personal_expenses(state: &GameState) -> Money {
    state
        .personal_spending
        .recurring_expenses
        .iter()
        .map(|e| e.monthly_cost)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use mayor_core::{Asset, MetricEffects, RecurringExpense};

    fn option(kind: SpendingKind, cost: i64) -> SpendingOption {
        SpendingOption {
            id: "opt".into(),
            name: "Option".into(),
            kind,
            cost: money(cost),
            monthly_cost: money(1_000),
            appreciation_rate: 0.05,
            min_mayor_rating: 40.0,
            visibility: 5.0,
            effects: MetricEffects::default(),
        }
    }

    #[test]
    fn unaffordable_purchase_is_flagged() {
        let mut s = state_with(AccountType::PersonalChecking, 1_000_000);
        s.mayor_rating = 50.0;
        let a = check_availability(&option(SpendingKind::OneTime, 3_000_000), &s);
        assert!(!a.affordable);
        assert!(!a.available);
        assert_eq!(a.reason.as_deref(), Some("insufficient personal funds"));
    }

    #[test]
    fn one_time_purchases_repeat_but_assets_do_not() {
        let mut s = state_with(AccountType::PersonalChecking, 10_000_000);
        s.mayor_rating = 50.0;
        assert!(check_availability(&option(SpendingKind::OneTime, 100), &s).available);
        s.personal_spending.assets.push(Asset {
            id: "asset-1".into(),
            option_id: "opt".into(),
            name: "Option".into(),
            purchase_price: money(100),
            current_value: money(100),
            appreciation_rate: 0.05,
            purchased_on: s.date,
        });
        let a = check_availability(&option(SpendingKind::Investment, 100), &s);
        assert!(!a.not_owned);
        assert!(check_availability(&option(SpendingKind::OneTime, 100), &s).available);
    }

    #[test]
    fn recurring_total() {
        let mut s = state_with(AccountType::PersonalChecking, 0);
        for (i, cost) in [200_000, 150_000].into_iter().enumerate() {
            s.personal_spending.recurring_expenses.push(RecurringExpense {
                id: format!("expense-{i}"),
                option_id: format!("o{i}"),
                name: "x".into(),
                monthly_cost: money(cost),
                started_on: s.date,
            });
        }
        assert_eq!(monthly_personal_expenses(&s), money(350_000));
    }
}
