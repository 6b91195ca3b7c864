//! Personal purchases, recurring expenses and assets.

use super::{apply_effects, pay, HandlerResult};
use crate::command::{CancelRecurringExpense, MakePurchase, SellAsset};
use crate::error::CommandError;
use mayor_catalog::Catalog;
use mayor_core::{clamp_metric, ledger, AccountType, Asset, GameState, PurchaseRecord, RecurringExpense, SpendingKind};
use mayor_econ::personal::check_availability;

/// Buy a spending option out of personal checking.
///
/// Ownership and rating are checked first; a purchase that passes both but
/// cannot be paid for is rejected as insufficient funds.
pub fn make_purchase(state: &GameState, cmd: &MakePurchase, catalog: &Catalog) -> HandlerResult {
    let option = catalog
        .spending_option(&cmd.option_id)
        .ok_or_else(|| CommandError::not_found("spending option", &cmd.option_id))?;
    let availability = check_availability(option, state);
    if !availability.not_owned || !availability.rating_ok {
        return Err(CommandError::Precondition(
            availability.reason.unwrap_or_else(|| "option is not available".to_string()),
        ));
    }

    let mut next = state.clone();
    pay(&mut next.banking.accounts, AccountType::PersonalChecking, option.cost)?;
    let spending = &mut next.personal_spending;
    spending.history.push(PurchaseRecord {
        date: state.date,
        option_id: option.id.clone(),
        name: option.name.clone(),
        kind: option.kind,
        cost: option.cost,
    });
    spending.total_spent = spending.total_spent.saturating_add(option.cost);
    match option.kind {
        SpendingKind::OneTime => {}
        SpendingKind::Recurring => {
            let id = next.allocate_id("expense");
            next.personal_spending.recurring_expenses.push(RecurringExpense {
                id,
                option_id: option.id.clone(),
                name: option.name.clone(),
                monthly_cost: option.monthly_cost,
                started_on: state.date,
            });
        }
        SpendingKind::Investment => {
            let id = next.allocate_id("asset");
            next.personal_spending.assets.push(Asset {
                id,
                option_id: option.id.clone(),
                name: option.name.clone(),
                purchase_price: option.cost,
                current_value: option.cost,
                appreciation_rate: option.appreciation_rate,
                purchased_on: state.date,
            });
        }
    }
    apply_effects(&mut next, &option.effects, None);
    next.government.corruption_risk = clamp_metric(next.government.corruption_risk + option.visibility);
    Ok(next)
}

pub fn cancel_recurring_expense(state: &GameState, cmd: &CancelRecurringExpense) -> HandlerResult {
    let idx = state
        .personal_spending
        .recurring_expenses
        .iter()
        .position(|e| e.id == cmd.expense_id)
        .ok_or_else(|| CommandError::not_found("recurring expense", &cmd.expense_id))?;
    let mut next = state.clone();
    next.personal_spending.recurring_expenses.remove(idx);
    Ok(next)
}

/// Sell an asset at its current value into personal checking.
pub fn sell_asset(state: &GameState, cmd: &SellAsset) -> HandlerResult {
    let idx = state
        .personal_spending
        .assets
        .iter()
        .position(|a| a.id == cmd.asset_id)
        .ok_or_else(|| CommandError::not_found("asset", &cmd.asset_id))?;
    let mut next = state.clone();
    let asset = next.personal_spending.assets.remove(idx);
    ledger::credit(&mut next.banking.accounts, AccountType::PersonalChecking, asset.current_value);
    Ok(next)
}
