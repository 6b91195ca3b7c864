//! Banking resolvers: credit rating, amortization, deposit payouts.

use crate::metrics::total_personal_wealth;
use crate::{money_from_f64, Eligibility};
use chrono::{Days, NaiveDate};
use mayor_catalog::DepositOffer;
use mayor_core::{AccountFamily, Deposit, GameState, Money};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub const MIN_CREDIT_RATING: u16 = 300;
pub const MAX_CREDIT_RATING: u16 = 850;
/// Days per month used for deposit maturity.
pub const DAYS_PER_MONTH: u64 = 30;

const BASE_CREDIT_RATING: i64 = 450;
const MISSED_PAYMENT_PENALTY: i64 = 50;

/// Credit rating in `[300, 850]`.
///
/// Grows with the mayor rating and personal wealth, shrinks with outstanding
/// debt and missed payments.
pub fn credit_rating(state: &GameState) -> u16 {
    let million = Decimal::new(1_000_000, 0);
    let wealth_bonus = (total_personal_wealth(state) / million)
        .floor()
        .to_i64()
        .unwrap_or(0)
        .clamp(0, 100);
    let debt: Money = state.banking.loans.iter().map(|l| l.remaining_amount).sum();
    let debt_penalty = (debt * Decimal::TEN / million)
        .round()
        .to_i64()
        .unwrap_or(i64::MAX)
        .clamp(0, 200);
    let rating_bonus = (2.0 * state.mayor_rating).round() as i64;
    let raw = BASE_CREDIT_RATING + rating_bonus + wealth_bonus
        - debt_penalty
        - MISSED_PAYMENT_PENALTY * i64::from(state.banking.missed_payments);
    raw.clamp(i64::from(MIN_CREDIT_RATING), i64::from(MAX_CREDIT_RATING)) as u16
}

/// Standard amortized monthly payment, rounded to cents.
///
/// A zero rate spreads the principal evenly; a zero term returns the whole
/// principal.
pub fn monthly_payment(principal: Money, annual_rate: f32, months: u32) -> Money {
    if months == 0 {
        return principal;
    }
    let r = f64::from(annual_rate) / 12.0;
    if r.abs() < f64::EPSILON {
        return (principal / Decimal::from(months)).round_dp(2);
    }
    let p = principal.to_f64().unwrap_or(0.0);
    let payment = p * r / (1.0 - (1.0 + r).powi(-(months as i32)));
    money_from_f64(payment)
}

/// Maturity date: `opened + term * 30 days`.
pub fn maturity_date(opened: NaiveDate, term_months: u32) -> NaiveDate {
    opened
        .checked_add_days(Days::new(u64::from(term_months) * DAYS_PER_MONTH))
        .unwrap_or(NaiveDate::MAX)
}

/// What withdrawing `deposit` on `today` pays back.
///
/// Matured deposits earn simple interest over the term; early withdrawals
/// return the principal only.
pub fn deposit_payout(deposit: &Deposit, today: NaiveDate) -> Money {
    if today < deposit.matures_on {
        return deposit.amount;
    }
    let growth = f64::from(deposit.annual_rate) * f64::from(deposit.term_months) / 12.0;
    let interest = money_from_f64(deposit.amount.to_f64().unwrap_or(0.0) * growth);
    deposit.amount + interest
}

/// Amount must be within the offer's `[min_amount, max_amount]`.
pub fn check_deposit_amount(offer: &DepositOffer, amount: Money) -> Eligibility {
    if amount < offer.min_amount {
        return Eligibility::denied(format!(
            "{} requires at least {}",
            offer.name, offer.min_amount
        ));
    }
    if amount > offer.max_amount {
        return Eligibility::denied(format!("{} accepts at most {}", offer.name, offer.max_amount));
    }
    Eligibility::allowed()
}

/// Weighted average cost after adding `add_qty` units at `price`, or `None`
/// when the position value does not fit in a `Decimal`.
pub fn average_cost(old_qty: u32, old_avg: Money, add_qty: u32, price: Money) -> Option<Money> {
    let total = u64::from(old_qty) + u64::from(add_qty);
    if total == 0 {
        return Some(Decimal::ZERO);
    }
    let held = old_avg.checked_mul(Decimal::from(old_qty))?;
    let added = price.checked_mul(Decimal::from(add_qty))?;
    let avg = held.checked_add(added)?.checked_div(Decimal::from(total))?;
    Some(avg.round_dp(4))
}

/// Monthly debt service attributable to the city accounts.
pub fn city_debt_service(state: &GameState) -> Money {
    state
        .banking
        .loans
        .iter()
        .filter(|l| l.account.family() == AccountFamily::City)
        .map(|l| l.monthly_payment)
        .sum()
}
