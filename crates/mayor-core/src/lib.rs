#![deny(warnings)]

//! Core domain models and invariants for the city-mayor simulation.
//!
//! This crate defines the serializable [`GameState`] tree, the ledger
//! primitives that move money between accounts, the bounded history log and
//! validation helpers that check the cross-subsystem invariants after every
//! transition.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod domain;
pub mod history;
pub mod ledger;
pub mod state;

pub use domain::*;
pub use history::BoundedLog;
pub use ledger::{Account, AccountFamily, AccountType, Accounts, LedgerError};
pub use state::*;

/// Monetary amount. Every balance, cost and payment in the simulation.
pub type Money = Decimal;

/// Lower bound of the mayor rating.
pub const MIN_MAYOR_RATING: f32 = 0.0;
/// Upper bound of the mayor rating.
pub const MAX_MAYOR_RATING: f32 = 100.0;
/// Lower bound of every other bounded metric.
pub const METRIC_MIN: f32 = 0.0;
/// Upper bound of every other bounded metric.
pub const METRIC_MAX: f32 = 100.0;
/// Highest tax rate (percent) any tax line may be set to.
pub const MAX_TAX_RATE: f32 = 60.0;

pub const BANKING_HISTORY_CAP: usize = 100;
pub const INDUSTRY_HISTORY_CAP: usize = 50;
pub const SECURITY_HISTORY_CAP: usize = 50;
pub const PERSONAL_HISTORY_CAP: usize = 100;
pub const RESOLVED_ISSUES_CAP: usize = 50;

/// Clamp `value` into `[min, max]`. `NaN` maps to `min`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

/// Clamp a percentage-style metric into `[0, 100]`.
pub fn clamp_metric(value: f32) -> f32 {
    clamp(value, METRIC_MIN, METRIC_MAX)
}

/// Clamp the mayor rating into its configured range.
pub fn clamp_rating(value: f32) -> f32 {
    clamp(value, MIN_MAYOR_RATING, MAX_MAYOR_RATING)
}

/// Simulation configuration parameters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the deterministic random source.
    pub rng_seed: u64,
    /// In-game date a new game starts on.
    pub start_date: NaiveDate,
    /// Number of days per tick of the external driver (default: 30).
    pub tick_days: u16,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            tick_days: 30,
        }
    }
}

/// Validation errors for state invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A bank account balance dropped below zero.
    #[error("account {0} has a negative balance")]
    NegativeBalance(AccountType),
    /// A bank account balance exceeds the largest supported amount.
    #[error("account {0} exceeds the largest supported balance")]
    BalanceOutOfRange(AccountType),
    /// A department budget or payroll line dropped below zero.
    #[error("department {0} has a negative budget")]
    NegativeDepartmentBudget(String),
    /// A bounded metric left its range.
    #[error("metric {name} = {value} is outside [{min}, {max}]")]
    MetricOutOfRange {
        name: String,
        value: f32,
        min: f32,
        max: f32,
    },
    /// A holding or loan carries a non-positive quantity/amount.
    #[error("invalid quantity on {0}")]
    InvalidQuantity(String),
}

fn check_metric(name: &str, value: f32, min: f32, max: f32) -> Result<(), ValidationError> {
    if value.is_nan() || value < min || value > max {
        return Err(ValidationError::MetricOutOfRange {
            name: name.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Validate the invariants every reachable state must satisfy: non-negative
/// balances and bounded metrics.
pub fn validate_state(state: &GameState) -> Result<(), ValidationError> {
    for (kind, account) in &state.banking.accounts {
        if account.balance < Decimal::ZERO {
            return Err(ValidationError::NegativeBalance(*kind));
        }
        if account.balance > ledger::max_amount() {
            return Err(ValidationError::BalanceOutOfRange(*kind));
        }
    }
    for holding in &state.banking.portfolio {
        if holding.quantity == 0 {
            return Err(ValidationError::InvalidQuantity(holding.instrument_id.clone()));
        }
    }
    for loan in &state.banking.loans {
        if loan.remaining_amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidQuantity(loan.id.clone()));
        }
    }
    for dept in state.government.departments.values() {
        if dept.budget < Decimal::ZERO || dept.payroll < Decimal::ZERO {
            return Err(ValidationError::NegativeDepartmentBudget(dept.id.0.clone()));
        }
        check_metric(&format!("{}.satisfaction", dept.id), dept.satisfaction, METRIC_MIN, METRIC_MAX)?;
        check_metric(&format!("{}.efficiency", dept.id), dept.efficiency, METRIC_MIN, METRIC_MAX)?;
    }
    if state.budget < Decimal::ZERO {
        return Err(ValidationError::NegativeDepartmentBudget("city".to_string()));
    }

    check_metric("mayor_rating", state.mayor_rating, MIN_MAYOR_RATING, MAX_MAYOR_RATING)?;
    for (name, value) in state.global_metrics() {
        check_metric(name, value, METRIC_MIN, METRIC_MAX)?;
    }
    for e in &state.government.employees {
        for (name, value) in [
            ("competence", e.competence),
            ("mood", e.mood),
            ("workload", e.workload),
            ("loyalty", e.loyalty),
        ] {
            check_metric(&format!("{}.{name}", e.id), value, METRIC_MIN, METRIC_MAX)?;
        }
    }
    for g in &state.citizens.groups {
        check_metric(&format!("{}.satisfaction", g.id), g.satisfaction, METRIC_MIN, METRIC_MAX)?;
        check_metric(&format!("{}.influence", g.id), g.influence, METRIC_MIN, METRIC_MAX)?;
    }
    for a in &state.security.agencies {
        check_metric(&format!("{}.suspicion", a.id), a.suspicion, METRIC_MIN, METRIC_MAX)?;
    }
    for t in &state.security.threats {
        check_metric(&format!("{}.severity", t.id), t.severity, METRIC_MIN, METRIC_MAX)?;
    }
    for p in &state.construction.active_projects {
        check_metric(&format!("{}.quality", p.id), p.quality, METRIC_MIN, METRIC_MAX)?;
    }
    for (tax, rate) in &state.taxation.rates {
        check_metric(&format!("tax.{tax:?}"), *rate, 0.0, MAX_TAX_RATE)?;
    }
    Ok(())
}
