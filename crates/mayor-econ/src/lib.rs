#![deny(warnings)]

//! Subsystem resolvers for the city-mayor simulation.
//!
//! Every function here is pure: it reads catalog templates and the current
//! state and returns a derived number, a boolean or an eligibility report.
//! Nothing mutates. The only nondeterminism in the engine, the uniform draw
//! for probabilistic outcomes, is isolated behind [`RandomSource`].

use mayor_core::Money;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod banking;
pub mod citizens;
pub mod construction;
pub mod government;
pub mod industry;
pub mod metrics;
pub mod personal;
pub mod random;
pub mod security;
pub mod taxation;

pub use random::{RandomSource, SeededRandom, SequenceRandom};

/// Outcome of an eligibility check. Never an error: callers decide.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl Eligibility {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Lossy money → float conversion for scoring formulas.
pub fn money_to_f32(m: Money) -> f32 {
    m.to_f32().unwrap_or(0.0)
}

/// Float → money, rounded to cents. Non-finite input maps to zero.
pub fn money_from_f64(v: f64) -> Money {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO).round_dp(2)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use mayor_core::*;
    use rust_decimal::Decimal;

    pub fn money(v: i64) -> Money {
        Decimal::new(v, 0)
    }

    pub fn employee(id: &str, dept: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: id.to_uppercase(),
            department: DepartmentId::new(dept),
            position: Position::Specialist,
            competence: 60.0,
            mood: 60.0,
            workload: 50.0,
            loyalty: 60.0,
            experience_years: 5.0,
            salary: money(100_000),
            months_since_promotion: 0,
        }
    }

    pub fn group(id: &str) -> CitizenGroup {
        CitizenGroup {
            id: id.to_string(),
            name: id.to_string(),
            population: 100_000,
            influence: 50.0,
            satisfaction: 50.0,
            loyalty: 50.0,
            education_level: 50.0,
            protest_potential: 40.0,
            promises_made: 0,
            promises_kept: 0,
        }
    }

    pub fn issue(id: &str, group: &str, expected: Vec<ResponseType>) -> Issue {
        Issue {
            id: id.to_string(),
            title: id.to_string(),
            group_id: group.to_string(),
            urgency: Urgency::Medium,
            cost: money(1_000_000),
            expected_responses: expected,
        }
    }

    pub fn state_with(account: AccountType, balance: i64) -> GameState {
        let mut state = GameState::default();
        state.banking.accounts = ledger::open_accounts();
        ledger::credit(&mut state.banking.accounts, account, money(balance));
        state
    }
}
