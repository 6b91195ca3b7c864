//! Investment and industrial-project resolvers.

use crate::{money_from_f64, Eligibility};
use mayor_catalog::{select_kickbacks, IndustrialProjectTemplate, InvestmentTemplate, KickbackOption};
use mayor_core::{AccountType, ActiveInvestment, GameState, Money};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share of principal forfeited when an investment is withdrawn early.
pub const EARLY_WITHDRAWAL_PENALTY: f64 = 0.10;

/// Whether the city can fund `template` now.
pub fn can_invest(template: &InvestmentTemplate, state: &GameState) -> Eligibility {
    if state.mayor_rating < template.min_mayor_rating {
        return Eligibility::denied(format!(
            "{} needs a mayor rating of {:.0}",
            template.name, template.min_mayor_rating
        ));
    }
    if state.balance(AccountType::CityChecking) < template.cost {
        return Eligibility::denied("insufficient city funds");
    }
    Eligibility::allowed()
}

/// Payout of withdrawing `inv` now.
///
/// Return accrues linearly over elapsed months up to the duration; leaving
/// before the end forfeits a tenth of the principal. Never negative.
pub fn investment_payout(inv: &ActiveInvestment) -> Money {
    let principal = inv.principal.to_f64().unwrap_or(0.0);
    let months = inv.months_elapsed.min(inv.duration_months);
    let earned = principal * f64::from(inv.annual_return) * f64::from(months) / 12.0;
    let penalty = if inv.months_elapsed < inv.duration_months {
        principal * EARLY_WITHDRAWAL_PENALTY
    } else {
        0.0
    };
    money_from_f64(principal + earned - penalty).max(Decimal::ZERO)
}

/// Named sub-checks for starting a project with optional kickbacks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectChecks {
    pub funds: bool,
    pub rating: bool,
    pub kickbacks_known: bool,
    pub all_met: bool,
    /// First failing check, phrased for the player.
    pub reason: Option<String>,
}

/// Base cost plus every selected kickback.
pub fn project_total_cost(base_cost: Money, kickbacks: &[&KickbackOption]) -> Money {
    base_cost + kickbacks.iter().map(|k| k.amount).sum::<Money>()
}

/// Shared project eligibility for industrial and construction projects.
pub fn project_checks(
    name: &str,
    base_cost: Money,
    min_mayor_rating: f32,
    options: &[KickbackOption],
    kickback_ids: &[String],
    state: &GameState,
) -> ProjectChecks {
    let selected = select_kickbacks(options, kickback_ids);
    let kickbacks_known = selected.is_ok();
    let total = match &selected {
        Ok(ks) => project_total_cost(base_cost, ks),
        Err(_) => base_cost,
    };
    let rating = state.mayor_rating >= min_mayor_rating;
    let funds = state.balance(AccountType::CityChecking) >= total;
    let reason = match selected {
        Err(id) => Some(format!("unknown kickback option {id}")),
        Ok(_) if !rating => Some(format!("{name} needs a mayor rating of {min_mayor_rating:.0}")),
        Ok(_) if !funds => Some("insufficient city funds".to_string()),
        Ok(_) => None,
    };
    ProjectChecks {
        funds,
        rating,
        kickbacks_known,
        all_met: funds && rating && kickbacks_known,
        reason,
    }
}

/// Eligibility of an industrial project with the chosen kickbacks.
pub fn can_implement_project(
    template: &IndustrialProjectTemplate,
    kickback_ids: &[String],
    state: &GameState,
) -> ProjectChecks {
    project_checks(
        &template.name,
        template.base_cost,
        template.min_mayor_rating,
        &template.kickbacks,
        kickback_ids,
        state,
    )
}

/// Corruption-risk increase caused by the selected kickbacks.
pub fn kickback_risk(kickbacks: &[&KickbackOption]) -> f32 {
    kickbacks.iter().map(|k| k.risk).sum()
}
