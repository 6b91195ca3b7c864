//! City investments and industrial projects.

use super::{apply_effects, ensure_covered, gate, pay, HandlerResult};
use crate::command::{MakeInvestment, StartProject, WithdrawInvestment};
use crate::error::CommandError;
use mayor_catalog::{select_kickbacks, Catalog, KickbackOption};
use mayor_core::{
    clamp_metric, ledger, AccountType, ActiveIndustrialProject, ActiveInvestment, GameState, IndustryTransaction,
    IndustryTxKind, Money,
};
use mayor_econ::industry::{
    can_implement_project, can_invest, investment_payout, kickback_risk, project_total_cost, ProjectChecks,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

pub fn make_investment(state: &GameState, cmd: &MakeInvestment, catalog: &Catalog) -> HandlerResult {
    let template = catalog
        .investment(&cmd.investment_id)
        .ok_or_else(|| CommandError::not_found("investment", &cmd.investment_id))?;
    gate(
        can_invest(template, state),
        &state.banking.accounts,
        AccountType::CityChecking,
        template.cost,
    )?;

    let mut next = state.clone();
    pay(&mut next.banking.accounts, AccountType::CityChecking, template.cost)?;
    let kickback = template.kickback_amount();
    if kickback > Decimal::ZERO {
        ledger::credit(&mut next.banking.accounts, AccountType::PersonalSavings, kickback);
    }
    let id = next.allocate_id("investment");
    next.industry.active_investments.push(ActiveInvestment {
        id: id.clone(),
        template_id: template.id.clone(),
        name: template.name.clone(),
        principal: template.cost,
        annual_return: template.annual_return,
        duration_months: template.duration_months,
        months_elapsed: 0,
        started_on: state.date,
    });
    next.industry.total_invested = next.industry.total_invested.saturating_add(template.cost);
    next.industry.history.push(IndustryTransaction {
        date: state.date,
        kind: IndustryTxKind::Investment,
        reference: id,
        amount: template.cost,
        profit: None,
    });
    apply_effects(&mut next, &template.effects, None);
    Ok(next)
}

/// Close an active investment. Profit is payout minus principal and may
/// be negative.
pub fn withdraw_investment(state: &GameState, cmd: &WithdrawInvestment) -> HandlerResult {
    let idx = state
        .industry
        .active_investments
        .iter()
        .position(|i| i.id == cmd.investment_id)
        .ok_or_else(|| CommandError::not_found("active investment", &cmd.investment_id))?;
    let inv = &state.industry.active_investments[idx];
    let payout = investment_payout(inv);
    let profit = payout - inv.principal;

    let mut next = state.clone();
    ledger::credit(&mut next.banking.accounts, AccountType::CityChecking, payout);
    next.industry.active_investments.remove(idx);
    next.industry.total_profit = next.industry.total_profit.saturating_add(profit);
    next.industry.history.push(IndustryTransaction {
        date: state.date,
        kind: IndustryTxKind::Withdrawal,
        reference: inv.id.clone(),
        amount: payout,
        profit: Some(profit),
    });
    Ok(next)
}

/// Validate a kickback selection shared by industrial and construction
/// projects and return the chosen options with the total city cost.
pub(crate) fn checked_kickbacks<'a>(
    checks: ProjectChecks,
    options: &'a [KickbackOption],
    ids: &[String],
    base_cost: Money,
    state: &GameState,
) -> Result<(Vec<&'a KickbackOption>, Money), CommandError> {
    let mut seen = BTreeSet::new();
    if let Some(dup) = ids.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(CommandError::invalid(format!("kickback option {dup} selected more than once")));
    }
    let selected = select_kickbacks(options, ids).map_err(|id| CommandError::not_found("kickback option", id))?;
    let total = project_total_cost(base_cost, &selected);
    if !checks.all_met {
        ensure_covered(&state.banking.accounts, AccountType::CityChecking, total)?;
        return Err(CommandError::Precondition(
            checks.reason.unwrap_or_else(|| "project is not eligible".to_string()),
        ));
    }
    Ok((selected, total))
}

/// Route a project's money: the full cost leaves city checking and the
/// kickback share lands offshore.
pub(crate) fn pay_with_kickbacks(next: &mut GameState, total: Money, kickbacks: &[&KickbackOption]) -> Result<Money, CommandError> {
    pay(&mut next.banking.accounts, AccountType::CityChecking, total)?;
    let skim: Money = kickbacks.iter().map(|k| k.amount).sum();
    if skim > Decimal::ZERO {
        ledger::credit(&mut next.banking.accounts, AccountType::Offshore, skim);
    }
    next.government.corruption_risk = clamp_metric(next.government.corruption_risk + kickback_risk(kickbacks));
    Ok(skim)
}

pub fn implement_industrial_project(state: &GameState, cmd: &StartProject, catalog: &Catalog) -> HandlerResult {
    let template = catalog
        .industrial_project(&cmd.project_id)
        .ok_or_else(|| CommandError::not_found("industrial project", &cmd.project_id))?;
    let checks = can_implement_project(template, &cmd.kickback_ids, state);
    let (kickbacks, total) =
        checked_kickbacks(checks, &template.kickbacks, &cmd.kickback_ids, template.base_cost, state)?;

    let mut next = state.clone();
    let skim = pay_with_kickbacks(&mut next, total, &kickbacks)?;
    let id = next.allocate_id("industrial");
    next.industry.active_projects.push(ActiveIndustrialProject {
        id: id.clone(),
        template_id: template.id.clone(),
        name: template.name.clone(),
        base_cost: template.base_cost,
        kickback_total: skim,
        kickback_ids: cmd.kickback_ids.clone(),
        progress: 0.0,
        remaining_months: template.duration_months,
        jobs: template.jobs,
        started_on: state.date,
    });
    next.industry.jobs_created += template.jobs;
    next.industry.history.push(IndustryTransaction {
        date: state.date,
        kind: IndustryTxKind::Project,
        reference: id,
        amount: total,
        profit: None,
    });
    apply_effects(&mut next, &template.effects, None);
    Ok(next)
}
