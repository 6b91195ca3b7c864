//! Responses to citizen issues.

use super::{pay, require_positive, HandlerResult};
use crate::command::RespondToIssue;
use crate::error::CommandError;
use mayor_core::{clamp_metric, AccountType, GameState, ResolvedIssue, ResponseType};
use mayor_econ::citizens::{response_effectiveness, satisfaction_change, Response};

/// Protest potential added to a group whose issue was ignored.
const IGNORED_PROTEST_GAIN: f32 = 5.0;

/// Answer an active issue. The issue always moves to the resolved log, even
/// when the answer leaves the group no happier.
pub fn respond_to_issue(state: &GameState, cmd: &RespondToIssue) -> HandlerResult {
    let issue_idx = state
        .citizens
        .active_issues
        .iter()
        .position(|i| i.id == cmd.issue_id)
        .ok_or_else(|| CommandError::not_found("issue", &cmd.issue_id))?;
    let issue = &state.citizens.active_issues[issue_idx];
    let group_idx = state
        .citizens
        .groups
        .iter()
        .position(|g| g.id == issue.group_id)
        .ok_or_else(|| CommandError::not_found("citizen group", &issue.group_id))?;

    let amount = match cmd.response {
        ResponseType::Funding => {
            let amount = cmd
                .amount
                .ok_or_else(|| CommandError::invalid("a funding response needs an amount"))?;
            require_positive(amount, "funding amount")?;
            Some(amount)
        }
        _ => None,
    };
    let response = Response {
        kind: cmd.response,
        amount,
    };
    let group = &state.citizens.groups[group_idx];
    let effectiveness = response_effectiveness(&response, issue, group);
    let change = satisfaction_change(&response, issue, group);

    let mut next = state.clone();
    if let Some(amount) = amount {
        pay(&mut next.banking.accounts, AccountType::CityChecking, amount)?;
    }
    let citizens = &mut next.citizens;
    let group = &mut citizens.groups[group_idx];
    group.satisfaction = clamp_metric(group.satisfaction + change as f32);
    match cmd.response {
        ResponseType::Promise => group.promises_made += 1,
        ResponseType::Ignore => group.protest_potential = clamp_metric(group.protest_potential + IGNORED_PROTEST_GAIN),
        ResponseType::Funding | ResponseType::Explanation => {}
    }
    let issue = citizens.active_issues.remove(issue_idx);
    citizens.resolved_issues.push(ResolvedIssue {
        issue,
        response: cmd.response,
        amount,
        effectiveness,
        satisfaction_change: change,
        resolved_on: state.date,
    });
    Ok(next)
}
