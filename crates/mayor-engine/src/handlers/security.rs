//! Covert operations against agencies and threat mitigation.
//!
//! Both handlers settle the cost before drawing, so a rejected command never
//! consumes a random draw. The outcome moves the agency one step along the
//! influence ladder.

use super::{ensure_covered, pay, HandlerResult};
use crate::command::{ExecuteSecurityOperation, MitigateThreat};
use crate::error::CommandError;
use mayor_catalog::Catalog;
use mayor_core::{clamp_metric, AccountType, GameState, SecurityActionKind, SecurityRecord};
use mayor_econ::security::{influence_after, mitigation_probability, operation_success_probability, resolve_outcome};
use mayor_econ::RandomSource;

/// Share of the risk reduction also taken off the agency's suspicion.
const SUSPICION_RELIEF: f32 = 0.5;
/// Severity added to a threat that survives a failed mitigation.
const SEVERITY_ESCALATION: f32 = 10.0;

pub fn execute_security_operation(
    state: &GameState,
    cmd: &ExecuteSecurityOperation,
    catalog: &Catalog,
    rng: &mut dyn RandomSource,
) -> HandlerResult {
    let op = catalog
        .security_operation(&cmd.operation_id)
        .ok_or_else(|| CommandError::not_found("security operation", &cmd.operation_id))?;
    let agency_idx = state
        .security
        .agencies
        .iter()
        .position(|a| a.id == cmd.agency_id)
        .ok_or_else(|| CommandError::not_found("agency", &cmd.agency_id))?;
    let account = if op.kind.uses_personal_funds() {
        AccountType::PersonalChecking
    } else {
        AccountType::CityChecking
    };
    ensure_covered(&state.banking.accounts, account, op.cost)?;

    let probability = operation_success_probability(
        op,
        &state.security.agencies[agency_idx],
        state.security.protection_level,
    );
    let mut next = state.clone();
    pay(&mut next.banking.accounts, account, op.cost)?;
    let success = resolve_outcome(probability, rng);

    let security = &mut next.security;
    let agency = &mut security.agencies[agency_idx];
    agency.influence = influence_after(agency.influence, success);
    if success {
        agency.suspicion = clamp_metric(agency.suspicion - SUSPICION_RELIEF * op.risk_reduction);
        security.investigation_risk = clamp_metric(security.investigation_risk - op.risk_reduction);
    } else {
        agency.suspicion = clamp_metric(agency.suspicion + op.suspicion_on_failure);
        security.investigation_risk = clamp_metric(security.investigation_risk + op.risk_on_failure);
    }
    security.history.push(SecurityRecord {
        date: state.date,
        kind: SecurityActionKind::Operation,
        reference: op.id.clone(),
        agency_id: Some(cmd.agency_id.clone()),
        account,
        cost: op.cost,
        success_probability: probability,
        success,
    });
    Ok(next)
}

pub fn mitigate_threat(state: &GameState, cmd: &MitigateThreat, rng: &mut dyn RandomSource) -> HandlerResult {
    let threat_idx = state
        .security
        .threats
        .iter()
        .position(|t| t.id == cmd.threat_id)
        .ok_or_else(|| CommandError::not_found("threat", &cmd.threat_id))?;
    let threat = &state.security.threats[threat_idx];
    let option = threat
        .mitigation_options
        .iter()
        .find(|o| o.id == cmd.option_id)
        .ok_or_else(|| CommandError::not_found("mitigation option", &cmd.option_id))?;
    let account = if option.personal_funds {
        AccountType::PersonalChecking
    } else {
        AccountType::CityChecking
    };
    ensure_covered(&state.banking.accounts, account, option.cost)?;

    let probability = mitigation_probability(option);
    let mut next = state.clone();
    pay(&mut next.banking.accounts, account, option.cost)?;
    let success = resolve_outcome(probability, rng);

    let security = &mut next.security;
    if let Some(agency_id) = &threat.agency_id {
        if let Some(agency) = security.agencies.iter_mut().find(|a| &a.id == agency_id) {
            agency.influence = influence_after(agency.influence, success);
        }
    }
    if success {
        security.threats.remove(threat_idx);
        security.investigation_risk = clamp_metric(security.investigation_risk - 0.2 * threat.severity);
    } else {
        let open = &mut security.threats[threat_idx];
        open.severity = clamp_metric(open.severity + SEVERITY_ESCALATION);
        security.investigation_risk = clamp_metric(security.investigation_risk + 0.1 * threat.severity);
    }
    security.history.push(SecurityRecord {
        date: state.date,
        kind: SecurityActionKind::Mitigation,
        reference: format!("{}/{}", threat.id, option.id),
        agency_id: threat.agency_id.clone(),
        account,
        cost: option.cost,
        success_probability: probability,
        success,
    });
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::*;
    use mayor_core::InfluenceLevel;
    use mayor_econ::SequenceRandom;

    fn bribe_tax_service() -> ExecuteSecurityOperation {
        ExecuteSecurityOperation {
            operation_id: "bribe_inspector".into(),
            agency_id: "tax_service".into(),
        }
    }

    fn agency(state: &GameState, id: &str) -> InfluenceLevel {
        state
            .security
            .agencies
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.influence)
            .unwrap()
    }

    #[test]
    fn bribery_success_befriends_the_agency() {
        let (catalog, s) = game();
        let mut rng = SequenceRandom::constant(0.1);
        let next = execute_security_operation(&s, &bribe_tax_service(), &catalog, &mut rng).unwrap();
        assert_eq!(agency(&next, "tax_service"), InfluenceLevel::Neutral);
        assert_eq!(
            s.balance(AccountType::PersonalChecking) - next.balance(AccountType::PersonalChecking),
            money(500_000)
        );
        assert!(untouched_except(&s, &next, &[AccountType::PersonalChecking]));
        assert_eq!(next.security.investigation_risk, 0.0);
        let record = next.security.history.latest().unwrap();
        assert!(record.success);
        assert!((record.success_probability - 46.0).abs() < 1e-4);
    }

    #[test]
    fn bribery_failure_sours_the_agency_and_still_costs() {
        let (catalog, s) = game();
        let mut rng = SequenceRandom::constant(0.9);
        let next = execute_security_operation(&s, &bribe_tax_service(), &catalog, &mut rng).unwrap();
        assert_eq!(agency(&next, "tax_service"), InfluenceLevel::Hostile);
        assert_eq!(
            s.balance(AccountType::PersonalChecking) - next.balance(AccountType::PersonalChecking),
            money(500_000)
        );
        assert_eq!(next.security.investigation_risk, s.security.investigation_risk + 15.0);
    }

    #[test]
    fn surveillance_is_paid_by_the_city() {
        let (catalog, s) = game();
        let cmd = ExecuteSecurityOperation {
            operation_id: "phone_taps".into(),
            agency_id: "prosecutor".into(),
        };
        let next = execute_security_operation(&s, &cmd, &catalog, &mut SequenceRandom::constant(0.0)).unwrap();
        assert!(untouched_except(&s, &next, &[AccountType::CityChecking]));
        assert_eq!(
            s.balance(AccountType::CityChecking) - next.balance(AccountType::CityChecking),
            money(300_000)
        );
    }

    #[test]
    fn unaffordable_operation_draws_nothing() {
        let (catalog, mut s) = game();
        set_balance(&mut s, AccountType::PersonalChecking, 100);
        let mut rng = SequenceRandom::new(vec![0.1, 0.9]);
        let err = execute_security_operation(&s, &bribe_tax_service(), &catalog, &mut rng).unwrap_err();
        assert!(matches!(err, CommandError::InsufficientFunds { .. }));
        // The first draw is still available to the next command.
        assert!(rng.roll(50.0));
    }

    #[test]
    fn successful_mitigation_removes_the_threat() {
        let (_, s) = game();
        let cmd = MitigateThreat {
            threat_id: "tax_audit".into(),
            option_id: "audit_bribe".into(),
        };
        let next = mitigate_threat(&s, &cmd, &mut SequenceRandom::constant(0.2)).unwrap();
        assert!(next.security.threats.iter().all(|t| t.id != "tax_audit"));
        assert_eq!(agency(&next, "tax_service"), InfluenceLevel::Neutral);
        assert_eq!(
            s.balance(AccountType::PersonalChecking) - next.balance(AccountType::PersonalChecking),
            money(700_000)
        );
    }

    #[test]
    fn failed_mitigation_escalates() {
        let (_, s) = game();
        let cmd = MitigateThreat {
            threat_id: "whistleblower".into(),
            option_id: "whistle_promote".into(),
        };
        let next = mitigate_threat(&s, &cmd, &mut SequenceRandom::constant(0.95)).unwrap();
        let t = next.security.threats.iter().find(|t| t.id == "whistleblower").unwrap();
        assert_eq!(t.severity, 35.0);
        assert!(untouched_except(&s, &next, &[AccountType::CityChecking]));
        assert!(!next.security.history.latest().unwrap().success);
    }

    #[test]
    fn unknown_option_is_not_found() {
        let (_, s) = game();
        let cmd = MitigateThreat {
            threat_id: "tax_audit".into(),
            option_id: "prayer".into(),
        };
        assert!(matches!(
            mitigate_threat(&s, &cmd, &mut SequenceRandom::constant(0.0)),
            Err(CommandError::NotFound { kind: "mitigation option", .. })
        ));
    }
}
