//! Covert operations and threat mitigation.

use crate::RandomSource;
use mayor_catalog::SecurityOperation;
use mayor_core::{clamp_metric, Agency, InfluenceLevel, MitigationOption};

/// Success probability (0..=100) of `op` against `agency`.
pub fn operation_success_probability(op: &SecurityOperation, agency: &Agency, protection_level: f32) -> f32 {
    clamp_metric(
        op.base_success + agency.influence.success_modifier() - 0.2 * agency.suspicion
            + 0.1 * protection_level,
    )
}

/// Success probability of a mitigation option; the option's own rate, clamped.
pub fn mitigation_probability(option: &MitigationOption) -> f32 {
    clamp_metric(option.success_rate)
}

/// Draw once against `probability`.
pub fn resolve_outcome<R: RandomSource + ?Sized>(probability: f32, rng: &mut R) -> bool {
    rng.roll(probability)
}

/// Influence one step along the ladder in the outcome's direction.
pub fn influence_after(level: InfluenceLevel, success: bool) -> InfluenceLevel {
    if success {
        level.improved()
    } else {
        level.worsened()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::money;
    use crate::SequenceRandom;
    use mayor_core::OperationKind;

    fn bribe() -> SecurityOperation {
        SecurityOperation {
            id: "bribe_inspector".into(),
            name: "Bribe".into(),
            kind: OperationKind::Bribery,
            cost: money(500_000),
            base_success: 60.0,
            risk_reduction: 10.0,
            risk_on_failure: 15.0,
            suspicion_on_failure: 10.0,
        }
    }

    fn agency(influence: InfluenceLevel, suspicion: f32) -> Agency {
        Agency {
            id: "tax_service".into(),
            name: "Tax Service".into(),
            influence,
            suspicion,
        }
    }

    #[test]
    fn probability_blends_influence_suspicion_protection() {
        let p = operation_success_probability(&bribe(), &agency(InfluenceLevel::Unfriendly, 30.0), 20.0);
        // 60 - 10 - 6 + 2
        assert!((p - 46.0).abs() < 1e-4);
        let p = operation_success_probability(&bribe(), &agency(InfluenceLevel::Controlled, 0.0), 300.0);
        assert_eq!(p, 100.0);
    }

    #[test]
    fn outcome_follows_the_draw() {
        let mut low = SequenceRandom::constant(0.1);
        let mut high = SequenceRandom::constant(0.9);
        assert!(resolve_outcome(46.0, &mut low));
        assert!(!resolve_outcome(46.0, &mut high));
        assert_eq!(influence_after(InfluenceLevel::Neutral, true), InfluenceLevel::Friendly);
        assert_eq!(influence_after(InfluenceLevel::Neutral, false), InfluenceLevel::Unfriendly);
    }

    #[test]
    fn mitigation_rate_is_clamped() {
        let m = MitigationOption {
            id: "m".into(),
            name: "M".into(),
            cost: money(1),
            success_rate: 140.0,
            personal_funds: false,
        };
        assert_eq!(mitigation_probability(&m), 100.0);
    }
}
