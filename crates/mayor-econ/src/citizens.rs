//! Citizen-group satisfaction and issue-response resolvers.

use mayor_core::{clamp_metric, CitizenGroup, Issue, Money, ResponseType};
use serde::{Deserialize, Serialize};

/// Satisfaction assumed when no group carries any weight.
pub const NEUTRAL_SATISFACTION: f32 = 50.0;

/// A mayor's answer to an issue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub kind: ResponseType,
    /// Money committed; only meaningful for funding responses.
    pub amount: Option<Money>,
}

fn group_weight(g: &CitizenGroup) -> f32 {
    (g.population as f32 / 1000.0) * (g.influence / 100.0)
}

/// Population- and influence-weighted average satisfaction.
pub fn overall_satisfaction(groups: &[CitizenGroup]) -> f32 {
    let (mut weighted, mut total) = (0.0f32, 0.0f32);
    for g in groups {
        let w = group_weight(g);
        weighted += g.satisfaction * w;
        total += w;
    }
    if total <= 0.0 {
        return NEUTRAL_SATISFACTION;
    }
    clamp_metric(weighted / total)
}

/// Aggregate protest potential (>= 0, unbounded above).
pub fn protest_potential(groups: &[CitizenGroup]) -> f32 {
    groups
        .iter()
        .map(|g| {
            (50.0 - g.satisfaction).max(0.0)
                * (g.protest_potential / 100.0)
                * (g.population as f32 / 100_000.0)
        })
        .sum()
}

/// How well `response` addresses `issue` for `group`, in `[0, 100]`.
pub fn response_effectiveness(response: &Response, issue: &Issue, group: &CitizenGroup) -> f32 {
    let mut score = 50.0;
    if issue.expected_responses.contains(&response.kind) {
        score += 30.0;
    }
    score += match response.kind {
        ResponseType::Funding => (group.loyalty - 50.0) * 0.2,
        ResponseType::Explanation => (group.education_level - 50.0) * 0.3,
        ResponseType::Ignore => -group.protest_potential * 0.5,
        ResponseType::Promise => (group.promise_fulfillment_rate() - 0.5) * 20.0,
    };
    clamp_metric(score * issue.urgency.multiplier())
}

/// Whole-point satisfaction change for `group`.
///
/// Funding counts only when it covers the issue's cost. Promises are scaled
/// by the group's history of kept promises.
pub fn satisfaction_change(response: &Response, issue: &Issue, group: &CitizenGroup) -> i32 {
    let effectiveness = response_effectiveness(response, issue, group);
    let positive = ((effectiveness - 40.0) / 4.0).round();
    let change = match response.kind {
        ResponseType::Funding => match response.amount {
            Some(amount) if amount >= issue.cost => positive,
            _ => 0.0,
        },
        ResponseType::Explanation => positive,
        ResponseType::Promise => (positive * group.promise_fulfillment_rate()).round(),
        ResponseType::Ignore => -((100.0 - effectiveness) / 10.0).round(),
    };
    change as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use mayor_core::Urgency;
    use proptest::prelude::*;

    fn funding(amount: i64) -> Response {
        Response {
            kind: ResponseType::Funding,
            amount: Some(money(amount)),
        }
    }

    #[test]
    fn overall_satisfaction_falls_back_to_neutral() {
        assert_eq!(overall_satisfaction(&[]), 50.0);
        let mut g = group("g");
        g.influence = 0.0;
        assert_eq!(overall_satisfaction(&[g]), 50.0);
    }

    #[test]
    fn overall_satisfaction_weights_by_population_and_influence() {
        let mut a = group("a");
        a.satisfaction = 80.0;
        a.population = 300_000;
        let mut b = group("b");
        b.satisfaction = 20.0;
        b.population = 100_000;
        // weights 150 and 50
        assert!((overall_satisfaction(&[a, b]) - 65.0).abs() < 1e-3);
    }

    #[test]
    fn protest_only_from_unhappy_groups() {
        let mut happy = group("h");
        happy.satisfaction = 70.0;
        let mut angry = group("a");
        angry.satisfaction = 30.0;
        angry.protest_potential = 50.0;
        angry.population = 200_000;
        // 20 * 0.5 * 2
        assert!((protest_potential(&[happy, angry]) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn expected_funding_scores_eighty() {
        let issue = issue("i", "g", vec![ResponseType::Funding]);
        let g = group("g");
        assert_eq!(response_effectiveness(&funding(1_000_000), &issue, &g), 80.0);
        assert_eq!(satisfaction_change(&funding(1_000_000), &issue, &g), 10);
    }

    #[test]
    fn underfunded_response_does_not_count() {
        let issue = issue("i", "g", vec![ResponseType::Funding]);
        assert_eq!(satisfaction_change(&funding(999_999), &issue, &group("g")), 0);
    }

    #[test]
    fn urgency_scales_effectiveness() {
        let mut issue = issue("i", "g", vec![]);
        issue.urgency = Urgency::Critical;
        let r = Response {
            kind: ResponseType::Explanation,
            amount: None,
        };
        assert_eq!(response_effectiveness(&r, &issue, &group("g")), 75.0);
        issue.urgency = Urgency::Low;
        assert_eq!(response_effectiveness(&r, &issue, &group("g")), 40.0);
    }

    #[test]
    fn ignoring_costs_satisfaction() {
        let issue = issue("i", "g", vec![ResponseType::Funding]);
        let r = Response {
            kind: ResponseType::Ignore,
            amount: None,
        };
        // 50 - 20 = 30 effectiveness; -(70/10)
        assert_eq!(satisfaction_change(&r, &issue, &group("g")), -7);
    }

    #[test]
    fn broken_promises_discount_new_ones() {
        let issue = issue("i", "g", vec![ResponseType::Promise]);
        let mut g = group("g");
        g.promises_made = 2;
        g.promises_kept = 1;
        let r = Response {
            kind: ResponseType::Promise,
            amount: None,
        };
        // effectiveness 80, positive 10, rate 0.5
        assert_eq!(satisfaction_change(&r, &issue, &g), 5);
    }

    proptest! {
        #[test]
        fn effectiveness_bounded(loyalty in 0.0f32..=100.0, edu in 0.0f32..=100.0, protest in 0.0f32..=100.0) {
            let mut g = group("g");
            g.loyalty = loyalty;
            g.education_level = edu;
            g.protest_potential = protest;
            let mut issue = issue("i", "g", vec![ResponseType::Funding, ResponseType::Explanation]);
            issue.urgency = Urgency::Critical;
            for kind in [ResponseType::Funding, ResponseType::Explanation, ResponseType::Ignore, ResponseType::Promise] {
                let r = Response { kind, amount: Some(money(2_000_000)) };
                let e = response_effectiveness(&r, &issue, &g);
                prop_assert!((0.0..=100.0).contains(&e));
            }
        }
    }
}
