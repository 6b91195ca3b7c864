//! Government staff and policy resolvers.

use crate::Eligibility;
use mayor_catalog::PolicyTemplate;
use mayor_core::{clamp_metric, AccountType, DepartmentId, Employee, GameState, Money};
use rust_decimal::Decimal;

/// Salary raise on promotion, in percent.
pub const PROMOTION_RAISE_PCT: i64 = 20;
/// Mood gained on promotion.
pub const PROMOTION_MOOD_GAIN: f32 = 10.0;
/// Extra workload a promotion brings.
pub const PROMOTION_WORKLOAD_GAIN: f32 = 5.0;
/// Department satisfaction lost when a colleague is fired.
pub const FIRING_SATISFACTION_LOSS: f32 = 5.0;

/// Department efficiency in `[0, 100]`.
///
/// 40% average competence, 30% average mood, 30% inverse average workload,
/// plus an experience bonus of one point per average year, capped at 10.
/// An empty department scores 0.
pub fn department_efficiency<'a>(employees: impl IntoIterator<Item = &'a Employee>) -> f32 {
    let mut n = 0usize;
    let (mut competence, mut mood, mut workload, mut experience) = (0.0f32, 0.0f32, 0.0f32, 0.0f32);
    for e in employees {
        n += 1;
        competence += e.competence;
        mood += e.mood;
        workload += e.workload;
        experience += e.experience_years;
    }
    if n == 0 {
        return 0.0;
    }
    let n = n as f32;
    let base = 0.4 * (competence / n) + 0.3 * (mood / n) + 0.3 * (100.0 - workload / n);
    let bonus = (experience / n).clamp(0.0, 10.0);
    clamp_metric(base + bonus)
}

/// Likelihood (0..=100) that an employee resigns.
pub fn resignation_risk(e: &Employee) -> f32 {
    let mut risk = 0.0;
    if e.mood < 50.0 {
        risk += 30.0;
    } else if e.mood < 70.0 {
        risk += 15.0;
    }
    if e.workload > 90.0 {
        risk += 20.0;
    } else if e.workload > 80.0 {
        risk += 10.0;
    }
    if e.loyalty < 50.0 {
        risk += 25.0;
    } else if e.loyalty < 70.0 {
        risk += 10.0;
    }
    if e.months_since_promotion > 36 {
        risk += 15.0;
    }
    clamp_metric(risk)
}

/// Salary after a promotion raise; `None` if the raise overflows.
pub fn promoted_salary(salary: Money) -> Option<Money> {
    salary
        .checked_mul(Decimal::new(100 + PROMOTION_RAISE_PCT, 2))
        .map(|s| s.round_dp(2))
}

/// Mood shift caused by a salary change: raises cheer, cuts hurt more.
pub fn salary_change_mood_delta(old: Money, new: Money) -> f32 {
    match new.cmp(&old) {
        std::cmp::Ordering::Greater => 10.0,
        std::cmp::Ordering::Less => -15.0,
        std::cmp::Ordering::Equal => 0.0,
    }
}

/// Whether `policy` can be run by `department` right now.
///
/// Checks, in order: the department exists, it is the policy's designated
/// department (if any), it has a head, the policy is not already active, the
/// department is efficient enough, and the city can pay.
pub fn can_implement_policy(policy: &PolicyTemplate, department: &DepartmentId, state: &GameState) -> Eligibility {
    let Some(dept) = state.government.departments.get(department) else {
        return Eligibility::denied(format!("unknown department {department}"));
    };
    if let Some(required) = &policy.department {
        if required != department {
            return Eligibility::denied(format!("{} must be implemented by {required}", policy.name));
        }
    }
    if dept.head.is_none() {
        return Eligibility::denied(format!("{} has no head", dept.name));
    }
    if state
        .government
        .active_policies
        .iter()
        .any(|p| p.policy_id == policy.id)
    {
        return Eligibility::denied(format!("{} is already active", policy.name));
    }
    if dept.efficiency < policy.min_efficiency {
        return Eligibility::denied(format!(
            "{} efficiency {:.0} is below the required {:.0}",
            dept.name, dept.efficiency, policy.min_efficiency
        ));
    }
    if state.balance(AccountType::CityChecking) < policy.cost {
        return Eligibility::denied("insufficient city funds");
    }
    Eligibility::allowed()
}
