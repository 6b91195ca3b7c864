//! Staff management, department budgets and policies.

use super::{apply_effects, gate, pay, require_positive, HandlerResult};
use crate::command::{AllocateDepartmentBudget, ChangeSalary, EmployeeRef, HireEmployee, ImplementPolicy};
use crate::error::CommandError;
use mayor_catalog::Catalog;
use mayor_core::{clamp_metric, ledger, AccountType, ActivePolicy, Employee, GameState, Position};
use mayor_econ::government::{
    can_implement_policy, promoted_salary, salary_change_mood_delta, FIRING_SATISFACTION_LOSS,
    PROMOTION_MOOD_GAIN, PROMOTION_WORKLOAD_GAIN,
};
use rust_decimal::Decimal;

/// Loyalty below which a fired employee is counted as a corruption incident.
const DISLOYAL_THRESHOLD: f32 = 50.0;

fn find_employee<'a>(state: &'a GameState, id: &str) -> Result<&'a Employee, CommandError> {
    state
        .government
        .employees
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| CommandError::not_found("employee", id))
}

pub fn hire_employee(state: &GameState, cmd: &HireEmployee, catalog: &Catalog) -> HandlerResult {
    let candidate = catalog
        .candidate(&cmd.candidate_id)
        .ok_or_else(|| CommandError::not_found("candidate", &cmd.candidate_id))?;
    let dept = state
        .government
        .departments
        .get(&cmd.department)
        .ok_or_else(|| CommandError::not_found("department", cmd.department.0.as_str()))?;
    if state.government.employees.iter().any(|e| e.id == candidate.id) {
        return Err(CommandError::Precondition(format!("{} is already employed", candidate.name)));
    }

    let becomes_head = candidate.position == Position::Head && dept.head.is_none();
    let mut next = state.clone();
    next.government.employees.push(Employee {
        id: candidate.id.clone(),
        name: candidate.name.clone(),
        department: cmd.department.clone(),
        position: candidate.position,
        competence: clamp_metric(candidate.competence),
        mood: clamp_metric(candidate.mood),
        workload: clamp_metric(candidate.workload),
        loyalty: clamp_metric(candidate.loyalty),
        experience_years: candidate.experience_years.max(0.0),
        salary: candidate.salary,
        months_since_promotion: 0,
    });
    if let Some(d) = next.government.departments.get_mut(&cmd.department) {
        d.payroll = ledger::adjust_budget(d.payroll, candidate.salary);
        if becomes_head {
            d.head = Some(candidate.id.clone());
        }
    }
    Ok(next)
}

/// One step up the ladder with a raise. Promotion to head requires a vacancy.
pub fn promote_employee(state: &GameState, cmd: &EmployeeRef) -> HandlerResult {
    let employee = find_employee(state, &cmd.employee_id)?;
    let position = employee
        .position
        .next()
        .ok_or_else(|| CommandError::Precondition(format!("{} is already at the top position", employee.name)))?;
    let dept = state.government.departments.get(&employee.department);
    if position == Position::Head && dept.is_some_and(|d| d.head.is_some()) {
        return Err(CommandError::Precondition(format!(
            "{} already has a head",
            employee.department
        )));
    }

    let raised = promoted_salary(employee.salary)
        .filter(|s| *s <= ledger::max_amount())
        .ok_or_else(|| CommandError::invalid("promoted salary overflows"))?;
    let delta = raised - employee.salary;
    let mut next = state.clone();
    if let Some(e) = next.government.employee_mut(&cmd.employee_id) {
        e.position = position;
        e.salary = raised;
        e.mood = clamp_metric(e.mood + PROMOTION_MOOD_GAIN);
        e.workload = clamp_metric(e.workload + PROMOTION_WORKLOAD_GAIN);
        e.months_since_promotion = 0;
    }
    if let Some(d) = next.government.departments.get_mut(&employee.department) {
        d.payroll = ledger::adjust_budget(d.payroll, delta);
        if position == Position::Head {
            d.head = Some(employee.id.clone());
        }
    }
    Ok(next)
}

pub fn fire_employee(state: &GameState, cmd: &EmployeeRef) -> HandlerResult {
    let employee = find_employee(state, &cmd.employee_id)?;
    let mut next = state.clone();
    next.government.employees.retain(|e| e.id != employee.id);
    if let Some(d) = next.government.departments.get_mut(&employee.department) {
        d.satisfaction = clamp_metric(d.satisfaction - FIRING_SATISFACTION_LOSS);
        d.payroll = ledger::adjust_budget(d.payroll, -employee.salary);
        if employee.loyalty < DISLOYAL_THRESHOLD {
            d.corruption_incidents += 1;
        }
        if d.head.as_deref() == Some(employee.id.as_str()) {
            d.head = None;
        }
    }
    Ok(next)
}

pub fn change_salary(state: &GameState, cmd: &ChangeSalary) -> HandlerResult {
    require_positive(cmd.salary, "salary")?;
    let employee = find_employee(state, &cmd.employee_id)?;
    if employee.salary == cmd.salary {
        return Err(CommandError::invalid("salary is unchanged"));
    }

    let mood_delta = salary_change_mood_delta(employee.salary, cmd.salary);
    let delta = cmd.salary - employee.salary;
    let payroll = match state.government.departments.get(&employee.department) {
        Some(d) => Some(
            d.payroll
                .checked_add(delta)
                .filter(|p| *p <= ledger::max_amount())
                .ok_or_else(|| CommandError::invalid("department payroll overflows"))?
                .max(Decimal::ZERO),
        ),
        None => None,
    };
    let mut next = state.clone();
    if let Some(e) = next.government.employee_mut(&cmd.employee_id) {
        e.salary = cmd.salary;
        e.mood = clamp_metric(e.mood + mood_delta);
    }
    if let (Some(d), Some(payroll)) = (next.government.departments.get_mut(&employee.department), payroll) {
        d.payroll = payroll;
    }
    Ok(next)
}

pub fn implement_policy(state: &GameState, cmd: &ImplementPolicy, catalog: &Catalog) -> HandlerResult {
    let policy = catalog
        .policy(&cmd.policy_id)
        .ok_or_else(|| CommandError::not_found("policy", &cmd.policy_id))?;
    if !state.government.departments.contains_key(&cmd.department) {
        return Err(CommandError::not_found("department", cmd.department.0.as_str()));
    }
    gate(
        can_implement_policy(policy, &cmd.department, state),
        &state.banking.accounts,
        AccountType::CityChecking,
        policy.cost,
    )?;

    let mut next = state.clone();
    pay(&mut next.banking.accounts, AccountType::CityChecking, policy.cost)?;
    let id = next.allocate_id("policy");
    next.government.active_policies.push(ActivePolicy {
        id,
        policy_id: policy.id.clone(),
        name: policy.name.clone(),
        department: cmd.department.clone(),
        remaining_duration: policy.duration_months,
        effects: policy.effects.clone(),
        implemented_on: state.date,
    });
    apply_effects(&mut next, &policy.effects, Some(&cmd.department));
    Ok(next)
}

pub fn allocate_department_budget(state: &GameState, cmd: &AllocateDepartmentBudget) -> HandlerResult {
    require_positive(cmd.amount, "allocation")?;
    if !state.government.departments.contains_key(&cmd.department) {
        return Err(CommandError::not_found("department", cmd.department.0.as_str()));
    }
    let mut next = state.clone();
    ledger::debit(&mut next.banking.accounts, AccountType::CityChecking, cmd.amount)?;
    if let Some(d) = next.government.departments.get_mut(&cmd.department) {
        d.budget = ledger::adjust_budget(d.budget, cmd.amount);
    }
    Ok(next)
}
