//! The simulation state tree: one struct per subsystem plus city-wide metrics.
//!
//! All subsystem structs carry `#[serde(default)]` so a save written before a
//! field existed still deserializes.

use crate::domain::*;
use crate::history::BoundedLog;
use crate::ledger::{balance_of, AccountType, Accounts};
use crate::{
    Money, BANKING_HISTORY_CAP, INDUSTRY_HISTORY_CAP, PERSONAL_HISTORY_CAP, RESOLVED_ISSUES_CAP,
    SECURITY_HISTORY_CAP,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of the simulation state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub finance: FinanceState,
    pub banking: BankingState,
    pub government: GovernmentState,
    pub industry: IndustryState,
    pub security: SecurityState,
    pub citizens: CitizensState,
    pub taxation: TaxationState,
    pub construction: ConstructionState,
    pub personal_spending: PersonalSpendingState,

    pub mayor_rating: f32,
    pub happiness: f32,
    pub infrastructure: f32,
    pub ecology: f32,
    pub unemployment: f32,
    /// Mirror of `finance.city_budget.total`.
    pub budget: Money,
    /// `None` after a successful command, the rejection cause otherwise.
    pub error_message: Option<String>,

    pub paused: bool,
    pub speed: u8,
    pub date: NaiveDate,
    /// Source of deterministic ids for new active instances.
    pub next_entity_id: u64,
}

impl GameState {
    /// Allocate a fresh `"<prefix>-<n>"` id.
    pub fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_entity_id += 1;
        format!("{prefix}-{}", self.next_entity_id)
    }

    pub fn balance(&self, account: AccountType) -> Money {
        balance_of(&self.banking.accounts, account)
    }

    /// Named bounded metrics in `[0, 100]` (the mayor rating is checked
    /// separately against its own range).
    pub fn global_metrics(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("happiness", self.happiness),
            ("infrastructure", self.infrastructure),
            ("ecology", self.ecology),
            ("unemployment", self.unemployment),
            ("citizens.overall_satisfaction", self.citizens.overall_satisfaction),
            ("finance.corruption_risk", self.finance.risks.corruption_risk),
            ("finance.investigation_risk", self.finance.risks.investigation_risk),
            ("finance.audit_risk", self.finance.risks.audit_risk),
            ("government.corruption_risk", self.government.corruption_risk),
            ("security.investigation_risk", self.security.investigation_risk),
            ("security.protection_level", self.security.protection_level),
            ("construction.infrastructure_quality", self.construction.infrastructure_quality),
            ("construction.coverage", self.construction.coverage),
            ("taxation.collection_efficiency", self.taxation.collection_efficiency),
            ("taxation.evasion_rate", self.taxation.evasion_rate),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceState {
    pub city_budget: CityBudget,
    pub personal_finances: PersonalFinances,
    pub risks: FinanceRisks,
}

/// City-side view derived from the city-family accounts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityBudget {
    pub total: Money,
    /// Sum of all department budgets.
    pub departments: Money,
}

/// Personal-side view derived from the personal-family accounts and assets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalFinances {
    pub checking: Money,
    pub savings: Money,
    pub offshore: Money,
    pub assets: Money,
    pub total_wealth: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceRisks {
    pub corruption_risk: f32,
    pub investigation_risk: f32,
    pub audit_risk: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankingState {
    pub accounts: Accounts,
    pub portfolio: Vec<Holding>,
    pub loans: Vec<Loan>,
    pub deposits: Vec<Deposit>,
    pub history: BoundedLog<BankTransaction, BANKING_HISTORY_CAP>,
    /// Count of missed loan payments, maintained by the tick driver.
    pub missed_payments: u32,
}

/// Position in a tradable instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub instrument_id: String,
    pub quantity: u32,
    /// Weighted average purchase price per unit.
    pub average_price: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub offer_id: String,
    pub category: LoanCategory,
    /// Account the proceeds landed in and repayments come from.
    pub account: AccountType,
    pub principal: Money,
    pub remaining_amount: Money,
    pub remaining_months: u32,
    pub monthly_payment: Money,
    pub annual_rate: f32,
    pub taken_on: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: String,
    pub offer_id: String,
    /// Funding account; the payout returns here.
    pub account: AccountType,
    pub amount: Money,
    pub annual_rate: f32,
    pub term_months: u32,
    pub opened_on: NaiveDate,
    pub matures_on: NaiveDate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTxKind {
    Buy,
    Sell,
    Transfer,
    LoanTaken,
    LoanRepaid,
    DepositOpened,
    DepositWithdrawn,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub date: NaiveDate,
    pub kind: BankTxKind,
    pub account: AccountType,
    pub counterparty: Option<AccountType>,
    pub amount: Money,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernmentState {
    pub departments: BTreeMap<DepartmentId, Department>,
    pub employees: Vec<Employee>,
    pub active_policies: Vec<ActivePolicy>,
    pub corruption_risk: f32,
}

impl GovernmentState {
    pub fn employees_of<'a>(&'a self, dept: &'a DepartmentId) -> impl Iterator<Item = &'a Employee> + 'a {
        self.employees.iter().filter(move |e| &e.department == dept)
    }

    pub fn employee_mut(&mut self, id: &str) -> Option<&mut Employee> {
        self.employees.iter_mut().find(|e| e.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub budget: Money,
    /// Monthly payroll expense line.
    pub payroll: Money,
    pub satisfaction: f32,
    pub efficiency: f32,
    pub corruption_incidents: u32,
    /// Employee id of the department head.
    pub head: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub department: DepartmentId,
    pub position: Position,
    pub competence: f32,
    pub mood: f32,
    pub workload: f32,
    pub loyalty: f32,
    pub experience_years: f32,
    /// Monthly salary.
    pub salary: Money,
    pub months_since_promotion: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivePolicy {
    pub id: String,
    pub policy_id: String,
    pub name: String,
    pub department: DepartmentId,
    /// Months left; decremented by the tick driver.
    pub remaining_duration: u32,
    pub effects: MetricEffects,
    pub implemented_on: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndustryState {
    pub active_investments: Vec<ActiveInvestment>,
    pub active_projects: Vec<ActiveIndustrialProject>,
    pub history: BoundedLog<IndustryTransaction, INDUSTRY_HISTORY_CAP>,
    pub total_invested: Money,
    /// Realized profit across all withdrawals; may be negative.
    pub total_profit: Money,
    pub jobs_created: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveInvestment {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub principal: Money,
    pub annual_return: f32,
    pub duration_months: u32,
    /// Advanced by the tick driver.
    pub months_elapsed: u32,
    pub started_on: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveIndustrialProject {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub base_cost: Money,
    pub kickback_total: Money,
    pub kickback_ids: Vec<String>,
    pub progress: f32,
    pub remaining_months: u32,
    pub jobs: u32,
    pub started_on: NaiveDate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryTxKind {
    Investment,
    Withdrawal,
    Project,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndustryTransaction {
    pub date: NaiveDate,
    pub kind: IndustryTxKind,
    pub reference: String,
    pub amount: Money,
    pub profit: Option<Money>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionState {
    pub active_projects: Vec<ActiveConstruction>,
    pub infrastructure_quality: f32,
    pub coverage: f32,
    pub total_spent: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveConstruction {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub category: String,
    pub base_cost: Money,
    pub kickback_total: Money,
    pub kickback_ids: Vec<String>,
    /// Build quality after kickback penalties.
    pub quality: f32,
    pub progress: f32,
    pub remaining_months: u32,
    pub started_on: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxationState {
    /// Rate per tax line, in percent.
    pub rates: BTreeMap<TaxKind, f32>,
    pub active_policies: Vec<ActiveTaxPolicy>,
    pub collection_efficiency: f32,
    pub evasion_rate: f32,
    /// Taxable base per line, in money per month per percentage point.
    pub base: BTreeMap<TaxKind, Money>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveTaxPolicy {
    pub id: String,
    pub policy_id: String,
    pub name: String,
    pub tax: TaxKind,
    pub rate_change: f32,
    pub remaining_duration: u32,
    pub effects: MetricEffects,
    pub implemented_on: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityState {
    pub agencies: Vec<Agency>,
    pub threats: Vec<Threat>,
    pub history: BoundedLog<SecurityRecord, SECURITY_HISTORY_CAP>,
    pub investigation_risk: f32,
    pub protection_level: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub id: String,
    pub name: String,
    pub influence: InfluenceLevel,
    pub suspicion: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    pub id: String,
    pub name: String,
    pub agency_id: Option<String>,
    pub severity: f32,
    pub mitigation_options: Vec<MitigationOption>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MitigationOption {
    pub id: String,
    pub name: String,
    pub cost: Money,
    pub success_rate: f32,
    /// Bribery-class mitigations are paid from the personal account.
    #[serde(default)]
    pub personal_funds: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityActionKind {
    Operation,
    Mitigation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecurityRecord {
    pub date: NaiveDate,
    pub kind: SecurityActionKind,
    pub reference: String,
    pub agency_id: Option<String>,
    pub account: AccountType,
    pub cost: Money,
    pub success_probability: f32,
    pub success: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitizensState {
    pub groups: Vec<CitizenGroup>,
    pub active_issues: Vec<Issue>,
    pub resolved_issues: BoundedLog<ResolvedIssue, RESOLVED_ISSUES_CAP>,
    pub overall_satisfaction: f32,
    /// Unbounded protest potential aggregate (>= 0).
    pub protest_risk: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CitizenGroup {
    pub id: String,
    pub name: String,
    pub population: u32,
    pub influence: f32,
    pub satisfaction: f32,
    pub loyalty: f32,
    pub education_level: f32,
    pub protest_potential: f32,
    #[serde(default)]
    pub promises_made: u32,
    /// Promises delivered on, maintained by the tick driver.
    #[serde(default)]
    pub promises_kept: u32,
}

impl CitizenGroup {
    /// Share of promises kept; 1.0 when none were made.
    pub fn promise_fulfillment_rate(&self) -> f32 {
        if self.promises_made == 0 {
            return 1.0;
        }
        (self.promises_kept as f32 / self.promises_made as f32).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub group_id: String,
    pub urgency: Urgency,
    pub cost: Money,
    pub expected_responses: Vec<ResponseType>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIssue {
    pub issue: Issue,
    pub response: ResponseType,
    pub amount: Option<Money>,
    pub effectiveness: f32,
    pub satisfaction_change: i32,
    pub resolved_on: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalSpendingState {
    pub history: BoundedLog<PurchaseRecord, PERSONAL_HISTORY_CAP>,
    pub recurring_expenses: Vec<RecurringExpense>,
    pub assets: Vec<Asset>,
    pub total_spent: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub date: NaiveDate,
    pub option_id: String,
    pub name: String,
    pub kind: SpendingKind,
    pub cost: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: String,
    pub option_id: String,
    pub name: String,
    pub monthly_cost: Money,
    pub started_on: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub option_id: String,
    pub name: String,
    pub purchase_price: Money,
    /// Revalued by the tick driver using `appreciation_rate`.
    pub current_value: Money,
    /// Annual appreciation captured at purchase time.
    pub appreciation_rate: f32,
    pub purchased_on: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn allocate_id_is_monotonic() {
        let mut s = GameState::default();
        assert_eq!(s.allocate_id("loan"), "loan-1");
        assert_eq!(s.allocate_id("deposit"), "deposit-2");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: GameState = serde_json::from_str(r#"{"mayor_rating": 55.0, "banking": {"missed_payments": 2}}"#).unwrap();
        assert_eq!(s.mayor_rating, 55.0);
        assert_eq!(s.banking.missed_payments, 2);
        assert!(s.banking.loans.is_empty());
        assert_eq!(s.budget, Decimal::ZERO);
    }

    #[test]
    fn fulfillment_rate_defaults_to_one() {
        let mut g = CitizenGroup {
            id: "g".into(),
            name: "G".into(),
            population: 1000,
            influence: 50.0,
            satisfaction: 50.0,
            loyalty: 50.0,
            education_level: 50.0,
            protest_potential: 10.0,
            promises_made: 0,
            promises_kept: 0,
        };
        assert_eq!(g.promise_fulfillment_rate(), 1.0);
        g.promises_made = 4;
        g.promises_kept = 1;
        assert_eq!(g.promise_fulfillment_rate(), 0.25);
    }
}
