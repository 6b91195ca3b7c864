//! The closed command vocabulary.
//!
//! On the wire a command is an internally tagged JSON object:
//! `{"type": "take_loan", "offer_id": "personal_quick"}`. Tags the engine
//! does not know deserialize to [`Command::Unknown`] and dispatch as a no-op.

use mayor_core::{AccountType, DepartmentId, Money, ResponseType, TaxKind};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // banking
    BuyInstrument(TradeOrder),
    SellInstrument(TradeOrder),
    TransferFunds(TransferFunds),
    TakeLoan(TakeLoan),
    RepayLoan(RepayLoan),
    CreateDeposit(CreateDeposit),
    WithdrawDeposit(WithdrawDeposit),
    // government
    HireEmployee(HireEmployee),
    PromoteEmployee(EmployeeRef),
    FireEmployee(EmployeeRef),
    ChangeSalary(ChangeSalary),
    ImplementPolicy(ImplementPolicy),
    AllocateDepartmentBudget(AllocateDepartmentBudget),
    // taxation
    ImplementTaxPolicy(ImplementTaxPolicy),
    SetTaxRate(SetTaxRate),
    // industry
    MakeInvestment(MakeInvestment),
    WithdrawInvestment(WithdrawInvestment),
    ImplementIndustrialProject(StartProject),
    // construction
    StartConstruction(StartProject),
    // security
    ExecuteSecurityOperation(ExecuteSecurityOperation),
    MitigateThreat(MitigateThreat),
    // citizens
    RespondToIssue(RespondToIssue),
    // personal spending
    MakePurchase(MakePurchase),
    CancelRecurringExpense(CancelRecurringExpense),
    SellAsset(SellAsset),
    // housekeeping
    ClearError,
    SetPaused(SetPaused),
    SetSpeed(SetSpeed),
    #[serde(other)]
    Unknown,
}

impl Command {
    /// Wire tag of the command, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::BuyInstrument(_) => "buy_instrument",
            Command::SellInstrument(_) => "sell_instrument",
            Command::TransferFunds(_) => "transfer_funds",
            Command::TakeLoan(_) => "take_loan",
            Command::RepayLoan(_) => "repay_loan",
            Command::CreateDeposit(_) => "create_deposit",
            Command::WithdrawDeposit(_) => "withdraw_deposit",
            Command::HireEmployee(_) => "hire_employee",
            Command::PromoteEmployee(_) => "promote_employee",
            Command::FireEmployee(_) => "fire_employee",
            Command::ChangeSalary(_) => "change_salary",
            Command::ImplementPolicy(_) => "implement_policy",
            Command::AllocateDepartmentBudget(_) => "allocate_department_budget",
            Command::ImplementTaxPolicy(_) => "implement_tax_policy",
            Command::SetTaxRate(_) => "set_tax_rate",
            Command::MakeInvestment(_) => "make_investment",
            Command::WithdrawInvestment(_) => "withdraw_investment",
            Command::ImplementIndustrialProject(_) => "implement_industrial_project",
            Command::StartConstruction(_) => "start_construction",
            Command::ExecuteSecurityOperation(_) => "execute_security_operation",
            Command::MitigateThreat(_) => "mitigate_threat",
            Command::RespondToIssue(_) => "respond_to_issue",
            Command::MakePurchase(_) => "make_purchase",
            Command::CancelRecurringExpense(_) => "cancel_recurring_expense",
            Command::SellAsset(_) => "sell_asset",
            Command::ClearError => "clear_error",
            Command::SetPaused(_) => "set_paused",
            Command::SetSpeed(_) => "set_speed",
            Command::Unknown => "unknown",
        }
    }
}

/// Buy or sell `quantity` units of an instrument at `price` per unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub instrument_id: String,
    pub quantity: u32,
    pub price: Money,
    pub account: AccountType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferFunds {
    pub from: AccountType,
    pub to: AccountType,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TakeLoan {
    pub offer_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepayLoan {
    pub loan_id: String,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateDeposit {
    pub offer_id: String,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WithdrawDeposit {
    pub deposit_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HireEmployee {
    pub candidate_id: String,
    pub department: DepartmentId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRef {
    pub employee_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeSalary {
    pub employee_id: String,
    pub salary: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImplementPolicy {
    pub policy_id: String,
    pub department: DepartmentId,
}

/// Move money from city checking into a department's budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocateDepartmentBudget {
    pub department: DepartmentId,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImplementTaxPolicy {
    pub policy_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetTaxRate {
    pub tax: TaxKind,
    pub rate: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MakeInvestment {
    pub investment_id: String,
}

/// `investment_id` is the id of the active investment, not the template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WithdrawInvestment {
    pub investment_id: String,
}

/// Start an industrial or construction project with optional kickbacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartProject {
    pub project_id: String,
    #[serde(default)]
    pub kickback_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecuteSecurityOperation {
    pub operation_id: String,
    pub agency_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MitigateThreat {
    pub threat_id: String,
    pub option_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RespondToIssue {
    pub issue_id: String,
    pub response: ResponseType,
    /// Required for funding responses, ignored otherwise.
    #[serde(default)]
    pub amount: Option<Money>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MakePurchase {
    pub option_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CancelRecurringExpense {
    pub expense_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SellAsset {
    pub asset_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetPaused {
    pub paused: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetSpeed {
    pub speed: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn parses_tagged_json() {
        let c: Command = serde_json::from_str(r#"{"type": "take_loan", "offer_id": "personal_quick"}"#).unwrap();
        assert_eq!(
            c,
            Command::TakeLoan(TakeLoan {
                offer_id: "personal_quick".into()
            })
        );
        let c: Command = serde_json::from_str(
            r#"{"type": "transfer_funds", "from": "city_checking", "to": "city_savings", "amount": "1500.50"}"#,
        )
        .unwrap();
        match c {
            Command::TransferFunds(t) => assert_eq!(t.amount, Decimal::new(150_050, 2)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn numeric_amounts_are_accepted() {
        let c: Command =
            serde_json::from_str(r#"{"type": "create_deposit", "offer_id": "savings_plus", "amount": 250000}"#).unwrap();
        assert_eq!(c.name(), "create_deposit");
    }

    #[test]
    fn unknown_type_is_a_distinct_variant() {
        let c: Command = serde_json::from_str(r#"{"type": "launch_rocket", "payload": 1}"#).unwrap();
        assert_eq!(c, Command::Unknown);
    }

    #[test]
    fn unit_and_defaulted_payloads() {
        let c: Command = serde_json::from_str(r#"{"type": "clear_error"}"#).unwrap();
        assert_eq!(c, Command::ClearError);
        let c: Command = serde_json::from_str(r#"{"type": "start_construction", "project_id": "ring_road"}"#).unwrap();
        match c {
            Command::StartConstruction(p) => assert!(p.kickback_ids.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn name_matches_wire_tag() {
        let c = Command::SetSpeed(SetSpeed { speed: 2 });
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["type"], c.name());
    }
}
