//! Ledger primitives: the only code that changes an account balance.
//!
//! Handlers work on their own copy of the state, so these helpers take the
//! account map by `&mut`. Two call shapes exist:
//! - pre-validated debits ([`debit`], [`transfer`]) fail before touching any
//!   balance when funds are short;
//! - always-safe adjustments ([`credit_debit`], [`credit`]) saturate at zero
//!   and at [`max_amount`].

use crate::state::{CityBudget, PersonalFinances};
use crate::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Largest amount, in whole units, one balance or one payload may carry.
pub const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000_000_000;

/// [`MAX_AMOUNT_UNITS`] as money.
pub fn max_amount() -> Money {
    Decimal::new(MAX_AMOUNT_UNITS, 0)
}

/// Every account known to the banking subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    CityChecking,
    CitySavings,
    PersonalChecking,
    PersonalSavings,
    Offshore,
}

/// Which side of the books an account belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccountFamily {
    City,
    Personal,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::CityChecking,
        AccountType::CitySavings,
        AccountType::PersonalChecking,
        AccountType::PersonalSavings,
        AccountType::Offshore,
    ];

    pub fn family(self) -> AccountFamily {
        match self {
            AccountType::CityChecking | AccountType::CitySavings => AccountFamily::City,
            AccountType::PersonalChecking | AccountType::PersonalSavings | AccountType::Offshore => {
                AccountFamily::Personal
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::CityChecking => "city_checking",
            AccountType::CitySavings => "city_savings",
            AccountType::PersonalChecking => "personal_checking",
            AccountType::PersonalSavings => "personal_savings",
            AccountType::Offshore => "offshore",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single money store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub balance: Money,
}

/// All accounts, keyed by type. Created once for every [`AccountType`].
pub type Accounts = BTreeMap<AccountType, Account>;

/// Failures of the pre-validated ledger operations.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Money),
    #[error("insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: AccountType,
        required: Money,
        available: Money,
    },
    #[error("source and destination are both {0}")]
    SameAccount(AccountType),
}

/// Accounts map with one zero-balance entry per account type.
pub fn open_accounts() -> Accounts {
    AccountType::ALL
        .iter()
        .map(|k| (*k, Account::default()))
        .collect()
}

/// Balance of `account`; a missing account reads as zero.
pub fn balance_of(accounts: &Accounts, account: AccountType) -> Money {
    accounts
        .get(&account)
        .map(|a| a.balance)
        .unwrap_or(Decimal::ZERO)
}

/// Check that `account` can cover a debit of `amount`.
pub fn ensure_funds(accounts: &Accounts, account: AccountType, amount: Money) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    let available = balance_of(accounts, account);
    if available < amount {
        return Err(LedgerError::InsufficientFunds {
            account,
            required: amount,
            available,
        });
    }
    Ok(())
}

/// Add a signed `delta` to `account`, clamping the result at zero.
/// Returns the new balance.
pub fn credit_debit(accounts: &mut Accounts, account: AccountType, delta: Money) -> Money {
    let entry = accounts.entry(account).or_default();
    entry.balance = entry.balance.saturating_add(delta).clamp(Decimal::ZERO, max_amount());
    entry.balance
}

/// Always-safe credit of a non-negative amount.
pub fn credit(accounts: &mut Accounts, account: AccountType, amount: Money) -> Money {
    credit_debit(accounts, account, amount.max(Decimal::ZERO))
}

/// Pre-validated debit: fails without touching the balance when short.
pub fn debit(accounts: &mut Accounts, account: AccountType, amount: Money) -> Result<Money, LedgerError> {
    ensure_funds(accounts, account, amount)?;
    Ok(credit_debit(accounts, account, -amount))
}

/// Move `amount` between two distinct accounts; all-or-nothing.
pub fn transfer(
    accounts: &mut Accounts,
    from: AccountType,
    to: AccountType,
    amount: Money,
) -> Result<(), LedgerError> {
    if from == to {
        return Err(LedgerError::SameAccount(from));
    }
    ensure_funds(accounts, from, amount)?;
    credit_debit(accounts, from, -amount);
    credit_debit(accounts, to, amount);
    Ok(())
}

/// Saturating adjustment of an aggregate such as a department budget.
pub fn adjust_budget(budget: Money, delta: Money) -> Money {
    budget.saturating_add(delta).clamp(Decimal::ZERO, max_amount())
}

/// Project the banking accounts onto the finance views.
///
/// City-family accounts sum into the city budget, personal-family accounts
/// into personal finances. `department_budgets` and `asset_value` come from
/// the government and personal-spending subsystems.
pub fn project_finances(
    accounts: &Accounts,
    department_budgets: Money,
    asset_value: Money,
) -> (CityBudget, PersonalFinances) {
    let mut city_total = Decimal::ZERO;
    for (kind, account) in accounts {
        if kind.family() == AccountFamily::City {
            city_total += account.balance;
        }
    }
    let checking = balance_of(accounts, AccountType::PersonalChecking);
    let savings = balance_of(accounts, AccountType::PersonalSavings);
    let offshore = balance_of(accounts, AccountType::Offshore);
    let city = CityBudget {
        total: city_total,
        departments: department_budgets,
    };
    let personal = PersonalFinances {
        checking,
        savings,
        offshore,
        assets: asset_value,
        total_wealth: checking + savings + offshore + asset_value,
    };
    (city, personal)
}
