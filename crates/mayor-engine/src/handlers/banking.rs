//! Trading, transfers, loans and deposits.

use super::{require_positive, HandlerResult};
use crate::command::{CreateDeposit, RepayLoan, TakeLoan, TradeOrder, TransferFunds, WithdrawDeposit};
use crate::error::CommandError;
use mayor_catalog::Catalog;
use mayor_core::{ledger, BankTransaction, BankTxKind, Deposit, GameState, Holding, Loan, Money};
use mayor_econ::banking::{
    average_cost, check_deposit_amount, credit_rating, deposit_payout, maturity_date, monthly_payment,
};
use rust_decimal::Decimal;

/// Instrument name and order value of a well-formed order.
fn validate_order(order: &TradeOrder, state: &GameState, catalog: &Catalog) -> Result<(String, Money), CommandError> {
    if order.quantity == 0 {
        return Err(CommandError::invalid("quantity must be positive"));
    }
    require_positive(order.price, "price")?;
    let instrument = catalog
        .instrument(&order.instrument_id)
        .ok_or_else(|| CommandError::not_found("instrument", &order.instrument_id))?;
    if !state.banking.accounts.contains_key(&order.account) {
        return Err(CommandError::not_found("account", order.account.as_str()));
    }
    let value = order
        .price
        .checked_mul(Decimal::from(order.quantity))
        .filter(|v| *v <= ledger::max_amount())
        .ok_or_else(|| CommandError::invalid("order value overflows"))?;
    Ok((instrument.name.clone(), value))
}

pub fn buy_instrument(state: &GameState, order: &TradeOrder, catalog: &Catalog) -> HandlerResult {
    let (name, total) = validate_order(order, state, catalog)?;
    let existing = state
        .banking
        .portfolio
        .iter()
        .position(|h| h.instrument_id == order.instrument_id);
    let merged = match existing {
        Some(idx) => {
            let h = &state.banking.portfolio[idx];
            let quantity = h
                .quantity
                .checked_add(order.quantity)
                .ok_or_else(|| CommandError::invalid("holding size overflows"))?;
            let average_price = average_cost(h.quantity, h.average_price, order.quantity, order.price)
                .ok_or_else(|| CommandError::invalid("holding value overflows"))?;
            Some((idx, quantity, average_price))
        }
        None => None,
    };

    let mut next = state.clone();
    ledger::debit(&mut next.banking.accounts, order.account, total)?;
    let portfolio = &mut next.banking.portfolio;
    match merged {
        Some((idx, quantity, average_price)) => {
            portfolio[idx].quantity = quantity;
            portfolio[idx].average_price = average_price;
        }
        None => portfolio.push(Holding {
            instrument_id: order.instrument_id.clone(),
            quantity: order.quantity,
            average_price: order.price,
        }),
    }
    next.banking.history.push(BankTransaction {
        date: state.date,
        kind: BankTxKind::Buy,
        account: order.account,
        counterparty: None,
        amount: total,
        description: format!("bought {} x {name}", order.quantity),
    });
    Ok(next)
}

pub fn sell_instrument(state: &GameState, order: &TradeOrder, catalog: &Catalog) -> HandlerResult {
    let (name, proceeds) = validate_order(order, state, catalog)?;
    let idx = state
        .banking
        .portfolio
        .iter()
        .position(|h| h.instrument_id == order.instrument_id)
        .ok_or_else(|| CommandError::not_found("holding", &order.instrument_id))?;
    let held = state.banking.portfolio[idx].quantity;
    if held < order.quantity {
        return Err(CommandError::Precondition(format!(
            "insufficient holding of {name}: have {held}, requested {}",
            order.quantity
        )));
    }

    let mut next = state.clone();
    ledger::credit(&mut next.banking.accounts, order.account, proceeds);
    if held == order.quantity {
        next.banking.portfolio.remove(idx);
    } else {
        next.banking.portfolio[idx].quantity -= order.quantity;
    }
    next.banking.history.push(BankTransaction {
        date: state.date,
        kind: BankTxKind::Sell,
        account: order.account,
        counterparty: None,
        amount: proceeds,
        description: format!("sold {} x {name}", order.quantity),
    });
    Ok(next)
}

pub fn transfer_funds(state: &GameState, cmd: &TransferFunds) -> HandlerResult {
    let mut next = state.clone();
    ledger::transfer(&mut next.banking.accounts, cmd.from, cmd.to, cmd.amount)?;
    next.banking.history.push(BankTransaction {
        date: state.date,
        kind: BankTxKind::Transfer,
        account: cmd.from,
        counterparty: Some(cmd.to),
        amount: cmd.amount,
        description: format!("transfer {} -> {}", cmd.from, cmd.to),
    });
    Ok(next)
}

pub fn take_loan(state: &GameState, cmd: &TakeLoan, catalog: &Catalog) -> HandlerResult {
    let offer = catalog
        .loan_offer(&cmd.offer_id)
        .ok_or_else(|| CommandError::not_found("loan offer", &cmd.offer_id))?;
    let rating = credit_rating(state);
    if rating < offer.min_credit_rating {
        return Err(CommandError::Precondition(format!(
            "{} requires a credit rating of {}, current rating is {rating}",
            offer.name, offer.min_credit_rating
        )));
    }

    let account = offer.payout_account();
    let mut next = state.clone();
    let id = next.allocate_id("loan");
    ledger::credit(&mut next.banking.accounts, account, offer.amount);
    next.banking.loans.push(Loan {
        id: id.clone(),
        offer_id: offer.id.clone(),
        category: offer.category,
        account,
        principal: offer.amount,
        remaining_amount: offer.amount,
        remaining_months: offer.term_months,
        monthly_payment: monthly_payment(offer.amount, offer.annual_rate, offer.term_months),
        annual_rate: offer.annual_rate,
        taken_on: state.date,
    });
    next.banking.history.push(BankTransaction {
        date: state.date,
        kind: BankTxKind::LoanTaken,
        account,
        counterparty: None,
        amount: offer.amount,
        description: format!("{} ({id})", offer.name),
    });
    Ok(next)
}

/// Repay part or all of a loan from the account its proceeds landed in.
/// Overpayment is capped at the remaining amount.
pub fn repay_loan(state: &GameState, cmd: &RepayLoan) -> HandlerResult {
    require_positive(cmd.amount, "repayment")?;
    let idx = state
        .banking
        .loans
        .iter()
        .position(|l| l.id == cmd.loan_id)
        .ok_or_else(|| CommandError::not_found("loan", &cmd.loan_id))?;
    let loan = &state.banking.loans[idx];
    let paid = cmd.amount.min(loan.remaining_amount);

    let mut next = state.clone();
    ledger::debit(&mut next.banking.accounts, loan.account, paid)?;
    let remaining = loan.remaining_amount - paid;
    if remaining <= Decimal::ZERO {
        next.banking.loans.remove(idx);
    } else {
        let l = &mut next.banking.loans[idx];
        l.remaining_amount = remaining;
        l.monthly_payment = monthly_payment(remaining, l.annual_rate, l.remaining_months);
    }
    next.banking.history.push(BankTransaction {
        date: state.date,
        kind: BankTxKind::LoanRepaid,
        account: loan.account,
        counterparty: None,
        amount: paid,
        description: format!("repaid {}", loan.id),
    });
    Ok(next)
}

pub fn create_deposit(state: &GameState, cmd: &CreateDeposit, catalog: &Catalog) -> HandlerResult {
    require_positive(cmd.amount, "deposit amount")?;
    let offer = catalog
        .deposit_offer(&cmd.offer_id)
        .ok_or_else(|| CommandError::not_found("deposit offer", &cmd.offer_id))?;
    let bounds = check_deposit_amount(offer, cmd.amount);
    if !bounds.allowed {
        return Err(CommandError::Precondition(bounds.reason.unwrap_or_default()));
    }

    let account = offer.funding_account();
    let mut next = state.clone();
    ledger::debit(&mut next.banking.accounts, account, cmd.amount)?;
    let id = next.allocate_id("deposit");
    next.banking.deposits.push(Deposit {
        id: id.clone(),
        offer_id: offer.id.clone(),
        account,
        amount: cmd.amount,
        annual_rate: offer.annual_rate,
        term_months: offer.term_months,
        opened_on: state.date,
        matures_on: maturity_date(state.date, offer.term_months),
    });
    next.banking.history.push(BankTransaction {
        date: state.date,
        kind: BankTxKind::DepositOpened,
        account,
        counterparty: None,
        amount: cmd.amount,
        description: format!("{} ({id})", offer.name),
    });
    Ok(next)
}

pub fn withdraw_deposit(state: &GameState, cmd: &WithdrawDeposit) -> HandlerResult {
    let idx = state
        .banking
        .deposits
        .iter()
        .position(|d| d.id == cmd.deposit_id)
        .ok_or_else(|| CommandError::not_found("deposit", &cmd.deposit_id))?;
    let deposit = &state.banking.deposits[idx];
    let payout = deposit_payout(deposit, state.date);

    let mut next = state.clone();
    ledger::credit(&mut next.banking.accounts, deposit.account, payout);
    next.banking.deposits.remove(idx);
    next.banking.history.push(BankTransaction {
        date: state.date,
        kind: BankTxKind::DepositWithdrawn,
        account: deposit.account,
        counterparty: None,
        amount: payout,
        description: if state.date < deposit.matures_on {
            format!("early withdrawal of {}", deposit.id)
        } else {
            format!("matured {}", deposit.id)
        },
    });
    Ok(next)
}
