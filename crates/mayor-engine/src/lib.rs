#![deny(warnings)]

//! Transaction engine for the city-mayor simulation.
//!
//! [`dispatch`] is the single mutation entry point: it routes a [`Command`]
//! to its handler, refreshes derived metrics on success and validates the
//! result. A rejected command returns the input state unchanged apart from
//! `error_message`. Loading a save goes through [`load::merge`].

use mayor_catalog::Catalog;
use mayor_core::{validate_state, GameState, SimConfig};
use mayor_econ::{RandomSource, SeededRandom};
use tracing::{debug, warn};

pub mod command;
pub mod error;
pub mod handlers;
pub mod init;
pub mod load;
pub mod recompute;

pub use command::Command;
pub use error::{CommandError, ErrorKind};
pub use init::default_state;
pub use load::{merge, LoadError};

use handlers::{banking, citizens, construction, government, industry, misc, personal, security, taxation};

fn route(
    state: &GameState,
    command: &Command,
    catalog: &Catalog,
    rng: &mut dyn RandomSource,
) -> handlers::HandlerResult {
    match command {
        Command::BuyInstrument(c) => banking::buy_instrument(state, c, catalog),
        Command::SellInstrument(c) => banking::sell_instrument(state, c, catalog),
        Command::TransferFunds(c) => banking::transfer_funds(state, c),
        Command::TakeLoan(c) => banking::take_loan(state, c, catalog),
        Command::RepayLoan(c) => banking::repay_loan(state, c),
        Command::CreateDeposit(c) => banking::create_deposit(state, c, catalog),
        Command::WithdrawDeposit(c) => banking::withdraw_deposit(state, c),
        Command::HireEmployee(c) => government::hire_employee(state, c, catalog),
        Command::PromoteEmployee(c) => government::promote_employee(state, c),
        Command::FireEmployee(c) => government::fire_employee(state, c),
        Command::ChangeSalary(c) => government::change_salary(state, c),
        Command::ImplementPolicy(c) => government::implement_policy(state, c, catalog),
        Command::AllocateDepartmentBudget(c) => government::allocate_department_budget(state, c),
        Command::ImplementTaxPolicy(c) => taxation::implement_tax_policy(state, c, catalog),
        Command::SetTaxRate(c) => taxation::set_tax_rate(state, c),
        Command::MakeInvestment(c) => industry::make_investment(state, c, catalog),
        Command::WithdrawInvestment(c) => industry::withdraw_investment(state, c),
        Command::ImplementIndustrialProject(c) => industry::implement_industrial_project(state, c, catalog),
        Command::StartConstruction(c) => construction::start_construction(state, c, catalog),
        Command::ExecuteSecurityOperation(c) => security::execute_security_operation(state, c, catalog, rng),
        Command::MitigateThreat(c) => security::mitigate_threat(state, c, rng),
        Command::RespondToIssue(c) => citizens::respond_to_issue(state, c),
        Command::MakePurchase(c) => personal::make_purchase(state, c, catalog),
        Command::CancelRecurringExpense(c) => personal::cancel_recurring_expense(state, c),
        Command::SellAsset(c) => personal::sell_asset(state, c),
        Command::ClearError => misc::clear_error(state),
        Command::SetPaused(c) => misc::set_paused(state, c),
        Command::SetSpeed(c) => misc::set_speed(state, c),
        Command::Unknown => Ok(state.clone()),
    }
}

/// Apply `command` to `state` and return the next state.
///
/// Never fails: a rejection is reported through `error_message` on an
/// otherwise unchanged copy of `state`. Unknown commands are a no-op.
pub fn dispatch(state: &GameState, command: &Command, catalog: &Catalog, rng: &mut dyn RandomSource) -> GameState {
    if *command == Command::Unknown {
        debug!("ignoring unknown command");
        return state.clone();
    }
    debug!(command = command.name(), "dispatch");
    let outcome = route(state, command, catalog, rng).and_then(|mut next| {
        next.error_message = None;
        recompute::recompute(&mut next);
        validate_state(&next)?;
        Ok(next)
    });
    match outcome {
        Ok(next) => next,
        Err(err) => {
            warn!(command = command.name(), kind = ?err.kind(), %err, "command rejected");
            let mut rejected = state.clone();
            rejected.error_message = Some(err.to_string());
            rejected
        }
    }
}

/// Owns the catalog and the seeded random stream for one game session.
pub struct Engine {
    catalog: Catalog,
    config: SimConfig,
    rng: SeededRandom,
}

impl Engine {
    pub fn new(catalog: Catalog, config: SimConfig) -> Self {
        let rng = SeededRandom::new(config.rng_seed);
        Self { catalog, config, rng }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn new_game(&self) -> GameState {
        default_state(&self.catalog, &self.config)
    }

    /// Merge a saved state over a new game.
    pub fn load(&self, saved: &serde_json::Value) -> Result<GameState, LoadError> {
        merge(&self.new_game(), saved, &self.catalog)
    }

    pub fn dispatch(&mut self, state: &GameState, command: &Command) -> GameState {
        dispatch(state, command, &self.catalog, &mut self.rng)
    }
}
