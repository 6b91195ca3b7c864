use mayor_core::{AccountType, LedgerError, Money, ValidationError};
use thiserror::Error;

/// Why a command was rejected. Rendered into `GameState::error_message`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    /// Malformed payload: zero quantity, equal accounts, out-of-range value.
    #[error("invalid command: {0}")]
    Invalid(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// An eligibility check failed.
    #[error("{0}")]
    Precondition(String),
    #[error("insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: AccountType,
        required: Money,
        available: Money,
    },
    /// The transition would break a state invariant.
    #[error("rejected: {0}")]
    Invariant(String),
}

/// Coarse classification of [`CommandError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Precondition,
    InsufficientFunds,
}

impl CommandError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        CommandError::NotFound { kind, id: id.into() }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        CommandError::Invalid(reason.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Invalid(_) | CommandError::Invariant(_) => ErrorKind::Validation,
            CommandError::NotFound { .. } => ErrorKind::NotFound,
            CommandError::Precondition(_) => ErrorKind::Precondition,
            CommandError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        }
    }
}

impl From<LedgerError> for CommandError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                account,
                required,
                available,
            } => CommandError::InsufficientFunds {
                account,
                required,
                available,
            },
            other => CommandError::Invalid(other.to_string()),
        }
    }
}

impl From<ValidationError> for CommandError {
    fn from(err: ValidationError) -> Self {
        CommandError::Invariant(err.to_string())
    }
}
