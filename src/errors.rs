//! Unified error type for the ledger.
//!
//! Library functions return [`Result`]; the scheduler pass itself never does,
//! it logs failures instead (see [`crate::core::scheduler`]).

use thiserror::Error;

/// All errors produced by the ledger library.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying store failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the failure
        message: String,
    },

    /// A year-month string was not of the form `YYYY-MM`
    #[error("Invalid year-month {value:?}: expected YYYY-MM")]
    InvalidYearMonth {
        /// The offending input
        value: String,
    },

    /// A day of month outside 1..=31
    #[error("Invalid day of month: {day} (expected 1-31)")]
    InvalidDayOfMonth {
        /// The offending day
        day: i32,
    },

    /// An amount that is negative, NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// No recurring template with this id
    #[error("Recurring template not found: {id}")]
    TemplateNotFound {
        /// Requested template id
        id: i64,
    },

    /// No transaction with this id
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Requested transaction id
        id: i64,
    },

    /// Any other rejected input
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what was wrong
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
