//! Pocketbook is the engine behind a single-user personal-finance tracker:
//! transactions, budgets, goals and recurring payments, with monthly
//! aggregation for charts and budget progress.
//!
//! The [FinanceState] container owns all collections and persists them
//! through a [stores::StateStore] blob store. The recurrence and
//! aggregation modules are pure functions over the transaction set.

#![warn(missing_docs)]

use time::Date;

use crate::models::TransactionKind;

pub mod aggregation;
pub mod catalog;
pub mod export;
pub mod filter;
pub mod models;
pub mod period;
pub mod recurrence;
pub mod state;
pub mod stores;

pub use period::Period;
pub use state::FinanceState;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required text field was empty.
    ///
    /// The field name is included so callers can point the user at the
    /// offending input.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A zero or negative amount was used where only positive amounts make
    /// sense (transaction amounts, budget limits, goal targets).
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    NonPositiveAmount(f64),

    /// The category label does not belong to the catalog entry for the
    /// given transaction kind.
    #[error("\"{category}\" is not a valid {kind} category")]
    InvalidCategory {
        /// The kind the category was checked against.
        kind: TransactionKind,
        /// The rejected category label.
        category: String,
    },

    /// A recurring payment's end date was before its start date.
    #[error("the end date {end} is before the start date {start}")]
    EndBeforeStart {
        /// The first day the payment applies.
        start: Date,
        /// The rejected inclusive end date.
        end: Date,
    },

    /// The string could not be parsed as a transaction kind.
    #[error("\"{0}\" is not one of income, expense or savings")]
    InvalidKind(String),

    /// The string could not be parsed as a `YYYY-MM` month key.
    #[error("\"{0}\" is not a valid month key, expected the form YYYY-MM")]
    InvalidPeriod(String),

    /// Tried to delete a transaction that was materialized from a recurring
    /// payment.
    ///
    /// Derived transactions are owned by their definition; deactivate or
    /// remove the recurring payment instead.
    #[error("recurring transactions cannot be deleted directly, deactivate the recurring payment instead")]
    DeleteDerivedTransaction,

    /// The requested record could not be found.
    #[error("the requested record could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// A collection could not be encoded as JSON for storage or export.
    #[error("could not serialize as JSON: {0}")]
    Serialization(String),

    /// Could not acquire the lock on the underlying blob store.
    #[error("could not acquire the store lock")]
    StoreLock,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Serialization(value.to_string())
    }
}
