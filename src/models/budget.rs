//! This file defines the `Budget` type: a per-month spending ceiling for
//! one kind/category pair.

use serde::{Deserialize, Serialize};

use crate::{
    Error, catalog,
    models::{Transaction, TransactionKind},
};

/// A per-month ceiling for a kind/category pair, e.g. Expense/Groceries.
///
/// Only the limit is stored; consumption against it is always derived from
/// the filtered transaction set (see
/// [budget_progress](crate::aggregation::budget_progress)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(rename = "type")]
    kind: TransactionKind,
    category: String,
    limit: f64,
}

impl Budget {
    /// Create a budget.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::EmptyField] if `category` is empty,
    /// - [Error::InvalidCategory] if `category` is not in the catalog entry
    ///   for `kind`,
    /// - or [Error::NonPositiveAmount] if `limit` is not greater than zero.
    pub fn new(
        kind: TransactionKind,
        category: impl Into<String>,
        limit: f64,
    ) -> Result<Self, Error> {
        let category = category.into();

        if category.is_empty() {
            return Err(Error::EmptyField("category"));
        }

        if !catalog::is_valid_category(kind, &category) {
            return Err(Error::InvalidCategory { kind, category });
        }

        if !limit.is_finite() || limit <= 0.0 {
            return Err(Error::NonPositiveAmount(limit));
        }

        Ok(Self {
            kind,
            category,
            limit,
        })
    }

    /// The kind of transaction the budget applies to.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// The category the budget applies to.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The spending ceiling.
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Whether `transaction` counts against this budget.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        transaction.kind() == self.kind && transaction.category() == self.category
    }
}
