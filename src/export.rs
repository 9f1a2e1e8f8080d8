//! The full-state export: every collection serialized as a single JSON
//! document for download or backup. Import is not supported.

use serde::Serialize;

use crate::{
    Error,
    models::{Budget, Goal, RecurringPayment, Transaction},
};

/// The full-state export payload.
///
/// Build one with [FinanceState::export](crate::FinanceState::export).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    /// The full transaction set, manual and derived.
    pub transactions: Vec<Transaction>,
    /// The stored goals.
    pub goals: Vec<Goal>,
    /// The stored budgets.
    pub budgets: Vec<Budget>,
    /// The stored recurring-payment definitions.
    pub recurrent_payments: Vec<RecurringPayment>,
}

impl ExportData {
    /// Serialize the payload as pretty-printed JSON text.
    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
