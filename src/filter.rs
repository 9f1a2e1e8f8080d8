//! The month filter applied to the transaction set before aggregation.

use crate::{Period, models::Transaction};

/// The transactions that fall in `period`, in their original relative
/// order. `None` returns the full set unchanged.
///
/// This is the only gate in front of the month-scoped aggregations
/// (totals, category distribution, budget and goal progress). The daily
/// series deliberately bypasses it and always reads the full set.
pub fn filter_by_month(transactions: &[Transaction], period: Option<Period>) -> Vec<Transaction> {
    match period {
        None => transactions.to_vec(),
        Some(period) => transactions
            .iter()
            .filter(|transaction| period.contains(transaction.date()))
            .cloned()
            .collect(),
    }
}
