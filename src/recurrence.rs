//! Materializes recurring-payment definitions into concrete transaction
//! instances and merges them with manually entered transactions.

use std::collections::HashSet;

use crate::{
    Period,
    models::{RecurringPayment, Transaction},
};

/// Merge the transactions that should exist for `period` into `existing`.
///
/// Manually entered transactions are carried over untouched. All previously
/// derived transactions are discarded, then one fresh instance per active
/// definition that overlaps `period` is unioned in, dated on the
/// definition's start day clamped into the month. Instance ids are computed
/// from the definition's fields and the date, so reconciling the same
/// period twice yields an identical result.
///
/// Inactive definitions, and definitions loaded from storage that no longer
/// satisfy their invariants, are skipped silently. The returned set is
/// sorted by date ascending.
pub fn reconcile(
    definitions: &[RecurringPayment],
    existing: &[Transaction],
    period: Period,
) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = existing
        .iter()
        .filter(|transaction| !transaction.is_recurrent())
        .cloned()
        .collect();

    let mut seen_ids = HashSet::new();

    for definition in definitions {
        if let Some(instance) = materialize(definition, period)
            && seen_ids.insert(instance.id().clone())
        {
            merged.push(instance);
        }
    }

    merged.sort_by_key(|transaction| transaction.date());

    merged
}

/// Like [reconcile], but materializes every month from each definition's
/// start month through `through` instead of a single month.
///
/// This backfills the history that per-month reconciliation drops: a rent
/// definition starting in January reconciled through March produces the
/// January, February and March instances at once.
pub fn reconcile_through(
    definitions: &[RecurringPayment],
    existing: &[Transaction],
    through: Period,
) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = existing
        .iter()
        .filter(|transaction| !transaction.is_recurrent())
        .cloned()
        .collect();

    let mut seen_ids = HashSet::new();

    for definition in definitions {
        let mut period = Period::from_date(definition.start_date());

        while period <= through {
            if let Some(instance) = materialize(definition, period)
                && seen_ids.insert(instance.id().clone())
            {
                merged.push(instance);
            }

            period = period.next();
        }
    }

    merged.sort_by_key(|transaction| transaction.date());

    merged
}

/// The instance of `definition` for `period`, or `None` if the definition
/// should not materialize there.
fn materialize(definition: &RecurringPayment, period: Period) -> Option<Transaction> {
    if !definition.active() {
        return None;
    }

    if !definition.is_well_formed() {
        tracing::debug!(
            "skipping malformed recurring payment \"{}\"",
            definition.title()
        );
        return None;
    }

    if !definition.overlaps(period) {
        return None;
    }

    let date = period.day_clamped(definition.start_date().day());

    Some(Transaction::derived(definition, date))
}
