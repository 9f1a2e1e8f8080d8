//! This file defines `RecurringPayment`, the user-configured definition a
//! recurring transaction instance is materialized from (e.g. rent, wages).

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, Period, catalog, models::TransactionKind};

/// A payment that repeats every month, e.g. rent or a phone bill.
///
/// The definition itself never appears in aggregations; the recurrence
/// engine materializes one concrete [Transaction](crate::models::Transaction)
/// per overlapped month. Deactivating or removing a definition stops future
/// materialization but does not retroactively delete instances already
/// merged into past months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPayment {
    title: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
    category: String,
    amount: f64,
    start_date: Date,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    end_date: Option<Date>,
    active: bool,
}

impl RecurringPayment {
    /// Create a recurring payment definition.
    ///
    /// An `end_date` of `None` means the payment recurs indefinitely. The
    /// end date is an inclusive upper bound: the payment still materializes
    /// in the month the end date falls in.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::EmptyField] if `title` or `category` is empty,
    /// - [Error::InvalidCategory] if `category` is not in the catalog entry
    ///   for `kind`,
    /// - [Error::NonPositiveAmount] if `amount` is not greater than zero,
    /// - or [Error::EndBeforeStart] if `end_date` is before `start_date`.
    pub fn new(
        title: impl Into<String>,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        start_date: Date,
        end_date: Option<Date>,
        active: bool,
    ) -> Result<Self, Error> {
        let title = title.into();
        let category = category.into();

        if title.is_empty() {
            return Err(Error::EmptyField("title"));
        }

        if category.is_empty() {
            return Err(Error::EmptyField("category"));
        }

        if !catalog::is_valid_category(kind, &category) {
            return Err(Error::InvalidCategory { kind, category });
        }

        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::NonPositiveAmount(amount));
        }

        if let Some(end) = end_date
            && end < start_date
        {
            return Err(Error::EndBeforeStart {
                start: start_date,
                end,
            });
        }

        Ok(Self {
            title,
            kind,
            category,
            amount,
            start_date,
            end_date,
            active,
        })
    }

    /// The unique title of the definition, e.g. "Rent".
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The kind of the materialized transactions.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// The category of the materialized transactions.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The amount of each materialized transaction.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The first day the payment applies. Its day of month is reused for
    /// every materialized instance.
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// The inclusive last day the payment applies, if bounded.
    pub fn end_date(&self) -> Option<Date> {
        self.end_date
    }

    /// Whether the payment should currently materialize instances.
    pub fn active(&self) -> bool {
        self.active
    }

    /// Turn materialization on or off without touching existing instances.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the payment applies in `period`: it must have started on or
    /// before that month and, if bounded, not have ended before it.
    pub fn overlaps(&self, period: Period) -> bool {
        Period::from_date(self.start_date) <= period
            && self
                .end_date
                .is_none_or(|end| Period::from_date(end) >= period)
    }

    /// Whether a definition loaded from storage still satisfies the
    /// construction invariants. Reconciliation skips definitions that do
    /// not, rather than failing.
    pub fn is_well_formed(&self) -> bool {
        !self.title.is_empty()
            && !self.category.is_empty()
            && self.amount.is_finite()
            && self.amount > 0.0
            && self.end_date.is_none_or(|end| end >= self.start_date)
    }
}

#[cfg(test)]
mod recurring_payment_tests {
    use time::macros::date;

    use crate::{Error, Period, models::TransactionKind};

    use super::RecurringPayment;

    fn rent() -> RecurringPayment {
        RecurringPayment::new(
            "Rent",
            TransactionKind::Expense,
            "Rent",
            1000.0,
            date!(2025 - 01 - 05),
            None,
            true,
        )
        .unwrap()
    }

    #[test]
    fn new_fails_on_end_before_start() {
        let payment = RecurringPayment::new(
            "Rent",
            TransactionKind::Expense,
            "Rent",
            1000.0,
            date!(2025 - 01 - 05),
            Some(date!(2024 - 12 - 31)),
            true,
        );

        assert_eq!(
            payment,
            Err(Error::EndBeforeStart {
                start: date!(2025 - 01 - 05),
                end: date!(2024 - 12 - 31),
            })
        );
    }

    #[test]
    fn new_succeeds_when_end_equals_start() {
        let payment = RecurringPayment::new(
            "Rent",
            TransactionKind::Expense,
            "Rent",
            1000.0,
            date!(2025 - 01 - 05),
            Some(date!(2025 - 01 - 05)),
            true,
        );

        assert!(payment.is_ok());
    }

    #[test]
    fn new_fails_on_empty_title() {
        let payment = RecurringPayment::new(
            "",
            TransactionKind::Expense,
            "Rent",
            1000.0,
            date!(2025 - 01 - 05),
            None,
            true,
        );

        assert_eq!(payment, Err(Error::EmptyField("title")));
    }

    #[test]
    fn unbounded_payment_overlaps_any_later_month() {
        let payment = rent();

        assert!(payment.overlaps("2025-01".parse().unwrap()));
        assert!(payment.overlaps("2031-12".parse().unwrap()));
        assert!(!payment.overlaps("2024-12".parse().unwrap()));
    }

    #[test]
    fn start_month_counts_even_mid_month() {
        // Started on the 5th, but the whole start month overlaps.
        let payment = rent();
        let start_month: Period = "2025-01".parse().unwrap();

        assert!(payment.overlaps(start_month));
    }

    #[test]
    fn end_month_is_inclusive() {
        let payment = RecurringPayment::new(
            "Gym",
            TransactionKind::Expense,
            "Health",
            30.0,
            date!(2025 - 01 - 10),
            Some(date!(2025 - 03 - 10)),
            true,
        )
        .unwrap();

        assert!(payment.overlaps("2025-03".parse().unwrap()));
        assert!(!payment.overlaps("2025-04".parse().unwrap()));
    }

    #[test]
    fn stored_payment_with_broken_interval_is_not_well_formed() {
        let mut payment = rent();
        // Simulate a hand-edited blob by deserializing a broken record.
        let mut json = serde_json::to_value(&payment).unwrap();
        json["endDate"] = serde_json::Value::String("2024-01-01".to_string());
        payment = serde_json::from_value(json).unwrap();

        assert!(!payment.is_well_formed());
    }

    #[test]
    fn serialized_form_uses_the_stored_field_names() {
        let json = serde_json::to_value(rent()).unwrap();

        assert_eq!(json["title"], "Rent");
        assert_eq!(json["type"], "Expense");
        assert_eq!(json["startDate"], "2025-01-05");
        assert_eq!(json["active"], true);
        assert!(json.get("endDate").is_none());
    }
}
