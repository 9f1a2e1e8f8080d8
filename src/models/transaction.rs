//! This file defines the type `Transaction`, the core record of the
//! tracker, and the identity scheme that keeps recurring materialization
//! idempotent.

use std::{fmt::Display, fmt::Write as _, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::Date;

use crate::{Error, catalog, models::RecurringPayment};

/// Whether a transaction brings money in, spends it, or sets it aside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money earned, e.g. wages.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
    /// Money set aside, e.g. an emergency-fund contribution.
    ///
    /// Savings are excluded from the income/expense balance.
    Savings,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
            TransactionKind::Savings => "Savings",
        };

        write!(f, "{label}")
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "savings" => Ok(TransactionKind::Savings),
            _ => Err(Error::InvalidKind(text.to_string())),
        }
    }
}

/// The identity token of a transaction.
///
/// Manual entries get a `txn-<n>` id minted by the state container.
/// Derived entries get a `rec-<digest>` id computed from the fields of the
/// recurring payment that produced them, so re-materializing the same
/// month yields the same id and cannot duplicate the record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// The id for the `n`th manually entered transaction.
    pub fn manual(n: u64) -> Self {
        Self(format!("txn-{n}"))
    }

    /// The deterministic id for a transaction materialized from a recurring
    /// payment on `date`.
    pub fn derived(
        title: &str,
        kind: TransactionKind,
        category: &str,
        amount: f64,
        date: Date,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(b"|");
        hasher.update(kind.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(category.as_bytes());
        hasher.update(b"|");
        // The raw bit pattern, so that equal amounts always hash equally.
        hasher.update(amount.to_bits().to_be_bytes());
        hasher.update(b"|");
        hasher.update(date.year().to_be_bytes());
        hasher.update([u8::from(date.month()), date.day()]);

        let digest = hasher.finalize();
        let mut id = String::from("rec-");
        for byte in &digest[..8] {
            write!(id, "{byte:02x}").expect("writing to a String cannot fail");
        }

        Self(id)
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The counter of a `txn-<n>` id, if this is one.
    pub(crate) fn manual_counter(&self) -> Option<u64> {
        self.0.strip_prefix("txn-")?.parse().ok()
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single dated movement of money: income, expense or savings.
///
/// Manual entries are created from a validated [TransactionDraft] by the
/// state container; derived entries are materialized from a
/// [RecurringPayment] by the recurrence engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: TransactionId,
    date: Date,
    #[serde(rename = "type")]
    kind: TransactionKind,
    category: String,
    amount: f64,
    is_recurrent: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    recurrent_source_title: Option<String>,
}

impl Transaction {
    /// Create a manually entered transaction with the given id.
    pub fn manual(id: TransactionId, draft: TransactionDraft) -> Self {
        Self {
            id,
            date: draft.date,
            kind: draft.kind,
            category: draft.category,
            amount: draft.amount,
            is_recurrent: false,
            recurrent_source_title: None,
        }
    }

    /// Materialize an instance of `source` on `date`.
    ///
    /// The id is derived from the payment's fields and the date, so calling
    /// this again with the same inputs yields an identical record.
    pub fn derived(source: &RecurringPayment, date: Date) -> Self {
        Self {
            id: TransactionId::derived(
                source.title(),
                source.kind(),
                source.category(),
                source.amount(),
                date,
            ),
            date,
            kind: source.kind(),
            category: source.category().to_string(),
            amount: source.amount(),
            is_recurrent: true,
            recurrent_source_title: Some(source.title().to_string()),
        }
    }

    /// The identity token of the transaction.
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    /// The calendar day the transaction happened.
    pub fn date(&self) -> Date {
        self.date
    }

    /// Whether the transaction is income, expense or savings.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// The category label, from the catalog entry for the kind.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The amount of money moved. Always positive.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether this record was materialized from a recurring payment.
    pub fn is_recurrent(&self) -> bool {
        self.is_recurrent
    }

    /// The title of the recurring payment this record was materialized
    /// from, if any.
    pub fn recurrent_source_title(&self) -> Option<&str> {
        self.recurrent_source_title.as_deref()
    }
}

/// The validated input for a manually entered transaction.
///
/// The state container turns a draft into a [Transaction] by minting an id
/// for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    date: Date,
    kind: TransactionKind,
    category: String,
    amount: f64,
}

impl TransactionDraft {
    /// Create a draft, validating the category and amount.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::EmptyField] if `category` is empty,
    /// - [Error::InvalidCategory] if `category` is not in the catalog entry
    ///   for `kind`,
    /// - or [Error::NonPositiveAmount] if `amount` is not greater than zero.
    pub fn new(
        date: Date,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
    ) -> Result<Self, Error> {
        let category = category.into();

        if category.is_empty() {
            return Err(Error::EmptyField("category"));
        }

        if !catalog::is_valid_category(kind, &category) {
            return Err(Error::InvalidCategory { kind, category });
        }

        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::NonPositiveAmount(amount));
        }

        Ok(Self {
            date,
            kind,
            category,
            amount,
        })
    }
}
