//! The static category catalog: the valid category labels for each
//! transaction kind.

use crate::models::TransactionKind;

/// The distinguished savings category that feeds emergency-fund progress.
pub const EMERGENCY_FUND_CATEGORY: &str = "Emergency Fund";

const INCOME_CATEGORIES: &[&str] = &["Salary", "Freelance", "Investment", "Gift", "Other"];

const EXPENSE_CATEGORIES: &[&str] = &[
    "Rent",
    "Groceries",
    "Utilities",
    "Transport",
    "Entertainment",
    "Health",
    "Other",
];

const SAVINGS_CATEGORIES: &[&str] =
    &[EMERGENCY_FUND_CATEGORY, "Retirement", "Vacation", "Other"];

/// The valid category labels for `kind`.
pub fn categories_for(kind: TransactionKind) -> &'static [&'static str] {
    match kind {
        TransactionKind::Income => INCOME_CATEGORIES,
        TransactionKind::Expense => EXPENSE_CATEGORIES,
        TransactionKind::Savings => SAVINGS_CATEGORIES,
    }
}

/// Whether `category` is a valid label for `kind`.
pub fn is_valid_category(kind: TransactionKind, category: &str) -> bool {
    categories_for(kind).contains(&category)
}
