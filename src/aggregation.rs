//! Transaction data aggregation for summary cards, charts, budget progress
//! and goal progress.
//!
//! Every function here is a pure function of its inputs and is cheap enough
//! to recompute on every filter change; nothing is cached.

use std::collections::BTreeMap;

use time::Date;

use crate::{
    catalog::EMERGENCY_FUND_CATEGORY,
    models::{Budget, Goal, Transaction, TransactionKind},
};

/// The headline sums for a transaction set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    /// Sum of income amounts.
    pub income: f64,
    /// Sum of expense amounts.
    pub expense: f64,
    /// Sum of savings amounts.
    pub savings: f64,
    /// `income - expense`. Savings are set aside, not spent, so they do not
    /// reduce the balance.
    pub balance: f64,
}

/// Sum the transaction amounts by kind.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        match transaction.kind() {
            TransactionKind::Income => totals.income += transaction.amount(),
            TransactionKind::Expense => totals.expense += transaction.amount(),
            TransactionKind::Savings => totals.savings += transaction.amount(),
        }
    }

    totals.balance = totals.income - totals.expense;

    totals
}

/// The per-kind sums for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotals {
    /// The day the entry covers.
    pub day: Date,
    /// Sum of income amounts on that day.
    pub income: f64,
    /// Sum of expense amounts on that day.
    pub expense: f64,
    /// Sum of savings amounts on that day.
    pub savings: f64,
}

/// One entry per distinct date in `transactions`, in chronological order.
///
/// Dates are compared as dates, not strings. Callers feed this the full
/// unfiltered transaction set; the month filter does not apply to the
/// daily chart.
pub fn daily_series(transactions: &[Transaction]) -> Vec<DailyTotals> {
    let mut days: BTreeMap<Date, (f64, f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        let entry = days.entry(transaction.date()).or_default();

        match transaction.kind() {
            TransactionKind::Income => entry.0 += transaction.amount(),
            TransactionKind::Expense => entry.1 += transaction.amount(),
            TransactionKind::Savings => entry.2 += transaction.amount(),
        }
    }

    days.into_iter()
        .map(|(day, (income, expense, savings))| DailyTotals {
            day,
            income,
            expense,
            savings,
        })
        .collect()
}

/// The total amount for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category label.
    pub category: String,
    /// Sum of amounts in that category.
    pub amount: f64,
}

/// Sum the amounts per category, sorted alphabetically by category.
///
/// Categories that sum to zero are omitted. The input is typically the
/// month-filtered set, pre-filtered to one kind when income and expenses
/// are charted separately.
pub fn category_distribution(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut categories: BTreeMap<&str, f64> = BTreeMap::new();

    for transaction in transactions {
        *categories.entry(transaction.category()).or_default() += transaction.amount();
    }

    categories
        .into_iter()
        .filter(|(_, amount)| *amount != 0.0)
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount,
        })
        .collect()
}

/// A budget together with its consumption for the period under view.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    /// The budget the figures were computed for.
    pub budget: Budget,
    /// Sum of amounts matching the budget's kind and category.
    pub spent: f64,
    /// `limit - spent`. Negative when the budget is blown.
    pub remaining: f64,
    /// Consumption as a percentage, clamped to `0..=100` for display.
    pub percent: f64,
    /// Whether spending exceeds the limit.
    pub over_budget: bool,
}

/// Compute the consumption of each budget against the given (typically
/// month-filtered) transaction set.
pub fn budget_progress(budgets: &[Budget], transactions: &[Transaction]) -> Vec<BudgetProgress> {
    budgets
        .iter()
        .map(|budget| {
            let spent: f64 = transactions
                .iter()
                .filter(|transaction| budget.matches(transaction))
                .map(Transaction::amount)
                .sum();

            BudgetProgress {
                spent,
                remaining: budget.limit() - spent,
                percent: percent_of(spent, budget.limit()),
                over_budget: spent > budget.limit(),
                budget: budget.clone(),
            }
        })
        .collect()
}

/// Progress towards a goal, derived from the transaction set.
///
/// The `achieved` flag here is advisory: it reflects the sums at the time
/// of computation and is never written back to the stored
/// [Goal::achieved](crate::models::Goal::achieved) flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    /// The amount accumulated so far.
    pub current: f64,
    /// Accumulation as a percentage of the target, clamped to `0..=100`.
    pub percent: f64,
    /// Whether the accumulated amount has reached the target.
    pub achieved: bool,
}

/// Progress towards `goal`, counting savings in the emergency-fund
/// category within the given (typically month-filtered) set.
pub fn goal_progress(goal: &Goal, transactions: &[Transaction]) -> GoalProgress {
    let current: f64 = transactions
        .iter()
        .filter(|transaction| {
            transaction.kind() == TransactionKind::Savings
                && transaction.category() == EMERGENCY_FUND_CATEGORY
        })
        .map(Transaction::amount)
        .sum();

    GoalProgress {
        current,
        percent: percent_of(current, goal.target_amount()),
        achieved: current >= goal.target_amount(),
    }
}

/// Whether `goal` is the distinguished emergency-fund goal.
///
/// Matched by a case-insensitive substring search on the title. The loose
/// match is kept for compatibility with existing stored goals; swap this
/// predicate out if goals ever grow an explicit category tag.
pub fn is_emergency_fund_goal(goal: &Goal) -> bool {
    goal.title().to_lowercase().contains("emergency fund")
}

fn percent_of(part: f64, whole: f64) -> f64 {
    (part / whole * 100.0).max(0.0).min(100.0)
}
