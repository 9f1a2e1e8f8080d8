use std::{
    fs,
    path::PathBuf,
    process,
    sync::{Arc, Mutex},
};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use pocketbook::{
    FinanceState, Period,
    aggregation::{
        budget_progress, category_distribution, daily_series, goal_progress,
        is_emergency_fund_goal, totals,
    },
    models::{GoalStatus, TransactionDraft, TransactionKind},
    stores::{SqliteBlobStore, sqlite::initialize},
};

/// The command line interface for the pocketbook finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print totals, category breakdown and budget progress for a month.
    Summary {
        /// The month to summarize as YYYY-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
    },
    /// Add a manually entered transaction.
    Add {
        /// income, expense or savings.
        #[arg(long)]
        kind: String,

        /// The category label, e.g. Groceries.
        #[arg(long)]
        category: String,

        /// The amount of money moved. Must be greater than zero.
        #[arg(long)]
        amount: f64,

        /// The day of the transaction as YYYY-MM-DD.
        #[arg(long)]
        date: String,
    },
    /// Write the full state as a JSON document.
    Export {
        /// The file to write. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Materialize recurring payments for every month up to now.
    Backfill,
}

fn main() {
    setup_logging();

    let args = Args::parse();

    if let Err(error) = run(args) {
        eprintln!("error: {error}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = open_state(&args.db_path)?;

    match args.command {
        Command::Summary { month } => {
            let period = match month {
                Some(text) => text.parse()?,
                None => Period::current(),
            };

            state.set_period_filter(Some(period))?;
            print_summary(&state, period);
        }
        Command::Add {
            kind,
            category,
            amount,
            date,
        } => {
            let kind: TransactionKind = kind.parse()?;
            let date = time::Date::parse(
                &date,
                &time::macros::format_description!("[year]-[month]-[day]"),
            )?;

            let transaction =
                state.add_transaction(TransactionDraft::new(date, kind, category, amount)?)?;

            println!("added {}", transaction.id());
        }
        Command::Export { output } => {
            let json = state.export().to_json_pretty()?;

            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    println!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Backfill => {
            state.backfill_recurring()?;

            let derived = state
                .transactions()
                .iter()
                .filter(|transaction| transaction.is_recurrent())
                .count();

            println!("{derived} recurring transactions materialized");
        }
    }

    Ok(())
}

fn open_state(db_path: &str) -> Result<FinanceState<SqliteBlobStore>, Box<dyn std::error::Error>> {
    let connection = Connection::open(db_path)?;
    initialize(&connection)?;

    let store = SqliteBlobStore::new(Arc::new(Mutex::new(connection)));

    Ok(FinanceState::load(store)?)
}

fn print_summary(state: &FinanceState<SqliteBlobStore>, period: Period) {
    let currency = state.currency();
    let month_scoped = state.filtered_transactions();

    let sums = totals(&month_scoped);
    println!("Summary for {period}");
    println!("  Income:  {currency} {:.2}", sums.income);
    println!("  Expense: {currency} {:.2}", sums.expense);
    println!("  Savings: {currency} {:.2}", sums.savings);
    println!("  Balance: {currency} {:.2}", sums.balance);

    let expenses: Vec<_> = month_scoped
        .iter()
        .filter(|transaction| transaction.kind() == TransactionKind::Expense)
        .cloned()
        .collect();
    let distribution = category_distribution(&expenses);

    if !distribution.is_empty() {
        println!("Expenses by category:");
        for entry in distribution {
            println!("  {}: {currency} {:.2}", entry.category, entry.amount);
        }
    }

    let budgets = budget_progress(state.budgets(), &month_scoped);
    if !budgets.is_empty() {
        println!("Budgets:");
        for progress in budgets {
            let marker = if progress.over_budget {
                " (over budget)"
            } else {
                ""
            };

            println!(
                "  {}/{}: {currency} {:.2} of {currency} {:.2} ({:.0}%){marker}",
                progress.budget.kind(),
                progress.budget.category(),
                progress.spent,
                progress.budget.limit(),
                progress.percent,
            );
        }
    }

    if !state.goals().is_empty() {
        println!("Goals:");
        let today = time::OffsetDateTime::now_utc().date();

        for goal in state.goals() {
            let status = match goal.status(today) {
                GoalStatus::Achieved => "achieved",
                GoalStatus::Overdue => "overdue",
                GoalStatus::InProgress => "in progress",
            };

            println!(
                "  {} ({currency} {:.2} by {}): {status}",
                goal.title(),
                goal.target_amount(),
                goal.deadline(),
            );
        }
    }

    if let Some(goal) = state.goals().iter().find(|goal| is_emergency_fund_goal(goal)) {
        let progress = goal_progress(goal, &month_scoped);

        println!(
            "Emergency fund: {currency} {:.2} of {currency} {:.2} ({:.0}%)",
            progress.current,
            goal.target_amount(),
            progress.percent,
        );
    }

    // The daily chart always reads the full set, not the filtered month.
    let series = daily_series(state.transactions());
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        println!(
            "{} day(s) with activity between {} and {}",
            series.len(),
            first.day,
            last.day,
        );
    }
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}
