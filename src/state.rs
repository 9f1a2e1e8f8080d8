//! The application state container: the single source of truth for every
//! collection, with persistence as an observer of each change.

use serde::de::DeserializeOwned;

use crate::{
    Error, Period,
    export::ExportData,
    filter::filter_by_month,
    models::{
        Budget, Goal, RecurringPayment, Transaction, TransactionDraft, TransactionId,
        TransactionKind,
    },
    recurrence,
    stores::StateStore,
};

const TRANSACTIONS_KEY: &str = "transactions";
const GOALS_KEY: &str = "goals";
const BUDGETS_KEY: &str = "budgets";
const RECURRENT_PAYMENTS_KEY: &str = "recurrentPayments";
const CURRENCY_KEY: &str = "currency";

const DEFAULT_CURRENCY: &str = "LKR";

/// Owns the transaction, goal, budget and recurring-payment collections and
/// the active month filter.
///
/// Every mutating operation validates its input, updates the in-memory
/// collections and then writes the affected blob(s) through the store, so
/// the durable state trails the in-memory state by at most one write.
/// Changing the recurring definitions or the month filter re-runs
/// reconciliation; nothing runs on a timer.
pub struct FinanceState<S: StateStore> {
    store: S,
    transactions: Vec<Transaction>,
    goals: Vec<Goal>,
    budgets: Vec<Budget>,
    recurring_payments: Vec<RecurringPayment>,
    currency: String,
    active_period: Option<Period>,
    next_manual_id: u64,
}

impl<S: StateStore> FinanceState<S> {
    /// Load the state from `store`.
    ///
    /// A missing or corrupt blob falls back to the empty collection (with a
    /// warning in the log); only store-level failures are errors.
    pub fn load(store: S) -> Result<Self, Error> {
        let transactions: Vec<Transaction> = read_collection(&store, TRANSACTIONS_KEY)?;
        let goals = read_collection(&store, GOALS_KEY)?;
        let budgets = read_collection(&store, BUDGETS_KEY)?;
        let recurring_payments = read_collection(&store, RECURRENT_PAYMENTS_KEY)?;
        let currency = store
            .read(CURRENCY_KEY)?
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let next_manual_id = transactions
            .iter()
            .filter_map(|transaction| transaction.id().manual_counter())
            .max()
            .map_or(1, |highest| highest + 1);

        Ok(Self {
            store,
            transactions,
            goals,
            budgets,
            recurring_payments,
            currency,
            active_period: None,
            next_manual_id,
        })
    }

    /// The full transaction set, manual and derived, sorted as last merged.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The transaction set narrowed to the active month filter, in order.
    ///
    /// This is the input for the month-scoped aggregations. The daily
    /// series should use [FinanceState::transactions] instead.
    pub fn filtered_transactions(&self) -> Vec<Transaction> {
        filter_by_month(&self.transactions, self.active_period)
    }

    /// The stored goals.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// The stored budgets.
    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    /// The stored recurring-payment definitions.
    pub fn recurring_payments(&self) -> &[RecurringPayment] {
        &self.recurring_payments
    }

    /// The display currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// The active month filter, if any.
    pub fn active_period(&self) -> Option<Period> {
        self.active_period
    }

    /// Add a manually entered transaction and persist the set.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Transaction, Error> {
        let transaction = Transaction::manual(TransactionId::manual(self.next_manual_id), draft);
        self.next_manual_id += 1;

        self.transactions.push(transaction.clone());
        self.persist_transactions()?;

        Ok(transaction)
    }

    /// Delete a manually entered transaction.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::DeleteDerivedTransaction] if the transaction was
    ///   materialized from a recurring payment (deactivate or remove the
    ///   definition instead),
    /// - or [Error::NotFound] if no transaction has the given id.
    pub fn delete_transaction(&mut self, id: &TransactionId) -> Result<(), Error> {
        let position = self
            .transactions
            .iter()
            .position(|transaction| transaction.id() == id)
            .ok_or(Error::NotFound)?;

        if self.transactions[position].is_recurrent() {
            return Err(Error::DeleteDerivedTransaction);
        }

        self.transactions.remove(position);
        self.persist_transactions()
    }

    /// Add or replace (by title) a recurring payment, then re-run
    /// reconciliation for the active month.
    pub fn upsert_recurring(&mut self, definition: RecurringPayment) -> Result<(), Error> {
        let existing = self
            .recurring_payments
            .iter()
            .position(|payment| payment.title() == definition.title());

        match existing {
            Some(position) => self.recurring_payments[position] = definition,
            None => self.recurring_payments.push(definition),
        }

        self.persist_recurring_payments()?;
        self.reconcile_active_period()
    }

    /// Remove a recurring payment by title, then re-run reconciliation.
    ///
    /// Instances already merged into months other than the active one are
    /// not touched; the definition simply stops materializing.
    pub fn remove_recurring(&mut self, title: &str) -> Result<(), Error> {
        let position = self
            .recurring_payments
            .iter()
            .position(|payment| payment.title() == title)
            .ok_or(Error::NotFound)?;

        self.recurring_payments.remove(position);

        self.persist_recurring_payments()?;
        self.reconcile_active_period()
    }

    /// Activate or deactivate a recurring payment by title, then re-run
    /// reconciliation.
    pub fn set_recurring_active(&mut self, title: &str, active: bool) -> Result<(), Error> {
        let payment = self
            .recurring_payments
            .iter_mut()
            .find(|payment| payment.title() == title)
            .ok_or(Error::NotFound)?;

        payment.set_active(active);

        self.persist_recurring_payments()?;
        self.reconcile_active_period()
    }

    /// Change the active month filter and re-run reconciliation for it.
    pub fn set_period_filter(&mut self, period: Option<Period>) -> Result<(), Error> {
        self.active_period = period;
        self.reconcile_active_period()
    }

    /// Materialize every month from each definition's start through the
    /// current month, instead of just the active one.
    pub fn backfill_recurring(&mut self) -> Result<(), Error> {
        self.transactions = recurrence::reconcile_through(
            &self.recurring_payments,
            &self.transactions,
            Period::current(),
        );

        self.persist_transactions()
    }

    /// Add a goal and persist the set.
    pub fn add_goal(&mut self, goal: Goal) -> Result<(), Error> {
        self.goals.push(goal);
        self.persist_goals()
    }

    /// Replace the first goal with the given title.
    pub fn update_goal(&mut self, title: &str, goal: Goal) -> Result<(), Error> {
        let position = self
            .goals
            .iter()
            .position(|existing| existing.title() == title)
            .ok_or(Error::NotFound)?;

        self.goals[position] = goal;
        self.persist_goals()
    }

    /// Remove the first goal with the given title.
    pub fn remove_goal(&mut self, title: &str) -> Result<(), Error> {
        let position = self
            .goals
            .iter()
            .position(|goal| goal.title() == title)
            .ok_or(Error::NotFound)?;

        self.goals.remove(position);
        self.persist_goals()
    }

    /// Set the stored achieved flag on the first goal with the given title.
    ///
    /// This is the only way the flag changes; computed goal progress never
    /// writes it.
    pub fn set_goal_achieved(&mut self, title: &str, achieved: bool) -> Result<(), Error> {
        let goal = self
            .goals
            .iter_mut()
            .find(|goal| goal.title() == title)
            .ok_or(Error::NotFound)?;

        goal.set_achieved(achieved);
        self.persist_goals()
    }

    /// Add or replace (by kind and category) a budget.
    pub fn upsert_budget(&mut self, budget: Budget) -> Result<(), Error> {
        let existing = self.budgets.iter().position(|candidate| {
            candidate.kind() == budget.kind() && candidate.category() == budget.category()
        });

        match existing {
            Some(position) => self.budgets[position] = budget,
            None => self.budgets.push(budget),
        }

        self.persist_budgets()
    }

    /// Remove the budget for the given kind and category.
    pub fn remove_budget(&mut self, kind: TransactionKind, category: &str) -> Result<(), Error> {
        let position = self
            .budgets
            .iter()
            .position(|budget| budget.kind() == kind && budget.category() == category)
            .ok_or(Error::NotFound)?;

        self.budgets.remove(position);
        self.persist_budgets()
    }

    /// Set the display currency code.
    pub fn set_currency(&mut self, currency: &str) -> Result<(), Error> {
        if currency.is_empty() {
            return Err(Error::EmptyField("currency"));
        }

        self.currency = currency.to_string();
        self.store.write(CURRENCY_KEY, currency)
    }

    /// Wipe every collection and its blob. Destructive; confirming with the
    /// user first is the caller's concern.
    pub fn clear_all(&mut self) -> Result<(), Error> {
        self.transactions.clear();
        self.goals.clear();
        self.budgets.clear();
        self.recurring_payments.clear();
        self.currency = DEFAULT_CURRENCY.to_string();
        self.next_manual_id = 1;

        for key in [
            TRANSACTIONS_KEY,
            GOALS_KEY,
            BUDGETS_KEY,
            RECURRENT_PAYMENTS_KEY,
            CURRENCY_KEY,
        ] {
            self.store.delete(key)?;
        }

        Ok(())
    }

    /// The full-state export payload.
    pub fn export(&self) -> ExportData {
        ExportData {
            transactions: self.transactions.clone(),
            goals: self.goals.clone(),
            budgets: self.budgets.clone(),
            recurrent_payments: self.recurring_payments.clone(),
        }
    }

    /// Re-run reconciliation for the active month (or the current calendar
    /// month when no filter is set) and persist the merged set.
    fn reconcile_active_period(&mut self) -> Result<(), Error> {
        let period = self.active_period.unwrap_or_else(Period::current);

        self.transactions =
            recurrence::reconcile(&self.recurring_payments, &self.transactions, period);

        self.persist_transactions()
    }

    fn persist_transactions(&mut self) -> Result<(), Error> {
        let json = serde_json::to_string(&self.transactions)?;
        self.store.write(TRANSACTIONS_KEY, &json)
    }

    fn persist_goals(&mut self) -> Result<(), Error> {
        let json = serde_json::to_string(&self.goals)?;
        self.store.write(GOALS_KEY, &json)
    }

    fn persist_budgets(&mut self) -> Result<(), Error> {
        let json = serde_json::to_string(&self.budgets)?;
        self.store.write(BUDGETS_KEY, &json)
    }

    fn persist_recurring_payments(&mut self) -> Result<(), Error> {
        let json = serde_json::to_string(&self.recurring_payments)?;
        self.store.write(RECURRENT_PAYMENTS_KEY, &json)
    }
}

fn read_collection<T: DeserializeOwned, S: StateStore>(
    store: &S,
    key: &str,
) -> Result<Vec<T>, Error> {
    let Some(json) = store.read(key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&json) {
        Ok(items) => Ok(items),
        Err(error) => {
            tracing::warn!("discarding corrupt \"{key}\" blob: {error}");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod finance_state_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        models::{Goal, RecurringPayment, TransactionDraft, TransactionId, TransactionKind},
        stores::{SqliteBlobStore, StateStore, sqlite::initialize},
    };

    use super::FinanceState;

    fn create_store() -> SqliteBlobStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SqliteBlobStore::new(Arc::new(Mutex::new(connection)))
    }

    fn salary_draft() -> TransactionDraft {
        TransactionDraft::new(
            date!(2025 - 03 - 01),
            TransactionKind::Income,
            "Salary",
            5000.0,
        )
        .unwrap()
    }

    fn rent_definition() -> RecurringPayment {
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
    fn load_from_an_empty_store_yields_empty_collections() {
        let state = FinanceState::load(create_store()).unwrap();

        assert!(state.transactions().is_empty());
        assert!(state.goals().is_empty());
        assert!(state.budgets().is_empty());
        assert!(state.recurring_payments().is_empty());
        assert_eq!(state.currency(), "LKR");
        assert_eq!(state.active_period(), None);
    }

    #[test]
    fn load_falls_back_to_empty_on_a_corrupt_blob() {
        let mut store = create_store();
        store.write("transactions", "{not json").unwrap();
        store.write("goals", "[{\"title\": 42}]").unwrap();

        let state = FinanceState::load(store).unwrap();

        assert!(state.transactions().is_empty());
        assert!(state.goals().is_empty());
    }

    #[test]
    fn added_transactions_survive_a_reload() {
        let store = create_store();

        let mut state = FinanceState::load(store.clone()).unwrap();
        state.add_transaction(salary_draft()).unwrap();

        let reloaded = FinanceState::load(store).unwrap();

        assert_eq!(reloaded.transactions(), state.transactions());
    }

    #[test]
    fn manual_ids_are_sequential_across_reloads() {
        let store = create_store();

        let mut state = FinanceState::load(store.clone()).unwrap();
        let first = state.add_transaction(salary_draft()).unwrap();

        let mut reloaded = FinanceState::load(store).unwrap();
        let second = reloaded.add_transaction(salary_draft()).unwrap();

        assert_eq!(first.id(), &TransactionId::manual(1));
        assert_eq!(second.id(), &TransactionId::manual(2));
    }

    #[test]
    fn deleting_a_missing_transaction_fails() {
        let mut state = FinanceState::load(create_store()).unwrap();

        assert_eq!(
            state.delete_transaction(&TransactionId::manual(9)),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn deleting_a_derived_transaction_is_refused() {
        let mut state = FinanceState::load(create_store()).unwrap();
        state
            .set_period_filter(Some("2025-03".parse().unwrap()))
            .unwrap();
        state.upsert_recurring(rent_definition()).unwrap();

        let derived_id = state.transactions()[0].id().clone();

        assert_eq!(
            state.delete_transaction(&derived_id),
            Err(Error::DeleteDerivedTransaction)
        );
        assert_eq!(state.transactions().len(), 1);
    }

    #[test]
    fn deleting_a_manual_transaction_persists() {
        let store = create_store();
        let mut state = FinanceState::load(store.clone()).unwrap();
        let transaction = state.add_transaction(salary_draft()).unwrap();

        state.delete_transaction(transaction.id()).unwrap();

        let reloaded = FinanceState::load(store).unwrap();
        assert!(reloaded.transactions().is_empty());
    }

    #[test]
    fn upserting_a_recurring_payment_materializes_the_active_month() {
        let mut state = FinanceState::load(create_store()).unwrap();
        state
            .set_period_filter(Some("2025-03".parse().unwrap()))
            .unwrap();

        state.upsert_recurring(rent_definition()).unwrap();

        assert_eq!(state.transactions().len(), 1);
        assert_eq!(state.transactions()[0].date(), date!(2025 - 03 - 05));
        assert!(state.transactions()[0].is_recurrent());
    }

    #[test]
    fn changing_the_period_filter_regenerates_that_month() {
        let mut state = FinanceState::load(create_store()).unwrap();
        state
            .set_period_filter(Some("2025-03".parse().unwrap()))
            .unwrap();
        state.upsert_recurring(rent_definition()).unwrap();

        state
            .set_period_filter(Some("2025-02".parse().unwrap()))
            .unwrap();

        assert_eq!(state.transactions().len(), 1);
        assert_eq!(state.transactions()[0].date(), date!(2025 - 02 - 05));
    }

    #[test]
    fn deactivating_a_recurring_payment_stops_materialization() {
        let mut state = FinanceState::load(create_store()).unwrap();
        state
            .set_period_filter(Some("2025-03".parse().unwrap()))
            .unwrap();
        state.upsert_recurring(rent_definition()).unwrap();

        state.set_recurring_active("Rent", false).unwrap();

        assert!(state.transactions().is_empty());
        assert!(!state.recurring_payments()[0].active());
    }

    #[test]
    fn removing_a_recurring_payment_keeps_manual_entries() {
        let mut state = FinanceState::load(create_store()).unwrap();
        state
            .set_period_filter(Some("2025-03".parse().unwrap()))
            .unwrap();
        state.add_transaction(salary_draft()).unwrap();
        state.upsert_recurring(rent_definition()).unwrap();
        assert_eq!(state.transactions().len(), 2);

        state.remove_recurring("Rent").unwrap();

        assert_eq!(state.transactions().len(), 1);
        assert!(!state.transactions()[0].is_recurrent());
    }

    #[test]
    fn backfill_materializes_past_months() {
        let mut state = FinanceState::load(create_store()).unwrap();
        state.upsert_recurring(rent_definition()).unwrap();

        state.backfill_recurring().unwrap();

        // One instance per month from January 2025 through the current
        // month, so at least January, February and March.
        assert!(state.transactions().len() >= 3);
        assert_eq!(state.transactions()[0].date(), date!(2025 - 01 - 05));
    }

    #[test]
    fn filtered_transactions_honor_the_active_period() {
        let mut state = FinanceState::load(create_store()).unwrap();
        state
            .set_period_filter(Some("2025-03".parse().unwrap()))
            .unwrap();
        state.add_transaction(salary_draft()).unwrap();
        state
            .add_transaction(
                TransactionDraft::new(
                    date!(2025 - 04 - 01),
                    TransactionKind::Income,
                    "Salary",
                    5000.0,
                )
                .unwrap(),
            )
            .unwrap();

        let filtered = state.filtered_transactions();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date(), date!(2025 - 03 - 01));
        assert_eq!(state.transactions().len(), 2);
    }

    #[test]
    fn goal_achieved_flag_only_changes_by_explicit_call() {
        let store = create_store();
        let mut state = FinanceState::load(store.clone()).unwrap();
        let goal = Goal::new("Emergency Fund", 10_000.0, date!(2025 - 12 - 31)).unwrap();
        state.add_goal(goal).unwrap();
        assert!(!state.goals()[0].achieved());

        state.set_goal_achieved("Emergency Fund", true).unwrap();

        let reloaded = FinanceState::load(store).unwrap();
        assert!(reloaded.goals()[0].achieved());
    }

    #[test]
    fn currency_round_trips_as_a_plain_string() {
        let store = create_store();
        let mut state = FinanceState::load(store.clone()).unwrap();

        state.set_currency("USD").unwrap();

        assert_eq!(store.read("currency").unwrap(), Some("USD".to_string()));
        assert_eq!(FinanceState::load(store).unwrap().currency(), "USD");
    }

    #[test]
    fn clear_all_wipes_collections_and_blobs() {
        let store = create_store();
        let mut state = FinanceState::load(store.clone()).unwrap();
        state.add_transaction(salary_draft()).unwrap();
        state
            .add_goal(Goal::new("Emergency Fund", 10_000.0, date!(2025 - 12 - 31)).unwrap())
            .unwrap();

        state.clear_all().unwrap();

        assert!(state.transactions().is_empty());
        assert!(state.goals().is_empty());
        assert_eq!(store.read("transactions").unwrap(), None);
        assert_eq!(store.read("goals").unwrap(), None);
    }
}
