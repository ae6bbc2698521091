//! Repository collaborator with push-style queries
//!
//! Controllers only see the [`ExpenseRepository`] trait. A query returns a
//! [`Subscription`]: the current result is delivered immediately and a new
//! one after every mutation. Results travel over an `mpsc` channel, so the
//! subscriber decides on which thread they are applied.

use crate::error::{RepositoryError, RepositoryResult};
use crate::model::expense::{Category, CategoryId, Expense, ExpenseId, ExpenseWithCategory, NewExpense};
use crate::services::store::ExpenseStore;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// One delivery on a subscription
pub type QueryResult = Result<Vec<ExpenseWithCategory>, RepositoryError>;

/// Push-style data source consumed by the screen controllers
pub trait ExpenseRepository: Send + Sync {
    /// Expenses that carry a photo, joined with their category
    fn observe_expenses_with_photos_and_category(&self) -> Subscription;

    /// All expenses joined with their category
    fn observe_expenses_with_category(&self) -> Subscription;

    /// Request deletion; completion is observed through subscriptions
    fn delete(&self, id: ExpenseId);

    /// Create an expense at `timestamp` and return its new id
    fn insert(&self, expense: NewExpense, timestamp: i64) -> RepositoryResult<ExpenseId>;

    /// Current category table
    fn categories(&self) -> Vec<Category>;
}

/// Receiving end of a push-style query
///
/// Dropping the subscription unregisters it from its source exactly once.
pub struct Subscription {
    receiver: Receiver<QueryResult>,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(receiver: Receiver<QueryResult>, unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            receiver,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Everything delivered since the last call, oldest first
    pub fn drain(&self) -> Vec<QueryResult> {
        let mut results = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(result) => results.push(result),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        results
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// Which projection a subscriber asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Query {
    WithCategory,
    WithPhotosAndCategory,
}

struct Subscriber {
    id: u64,
    query: Query,
    sender: Sender<QueryResult>,
}

struct RepoState {
    store: ExpenseStore,
    expenses: Vec<Expense>,
    categories: Vec<Category>,
    subscribers: Vec<Subscriber>,
    next_subscriber_id: u64,
    /// Never reused, even after the highest id is deleted
    next_expense_id: u64,
}

impl RepoState {
    fn project(&self, query: Query) -> Vec<ExpenseWithCategory> {
        let by_id: HashMap<CategoryId, &Category> =
            self.categories.iter().map(|c| (c.id, c)).collect();

        let mut rows: Vec<ExpenseWithCategory> = self
            .expenses
            .iter()
            .filter(|e| query == Query::WithCategory || e.photo_uri.is_some())
            .map(|e| {
                let category = e.category_id.and_then(|id| by_id.get(&id).copied());
                ExpenseWithCategory::join(e, category)
            })
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows
    }

    /// Push the current projections, dropping subscribers that went away
    fn publish(&mut self) {
        let mut cache: HashMap<Query, Vec<ExpenseWithCategory>> = HashMap::new();
        let mut live = Vec::with_capacity(self.subscribers.len());

        for subscriber in std::mem::take(&mut self.subscribers) {
            let rows = cache
                .entry(subscriber.query)
                .or_insert_with(|| self.project(subscriber.query))
                .clone();
            if subscriber.sender.send(Ok(rows)).is_ok() {
                live.push(subscriber);
            }
        }
        self.subscribers = live;
    }

    fn new(store: ExpenseStore, expenses: Vec<Expense>, categories: Vec<Category>) -> Self {
        let mut state = Self {
            store,
            expenses: Vec::new(),
            categories,
            subscribers: Vec::new(),
            next_subscriber_id: 0,
            next_expense_id: 1,
        };
        state.replace_expenses(expenses);
        state
    }

    /// Swap in a new table, keeping the id counter above every known id
    fn replace_expenses(&mut self, expenses: Vec<Expense>) {
        let highest = expenses.iter().map(|e| e.id.0).max().unwrap_or(0);
        self.next_expense_id = self.next_expense_id.max(highest.saturating_add(1));
        self.expenses = expenses;
    }

    /// Write `candidate` and only then make it the live table
    fn commit(&mut self, candidate: Vec<Expense>) -> RepositoryResult<()> {
        self.store.save(&candidate)?;
        self.replace_expenses(candidate);
        self.publish();
        Ok(())
    }
}

/// Repository over an [`ExpenseStore`] and a category table
#[derive(Clone)]
pub struct LocalRepository {
    state: Arc<Mutex<RepoState>>,
}

impl LocalRepository {
    /// Load the store and build the repository
    pub fn open(store: ExpenseStore, categories: Vec<Category>) -> RepositoryResult<Self> {
        let expenses = store.load()?;
        tracing::info!(
            "loaded {} expenses and {} categories",
            expenses.len(),
            categories.len()
        );
        Ok(Self {
            state: Arc::new(Mutex::new(RepoState::new(store, expenses, categories))),
        })
    }

    /// Repository that never touches the disk
    pub fn in_memory(expenses: Vec<Expense>, categories: Vec<Category>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RepoState::new(
                ExpenseStore::in_memory(),
                expenses,
                categories,
            ))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RepoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert many expenses with a single write
    pub fn import(&self, rows: Vec<(NewExpense, i64)>) -> RepositoryResult<usize> {
        let mut state = self.lock();
        let count = rows.len();
        let mut candidate = state.expenses.clone();
        let mut next_id = state.next_expense_id;
        for (new, timestamp) in rows {
            candidate.push(Expense {
                id: ExpenseId(next_id),
                product_name: new.product_name,
                amount: new.amount,
                category_id: new.category_id,
                timestamp,
                photo_uri: new.photo_uri,
            });
            next_id += 1;
        }
        state.commit(candidate)?;
        Ok(count)
    }

    /// Number of live subscriptions
    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn subscribe(&self, query: Query) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        let mut state = self.lock();

        // A file-backed store is re-read so that a fresh query sees external edits
        let mut reloaded = Ok(());
        if state.store.path().is_some() {
            match state.store.load() {
                Ok(expenses) if expenses != state.expenses => {
                    tracing::info!("expense file changed on disk, {} records", expenses.len());
                    state.replace_expenses(expenses);
                    // Existing subscribers see the same data set as the new one
                    state.publish();
                }
                Ok(_) => {}
                Err(e) => reloaded = Err(e),
            }
        }
        match reloaded {
            Ok(()) => {
                let _ = sender.send(Ok(state.project(query)));
            }
            Err(e) => {
                tracing::warn!("reloading expenses failed: {}", e);
                let _ = sender.send(Err(e));
            }
        }

        let id = state.next_subscriber_id;
        state.next_subscriber_id += 1;
        state.subscribers.push(Subscriber { id, query, sender });
        tracing::debug!("subscriber {} registered for {:?}", id, query);

        let registry: Weak<Mutex<RepoState>> = Arc::downgrade(&self.state);
        Subscription::new(receiver, move || {
            if let Some(state) = registry.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.subscribers.retain(|s| s.id != id);
                tracing::debug!("subscriber {} released", id);
            }
        })
    }
}

impl ExpenseRepository for LocalRepository {
    fn observe_expenses_with_photos_and_category(&self) -> Subscription {
        self.subscribe(Query::WithPhotosAndCategory)
    }

    fn observe_expenses_with_category(&self) -> Subscription {
        self.subscribe(Query::WithCategory)
    }

    fn delete(&self, id: ExpenseId) {
        let mut state = self.lock();
        let mut candidate = state.expenses.clone();
        candidate.retain(|e| e.id != id);
        if candidate.len() == state.expenses.len() {
            tracing::debug!("delete of unknown expense {}", id);
            return;
        }

        match state.commit(candidate) {
            Ok(()) => tracing::info!("deleted expense {}", id),
            Err(e) => tracing::warn!("delete of {} not saved, kept: {}", id, e),
        }
    }

    fn insert(&self, expense: NewExpense, timestamp: i64) -> RepositoryResult<ExpenseId> {
        let expense = expense.validate().map_err(RepositoryError::Validation)?;

        let mut state = self.lock();
        let id = ExpenseId(state.next_expense_id);
        let mut candidate = state.expenses.clone();
        candidate.push(Expense {
            id,
            product_name: expense.product_name,
            amount: expense.amount,
            category_id: expense.category_id,
            timestamp,
            photo_uri: expense.photo_uri,
        });
        state.commit(candidate)?;
        tracing::info!("inserted expense {}", id);
        Ok(id)
    }

    fn categories(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }
}
