//! The expense store: the in-memory list of expenses and the single source of truth for them.
//!
//! Every mutation is written through to the `Storage` immediately. When that write fails the
//! in-memory change is kept and the error is returned, so the caller can tell the user that the
//! change is not yet durable.

use crate::error::StoreError;
use crate::model::{Expense, ExpenseId, ExpenseUpdates, NewExpense};
use crate::storage::{Storage, StorageInfo};
use std::collections::HashSet;
use tracing::{debug, warn};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// An ordered collection of expenses backed by a `Storage`.
#[derive(Debug)]
pub struct ExpenseStore<S: Storage> {
    storage: S,
    expenses: Vec<Expense>,
}

impl<S: Storage> ExpenseStore<S> {
    /// Hydrates the store from `storage`. Records with a missing or repeated id are given a fresh
    /// one so that ids are unique from the start.
    pub fn open(storage: S) -> Self {
        let mut expenses = storage.load();
        let reassigned = ensure_unique_ids(&mut expenses);
        if reassigned > 0 {
            warn!("Assigned new ids to {reassigned} stored expenses with missing or repeated ids");
        }
        debug!("Opened expense store with {} expenses", expenses.len());
        Self { storage, expenses }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| &e.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.storage.info()
    }

    /// Adds an expense, assigning a fresh id when none is supplied, and returns the stored record.
    pub fn add(&mut self, new: NewExpense) -> StoreResult<Expense> {
        let id = match new.id.clone().filter(|id| !id.is_empty()) {
            Some(id) if self.get(&id).is_some() => return Err(StoreError::DuplicateId(id)),
            Some(id) => id,
            None => self.fresh_id(),
        };
        let expense = new.into_expense(id);
        debug!("Adding expense {}", expense.id);
        self.expenses.push(expense.clone());
        self.persist()?;
        Ok(expense)
    }

    /// Replaces the expense with `id` by one with `updates` applied. Fails with `NotFound` when no
    /// expense has that id.
    pub fn update(&mut self, id: &ExpenseId, updates: ExpenseUpdates) -> StoreResult<Expense> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let updated = updates.apply(&self.expenses[index]);
        debug!("Updating expense {id}");
        self.expenses[index] = updated.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Removes the expense with `id` and returns it. Returns `None`, and writes nothing, when no
    /// expense has that id.
    pub fn remove(&mut self, id: &ExpenseId) -> StoreResult<Option<Expense>> {
        let Some(index) = self.position(id) else {
            debug!("No expense {id} to remove");
            return Ok(None);
        };
        let removed = self.expenses.remove(index);
        self.persist()?;
        Ok(Some(removed))
    }

    /// Replaces every expense with `expenses`.
    pub fn replace_all(&mut self, mut expenses: Vec<Expense>) -> StoreResult<()> {
        let reassigned = ensure_unique_ids(&mut expenses);
        if reassigned > 0 {
            debug!("Assigned new ids to {reassigned} replacement expenses");
        }
        self.expenses = expenses;
        self.persist()
    }

    /// Removes every expense.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.expenses.clear();
        self.persist()
    }

    fn position(&self, id: &ExpenseId) -> Option<usize> {
        self.expenses.iter().position(|e| &e.id == id)
    }

    fn fresh_id(&self) -> ExpenseId {
        loop {
            let id = ExpenseId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) -> StoreResult<()> {
        self.storage.save(&self.expenses).map_err(|e| {
            warn!("Failed to save {} expenses: {e}", self.expenses.len());
            StoreError::from(e)
        })
    }
}

/// Gives a fresh id to every expense whose id is empty or already used by an earlier expense.
/// Returns how many ids were assigned.
fn ensure_unique_ids(expenses: &mut [Expense]) -> usize {
    let mut seen: HashSet<ExpenseId> = expenses
        .iter()
        .filter(|e| !e.id.is_empty())
        .map(|e| e.id.clone())
        .collect();
    let mut first_use = HashSet::new();
    let mut reassigned = 0;
    for expense in expenses.iter_mut() {
        if !expense.id.is_empty() && first_use.insert(expense.id.clone()) {
            continue;
        }
        let id = loop {
            let id = ExpenseId::generate();
            if seen.insert(id.clone()) {
                break id;
            }
        };
        expense.set_id(id);
        reassigned += 1;
    }
    reassigned
}
