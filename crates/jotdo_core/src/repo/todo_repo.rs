//! To-do repository contract and key-value implementation.
//!
//! # Responsibility
//! - Provide list/get/upsert/delete over the `todoItems` collection.
//! - Keep JSON blob details inside the storage boundary.
//!
//! # Invariants
//! - Writes call `TodoItem::validate()` before touching storage.
//! - Stored order is insertion order; upsert keeps an item's position.
//! - Malformed stored entries are skipped on read, never raised.

use crate::model::todo::{TodoId, TodoItem, TodoValidationError};
use crate::store::{load_list, save_list, KeyValueStore, StorageKey, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for to-do persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Store(StoreError),
    NotFound(TodoId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Data access contract for to-do items.
pub trait TodoRepository {
    fn list_todos(&self) -> RepoResult<Vec<TodoItem>>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoItem>>;
    /// Inserts a new item or replaces the item with the same id.
    fn upsert_todo(&mut self, todo: &TodoItem) -> RepoResult<()>;
    fn delete_todo(&mut self, id: TodoId) -> RepoResult<()>;
}

/// Repository persisting the whole collection as one JSON array.
pub struct KvTodoRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvTodoRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load(&self) -> Vec<TodoItem> {
        load_list(&self.store, StorageKey::TodoItems)
    }

    fn save(&mut self, todos: &[TodoItem]) -> RepoResult<()> {
        save_list(&mut self.store, StorageKey::TodoItems, todos)?;
        Ok(())
    }
}

impl<S: KeyValueStore> TodoRepository for KvTodoRepository<S> {
    fn list_todos(&self) -> RepoResult<Vec<TodoItem>> {
        Ok(self.load())
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoItem>> {
        Ok(self.load().into_iter().find(|todo| todo.id == id))
    }

    fn upsert_todo(&mut self, todo: &TodoItem) -> RepoResult<()> {
        todo.validate()?;
        let mut todos = self.load();
        match todos.iter_mut().find(|existing| existing.id == todo.id) {
            Some(existing) => *existing = todo.clone(),
            None => todos.push(todo.clone()),
        }
        self.save(&todos)
    }

    fn delete_todo(&mut self, id: TodoId) -> RepoResult<()> {
        let mut todos = self.load();
        let before = todos.len();
        todos.retain(|todo| todo.id != id);
        if todos.len() == before {
            return Err(RepoError::NotFound(id));
        }
        self.save(&todos)
    }
}
