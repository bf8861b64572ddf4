//! In-memory entity store.

use super::{Entity, EntityId, PersistenceError, Repository};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

/// Thread-safe repository backed by a `HashMap`.
///
/// Every `save` is also appended to a write journal, which makes the
/// sequence of persisted states observable. Saves can be made to fail with
/// [`fail_saves_after`](Self::fail_saves_after).
pub struct InMemoryRepository<T: Entity> {
    entities: RwLock<HashMap<T::Id, T>>,
    journal: Mutex<Vec<(T::Id, T::State)>>,
    save_budget: Mutex<Option<usize>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            journal: Mutex::new(Vec::new()),
            save_budget: Mutex::new(None),
        }
    }

    /// Let the next `successes` saves through, then fail every save with
    /// [`PersistenceError::Unavailable`].
    pub fn fail_saves_after(&self, successes: usize) {
        *self.save_budget.lock() = Some(successes);
    }

    /// Stop injecting save failures.
    pub fn heal(&self) {
        *self.save_budget.lock() = None;
    }

    /// Store an entity without recording a journal entry.
    pub fn insert(&self, entity: T) -> T {
        self.entities.write().insert(entity.id(), entity.clone());
        entity
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// States saved for one entity, oldest first.
    pub fn writes_for(&self, id: &T::Id) -> Vec<T::State> {
        self.journal
            .lock()
            .iter()
            .filter(|(written, _)| written == id)
            .map(|(_, state)| state.clone())
            .collect()
    }

    /// Every save, oldest first.
    pub fn journal(&self) -> Vec<(T::Id, T::State)> {
        self.journal.lock().clone()
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Repository for InMemoryRepository<T> {
    type Entity = T;

    fn load(&self, id: &EntityId<Self>) -> Result<T, PersistenceError> {
        self.entities
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound { id: id.to_string() })
    }

    fn save(&self, entity: T) -> Result<T, PersistenceError> {
        let id = entity.id();
        if let Some(remaining) = self.save_budget.lock().as_mut() {
            if *remaining == 0 {
                return Err(PersistenceError::Unavailable(format!(
                    "injected failure saving '{id}'"
                )));
            }
            *remaining -= 1;
        }
        self.journal.lock().push((id.clone(), entity.state().clone()));
        self.entities.write().insert(id, entity.clone());
        Ok(entity)
    }
}
