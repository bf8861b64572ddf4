//! Persistence of machine state into an external entity store.
//!
//! The engine never owns entity records. It talks to storage through two
//! seams:
//! - [`Repository`]: loads and saves entities
//! - [`Interceptor`]: called just before a transition commits, so the new
//!   state reaches the store within the same logical operation
//!
//! [`RepositoryInterceptor`] connects the two, reading the entity id from
//! event metadata.

mod error;
mod interceptor;
mod memory;

pub use error::PersistenceError;
pub use interceptor::{Interceptor, RepositoryInterceptor};
pub use memory::InMemoryRepository;

use crate::core::State;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A business record whose lifecycle is driven by a machine.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identity, also carried in event metadata.
    type Id: Clone
        + Eq
        + Hash
        + Debug
        + Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// The machine's state vocabulary.
    type State: State;

    fn id(&self) -> Self::Id;

    fn state(&self) -> &Self::State;

    fn set_state(&mut self, state: Self::State);
}

/// Identity type of a repository's entities.
pub type EntityId<R> = <<R as Repository>::Entity as Entity>::Id;

/// State type of a repository's entities.
pub type EntityState<R> = <<R as Repository>::Entity as Entity>::State;

/// Storage collaborator for entity records.
///
/// Implementations provide whatever transactional guarantees their backing
/// store has; the engine assumes `save` is atomic per entity.
pub trait Repository: Send + Sync {
    type Entity: Entity;

    fn load(&self, id: &EntityId<Self>) -> Result<Self::Entity, PersistenceError>;

    fn save(&self, entity: Self::Entity) -> Result<Self::Entity, PersistenceError>;
}
