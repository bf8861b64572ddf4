//! The pre-commit hook that writes new states to the entity store.

use super::{Entity, EntityId, EntityState, PersistenceError, Repository};
use crate::core::{Event, Metadata, State};
use std::sync::Arc;

/// Hook invoked synchronously just before a machine commits a new state.
///
/// Returning an error aborts the transition: the machine keeps its previous
/// state and the rest of the cascade is discarded.
pub trait Interceptor<S: State, E: Event>: Send + Sync {
    fn before_state_change(
        &self,
        target: &S,
        event: &E,
        metadata: &Metadata,
    ) -> Result<(), PersistenceError>;
}

/// Interceptor that loads the entity named in the metadata, sets its state
/// and saves it back.
///
/// Events without the identity key are let through without writing anything.
/// An interceptor [bound](Self::bound_to) to one entity refuses metadata that
/// names any other.
pub struct RepositoryInterceptor<R: Repository> {
    repository: Arc<R>,
    identity_key: String,
    bound: Option<EntityId<R>>,
}

impl<R: Repository> RepositoryInterceptor<R> {
    pub fn new(repository: Arc<R>, identity_key: impl Into<String>) -> Self {
        Self {
            repository,
            identity_key: identity_key.into(),
            bound: None,
        }
    }

    /// Only ever write `id`.
    pub fn bound_to(mut self, id: EntityId<R>) -> Self {
        self.bound = Some(id);
        self
    }

    pub fn bound_id(&self) -> Option<&EntityId<R>> {
        self.bound.as_ref()
    }

    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    fn entity_id(&self, metadata: &Metadata) -> Result<Option<EntityId<R>>, PersistenceError> {
        let Some(value) = metadata.get(&self.identity_key) else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }

        let id: EntityId<R> =
            serde_json::from_value(value.clone()).map_err(|e| PersistenceError::InvalidIdentity {
                key: self.identity_key.clone(),
                reason: e.to_string(),
            })?;

        match &self.bound {
            Some(bound) if *bound != id => Err(PersistenceError::InvalidIdentity {
                key: self.identity_key.clone(),
                reason: format!("machine is bound to entity '{bound}', event names '{id}'"),
            }),
            _ => Ok(Some(id)),
        }
    }
}

impl<R, E> Interceptor<EntityState<R>, E> for RepositoryInterceptor<R>
where
    R: Repository,
    E: Event,
{
    fn before_state_change(
        &self,
        target: &EntityState<R>,
        event: &E,
        metadata: &Metadata,
    ) -> Result<(), PersistenceError> {
        let Some(id) = self.entity_id(metadata)? else {
            tracing::debug!(
                key = %self.identity_key,
                event = event.name(),
                "no entity id in metadata, skipping persistence"
            );
            return Ok(());
        };

        let mut entity = self.repository.load(&id)?;
        entity.set_state(target.clone());
        self.repository.save(entity).inspect_err(|e| {
            tracing::error!(entity = %id, to = target.name(), error = %e, "failed to persist state");
        })?;

        tracing::debug!(entity = %id, to = target.name(), "state persisted");
        Ok(())
    }
}
