//! Produces machine instances bound to persisted entities.
//!
//! Every call builds a fresh instance from the entity's persisted state;
//! instances are never cached, so callers must not rely on instance identity
//! across requests for the same entity.

use crate::builder::ConfigurationError;
use crate::core::Event;
use crate::engine::{Listener, Machine, TransitionTable};
use crate::persistence::{
    Entity, EntityId, EntityState, PersistenceError, Repository, RepositoryInterceptor,
};
use crate::settings::EngineConfig;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while creating a machine for an entity.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Loading entity failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Machine factory for the entities of one repository.
///
/// `get_or_create` is lock-free and leaves single-writer discipline to the
/// caller. `with_machine` serialises units of work per entity id, so two
/// concurrent requests for the same entity cannot interleave their
/// load/commit sequences within this process.
pub struct MachineFactory<R: Repository, E: Event> {
    table: Arc<TransitionTable<EntityState<R>, E>>,
    repository: Arc<R>,
    config: EngineConfig,
    listeners: Vec<Listener<EntityState<R>>>,
    locks: DashMap<EntityId<R>, Arc<Mutex<()>>>,
}

impl<R: Repository + 'static, E: Event> MachineFactory<R, E> {
    pub fn new(
        table: Arc<TransitionTable<EntityState<R>, E>>,
        repository: Arc<R>,
        config: EngineConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            table,
            repository,
            config,
            listeners: Vec::new(),
            locks: DashMap::new(),
        })
    }

    /// Install a listener on every machine this factory creates.
    pub fn with_listener(mut self, listener: Listener<EntityState<R>>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn table(&self) -> &Arc<TransitionTable<EntityState<R>, E>> {
        &self.table
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build a fresh machine for `id`, restored to the entity's persisted
    /// state and wired to persist every transition back to the repository.
    ///
    /// The machine only writes `id`: events whose metadata names another
    /// entity fail with [`PersistenceError::InvalidIdentity`] before commit.
    pub fn get_or_create(&self, id: &EntityId<R>) -> Result<Machine<EntityState<R>, E>, FactoryError> {
        let entity = self.repository.load(id)?;
        let state = entity.state().clone();

        let interceptor =
            RepositoryInterceptor::new(Arc::clone(&self.repository), self.config.identity_key.clone())
                .bound_to(id.clone());
        let mut machine = Machine::new(Arc::clone(&self.table), state)?
            .with_config(&self.config)
            .with_interceptor(Arc::new(interceptor));
        for listener in &self.listeners {
            machine.add_shared_listener(Arc::clone(listener));
        }

        tracing::debug!(entity = %id, state = ?machine.current_state(), "machine created");
        Ok(machine)
    }

    /// Run one unit of work against a fresh machine while holding the
    /// entity's lock.
    pub fn with_machine<T, F>(&self, id: &EntityId<R>, work: F) -> Result<T, FactoryError>
    where
        F: FnOnce(&mut Machine<EntityState<R>, E>) -> T,
    {
        let lock = self
            .locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock();
            self.get_or_create(id).map(|mut machine| work(&mut machine))
        };

        drop(lock);
        self.locks.remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    /// Number of entities currently holding or waiting for a lock.
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TransitionTableBuilder;
    use crate::core::Metadata;
    use crate::engine::SendError;
    use crate::persistence::InMemoryRepository;
    use crate::{event_enum, state_enum};
    use std::sync::atomic::{AtomicUsize, Ordering};

    state_enum! {
        enum Stage { Fresh, Started, Done, Unknown }
    }

    event_enum! {
        enum Move { Start, Finish }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Job {
        id: u64,
        stage: Stage,
    }

    impl Entity for Job {
        type Id = u64;
        type State = Stage;

        fn id(&self) -> u64 {
            self.id
        }

        fn state(&self) -> &Stage {
            &self.stage
        }

        fn set_state(&mut self, state: Stage) {
            self.stage = state;
        }
    }

    fn factory() -> (Arc<InMemoryRepository<Job>>, MachineFactory<InMemoryRepository<Job>, Move>) {
        let table = TransitionTableBuilder::new()
            .states([Stage::Fresh, Stage::Started, Stage::Done])
            .initial(Stage::Fresh)
            .terminal(Stage::Done)
            .add_transition(Stage::Fresh, Move::Start, Stage::Started, None, None)
            .add_transition(Stage::Started, Move::Finish, Stage::Done, None, None)
            .build()
            .unwrap();
        let repository = Arc::new(InMemoryRepository::new());
        let factory =
            MachineFactory::new(Arc::new(table), Arc::clone(&repository), EngineConfig::default())
                .unwrap();
        (repository, factory)
    }

    #[test]
    fn resumes_from_persisted_state() {
        let (repository, factory) = factory();
        repository.insert(Job {
            id: 1,
            stage: Stage::Started,
        });

        let machine = factory.get_or_create(&1).unwrap();

        assert_eq!(machine.current_state(), &Stage::Started);
        assert_eq!(factory.table().initial(), &Stage::Fresh);
    }

    #[test]
    fn each_call_builds_an_independent_instance() {
        let (repository, factory) = factory();
        repository.insert(Job {
            id: 1,
            stage: Stage::Fresh,
        });

        let mut first = factory.get_or_create(&1).unwrap();
        first.send(Move::Start, Metadata::new()).unwrap();

        let second = factory.get_or_create(&1).unwrap();
        assert_eq!(first.current_state(), &Stage::Started);
        assert_eq!(second.current_state(), &Stage::Fresh);
        assert!(second.history().is_empty());
    }

    #[test]
    fn created_machines_persist_transitions() {
        let (repository, factory) = factory();
        repository.insert(Job {
            id: 9,
            stage: Stage::Fresh,
        });

        let mut machine = factory.get_or_create(&9).unwrap();
        machine
            .send(Move::Start, Metadata::new().with("entity_id", 9))
            .unwrap();

        assert_eq!(repository.load(&9).unwrap().stage, Stage::Started);
    }

    #[test]
    fn missing_entity_is_a_persistence_error() {
        let (_, factory) = factory();

        let result = factory.get_or_create(&404);

        assert!(matches!(
            result,
            Err(FactoryError::Persistence(PersistenceError::NotFound { .. }))
        ));
    }

    #[test]
    fn undeclared_persisted_state_is_rejected() {
        let (repository, factory) = factory();
        repository.insert(Job {
            id: 2,
            stage: Stage::Unknown,
        });

        let result = factory.get_or_create(&2);

        assert!(matches!(
            result,
            Err(FactoryError::Configuration(ConfigurationError::UndeclaredState { .. }))
        ));
    }

    #[test]
    fn listeners_are_installed_on_every_machine() {
        let (repository, factory) = factory();
        repository.insert(Job {
            id: 3,
            stage: Stage::Fresh,
        });
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let factory = factory.with_listener(Arc::new(move |_: &Stage, _: &Stage| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let mut machine = factory.get_or_create(&3).unwrap();
        machine.send(Move::Start, Metadata::new()).unwrap();
        machine.send(Move::Finish, Metadata::new()).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn machine_refuses_events_for_another_entity() {
        let (repository, factory) = factory();
        repository.insert(Job {
            id: 1,
            stage: Stage::Fresh,
        });
        repository.insert(Job {
            id: 2,
            stage: Stage::Fresh,
        });

        let (result, state) = factory
            .with_machine(&1, |machine| {
                let result = machine.send(Move::Start, Metadata::new().with("entity_id", 2));
                (result, machine.current_state().clone())
            })
            .unwrap();

        assert!(matches!(
            result,
            Err(SendError::Persistence(PersistenceError::InvalidIdentity { .. }))
        ));
        assert_eq!(state, Stage::Fresh);
        assert!(repository.journal().is_empty());
        assert_eq!(repository.load(&2).unwrap().stage, Stage::Fresh);
    }

    #[test]
    fn with_machine_releases_entity_lock() {
        let (repository, factory) = factory();
        repository.insert(Job {
            id: 4,
            stage: Stage::Fresh,
        });

        let state = factory
            .with_machine(&4, |machine| {
                machine
                    .send(Move::Start, Metadata::new().with("entity_id", 4))
                    .unwrap();
                machine.current_state().clone()
            })
            .unwrap();

        assert_eq!(state, Stage::Started);
        assert_eq!(factory.active_locks(), 0);
    }

    #[test]
    fn with_machine_serialises_concurrent_work_per_entity() {
        let (repository, factory) = factory();
        repository.insert(Job {
            id: 5,
            stage: Stage::Fresh,
        });
        let factory = Arc::new(factory);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let factory = Arc::clone(&factory);
                std::thread::spawn(move || {
                    factory
                        .with_machine(&5, |machine| {
                            machine
                                .send(Move::Start, Metadata::new().with("entity_id", 5))
                                .unwrap()
                                .is_accepted()
                        })
                        .unwrap()
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|accepted| *accepted)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(repository.writes_for(&5), vec![Stage::Started]);
    }
}
