//! The dispatcher: a machine instance bound to one entity.

use super::action::EventSink;
use super::outcome::{Cascade, RejectionReason, SendError, SendOutcome, TransitionRejected};
use super::table::TransitionTable;
use crate::builder::ConfigurationError;
use crate::core::{Event, Metadata, State, StateHistory, StateTransition, TransitionContext};
use crate::persistence::Interceptor;
use crate::settings::EngineConfig;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback notified with `(from, to)` after every committed transition.
pub type Listener<S> = Arc<dyn Fn(&S, &S) + Send + Sync>;

/// Result of processing one event from the work queue.
enum Step<S: State, E: Event> {
    Committed(Vec<(E, Metadata)>),
    Rejected(TransitionRejected<S, E>),
}

/// A running state machine.
///
/// Owns the current state and processes events synchronously: `send`
/// returns only after every event emitted by actions has been drained.
/// One instance serves one entity for one unit of work; instances are not
/// meant to be shared between threads.
pub struct Machine<S: State, E: Event> {
    current: S,
    table: Arc<TransitionTable<S, E>>,
    interceptor: Option<Arc<dyn Interceptor<S, E>>>,
    listeners: Vec<Listener<S>>,
    history: StateHistory<S, E>,
    cascade_limit: usize,
    deadline: Option<Duration>,
}

impl<S: State, E: Event> Machine<S, E> {
    /// Create a machine in `state`, which must be declared by the table.
    pub fn new(table: Arc<TransitionTable<S, E>>, state: S) -> Result<Self, ConfigurationError> {
        if !table.is_declared(&state) {
            return Err(ConfigurationError::UndeclaredState {
                state: state.name().to_string(),
                role: "the machine's current state",
            });
        }

        let defaults = EngineConfig::default();
        Ok(Self {
            current: state,
            table,
            interceptor: None,
            listeners: Vec::new(),
            history: StateHistory::new(),
            cascade_limit: defaults.cascade_limit,
            deadline: defaults.deadline(),
        })
    }

    /// Create a machine in the table's initial state.
    pub fn start(table: Arc<TransitionTable<S, E>>) -> Self {
        let initial = table.initial().clone();
        let defaults = EngineConfig::default();
        Self {
            current: initial,
            table,
            interceptor: None,
            listeners: Vec::new(),
            history: StateHistory::new(),
            cascade_limit: defaults.cascade_limit,
            deadline: defaults.deadline(),
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor<S, E>>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Apply cascade limit and deadline from configuration.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.cascade_limit = config.cascade_limit.max(1);
        self.deadline = config.deadline();
        self
    }

    /// Limit the events one `send` may process. A limit of zero is raised
    /// to one so the triggering event is always processed.
    pub fn with_cascade_limit(mut self, limit: usize) -> Self {
        self.cascade_limit = limit.max(1);
        self
    }

    pub fn cascade_limit(&self) -> usize {
        self.cascade_limit
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(&S, &S) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    pub(crate) fn add_shared_listener(&mut self, listener: Listener<S>) {
        self.listeners.push(listener);
    }

    pub fn current_state(&self) -> &S {
        &self.current
    }

    pub fn is_terminal(&self) -> bool {
        self.table.is_terminal(&self.current)
    }

    pub fn history(&self) -> &StateHistory<S, E> {
        &self.history
    }

    pub fn table(&self) -> &Arc<TransitionTable<S, E>> {
        &self.table
    }

    pub(crate) fn restore_history(&mut self, history: StateHistory<S, E>) {
        self.history = history;
    }

    /// Deliver an event and drain the cascade it triggers.
    ///
    /// Returns `Rejected` if the event itself matches no rule or fails its
    /// guard. Otherwise returns `Accepted` with the state reached after every
    /// cascaded event was processed; cascaded events that are rejected are
    /// dropped and listed in the outcome.
    ///
    /// On a persistence error the state stays at its last committed value.
    /// On an action error the transition that ran the action stays
    /// committed. In both cases the remaining queued events are discarded.
    ///
    /// The deadline, if set, is checked before every event and after every
    /// committed step, so time spent saving and running actions counts.
    pub fn send(&mut self, event: E, metadata: Metadata) -> Result<SendOutcome<S, E>, SendError<S>> {
        let started = Instant::now();
        let history_mark = self.history.len();
        let mut queue = VecDeque::from([(event, metadata)]);
        let mut dropped = Vec::new();
        let mut processed = 0usize;

        while let Some((event, metadata)) = queue.pop_front() {
            processed += 1;
            if processed > self.cascade_limit {
                tracing::error!(
                    limit = self.cascade_limit,
                    state = self.current.name(),
                    "cascade limit exceeded"
                );
                return Err(ConfigurationError::CascadeLimitExceeded {
                    limit: self.cascade_limit,
                }
                .into());
            }

            self.check_deadline(started)?;

            match self.step(&event, &metadata, processed)? {
                Step::Committed(emitted) => {
                    self.check_deadline(started)?;
                    queue.extend(emitted);
                }
                Step::Rejected(rejected) if processed == 1 => {
                    return Ok(SendOutcome::Rejected(rejected));
                }
                Step::Rejected(rejected) => {
                    tracing::warn!(
                        state = rejected.state.name(),
                        event = rejected.event.name(),
                        reason = ?rejected.reason,
                        "cascaded event dropped"
                    );
                    dropped.push(rejected);
                }
            }
        }

        Ok(SendOutcome::Accepted(Cascade {
            final_state: self.current.clone(),
            transitions: self.history.since(history_mark).to_vec(),
            dropped,
        }))
    }

    /// Run lookup, guard, interceptor, commit and action for one event.
    fn step(&mut self, event: &E, metadata: &Metadata, depth: usize) -> Result<Step<S, E>, SendError<S>> {
        let table = Arc::clone(&self.table);

        if table.is_terminal(&self.current) {
            return Ok(self.reject(event, RejectionReason::NoMatchingRule));
        }
        let Some(rule) = table.rule(&self.current, event) else {
            return Ok(self.reject(event, RejectionReason::NoMatchingRule));
        };

        let guard_ctx = TransitionContext::before(&self.current, &rule.target, event, metadata);
        if !rule.permits(&guard_ctx) {
            return Ok(self.reject(event, RejectionReason::GuardFailed));
        }

        if let Some(interceptor) = &self.interceptor {
            interceptor.before_state_change(&rule.target, event, metadata)?;
        }

        let from = std::mem::replace(&mut self.current, rule.target.clone());
        self.history = self.history.record(StateTransition {
            from: from.clone(),
            to: self.current.clone(),
            event: event.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(
            from = from.name(),
            to = self.current.name(),
            event = event.name(),
            depth,
            "transition committed"
        );
        for listener in &self.listeners {
            listener(&from, &self.current);
        }

        let Some(action) = &rule.action else {
            return Ok(Step::Committed(Vec::new()));
        };

        let mut sink = EventSink::new();
        let action_ctx = TransitionContext::after(&from, &self.current, event, metadata);
        action.run(&action_ctx, &mut sink).map_err(|source| {
            tracing::warn!(
                state = self.current.name(),
                event = event.name(),
                error = %source,
                "action failed after commit"
            );
            SendError::ActionExecution {
                committed: self.current.clone(),
                source,
            }
        })?;

        Ok(Step::Committed(sink.into_events()))
    }

    /// Fails once the time since `started` passes the deadline. Transitions
    /// already committed stay committed.
    fn check_deadline(&self, started: Instant) -> Result<(), SendError<S>> {
        let Some(deadline) = self.deadline else {
            return Ok(());
        };
        let elapsed = started.elapsed();
        if elapsed > deadline {
            tracing::warn!(
                ?deadline,
                ?elapsed,
                state = self.current.name(),
                "send deadline exceeded"
            );
            return Err(SendError::DeadlineExceeded { deadline, elapsed });
        }
        Ok(())
    }

    fn reject(&self, event: &E, reason: RejectionReason) -> Step<S, E> {
        tracing::debug!(
            state = self.current.name(),
            event = event.name(),
            ?reason,
            "event rejected"
        );
        Step::Rejected(TransitionRejected {
            state: self.current.clone(),
            event: event.clone(),
            reason,
        })
    }
}

impl<S: State, E: Event> std::fmt::Debug for Machine<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .field("history", &self.history.len())
            .field("cascade_limit", &self.cascade_limit)
            .field("deadline", &self.deadline)
            .finish()
    }
}
