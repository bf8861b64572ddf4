//! Context handed to guards, actions and decisions.

use super::metadata::Metadata;
use super::state::{Event, State};

/// View of a single transition attempt.
///
/// `state` is the machine's current state at the time the callback runs:
/// the source state while a guard is evaluated, and the committed target
/// state while an action runs.
#[derive(Debug)]
pub struct TransitionContext<'a, S: State, E: Event> {
    pub state: &'a S,
    pub source: &'a S,
    pub target: &'a S,
    pub event: &'a E,
    pub metadata: &'a Metadata,
}

impl<'a, S: State, E: Event> TransitionContext<'a, S, E> {
    /// Context for a guard: the machine still sits in `source`.
    pub fn before(source: &'a S, target: &'a S, event: &'a E, metadata: &'a Metadata) -> Self {
        Self {
            state: source,
            source,
            target,
            event,
            metadata,
        }
    }

    /// Context for an action: the machine has already committed `target`.
    pub fn after(source: &'a S, target: &'a S, event: &'a E, metadata: &'a Metadata) -> Self {
        Self {
            state: target,
            source,
            target,
            event,
            metadata,
        }
    }

    /// Self transitions leave the state unchanged but still commit.
    pub fn is_self_transition(&self) -> bool {
        self.source == self.target
    }
}
