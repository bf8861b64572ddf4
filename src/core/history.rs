//! State transition history tracking.
//!
//! Every transition a machine commits is recorded here, in order, so callers
//! can inspect what one `send` call (and its cascade) actually did.

use super::state::{Event, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use waypoint::core::StateTransition;
/// use waypoint::{event_enum, state_enum};
/// use chrono::Utc;
///
/// state_enum! {
///     enum TaskState { Pending, Running }
/// }
///
/// event_enum! {
///     enum TaskEvent { Start }
/// }
///
/// let transition = StateTransition {
///     from: TaskState::Pending,
///     to: TaskState::Running,
///     event: TaskEvent::Start,
///     timestamp: Utc::now(),
/// };
/// assert!(!transition.is_self_transition());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State, E: Event> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// The event that fired the rule
    pub event: E,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

impl<S: State, E: Event> StateTransition<S, E> {
    pub fn is_self_transition(&self) -> bool {
        self.from == self.to
    }
}

/// Ordered history of state transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{StateHistory, StateTransition};
/// use waypoint::{event_enum, state_enum};
/// use chrono::Utc;
///
/// state_enum! {
///     enum WorkState { Start, Middle, End }
/// }
///
/// event_enum! {
///     enum Step { Advance }
/// }
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: WorkState::Start,
///         to: WorkState::Middle,
///         event: Step::Advance,
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: WorkState::Middle,
///         to: WorkState::End,
///         event: Step::Advance,
///         timestamp: Utc::now(),
///     });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // Start -> Middle -> End
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State, E: Event> {
    transitions: Vec<StateTransition<S, E>>,
}

impl<S: State, E: Event> Default for StateHistory<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event> StateHistory<S, E> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition<S, E>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: the first source state, then
    /// the `to` state of each transition. Self transitions repeat a state.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions.
    pub fn transitions(&self) -> &[StateTransition<S, E>] {
        &self.transitions
    }

    /// Transitions recorded after the first `offset` entries.
    pub fn since(&self, offset: usize) -> &[StateTransition<S, E>] {
        self.transitions.get(offset..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
