//! Results of delivering an event to a machine.

use super::action::ActionError;
use crate::builder::ConfigurationError;
use crate::core::{Event, State, StateTransition};
use crate::persistence::PersistenceError;
use std::time::Duration;
use thiserror::Error;

/// Why an event did not fire a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionReason {
    /// No rule for `(current state, event)`, or the machine is in a terminal state.
    NoMatchingRule,
    /// A rule matched but its guard returned `false`.
    GuardFailed,
}

/// An event that was dropped without changing state.
///
/// This is an expected outcome, not an error.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRejected<S: State, E: Event> {
    pub state: S,
    pub event: E,
    pub reason: RejectionReason,
}

/// Transitions applied by one `send` call, including its cascade.
#[derive(Clone, Debug, PartialEq)]
pub struct Cascade<S: State, E: Event> {
    /// State reached after every cascaded event was processed.
    pub final_state: S,
    /// Committed transitions, in order.
    pub transitions: Vec<StateTransition<S, E>>,
    /// Cascaded events emitted by actions that matched no rule or failed a guard.
    pub dropped: Vec<TransitionRejected<S, E>>,
}

/// Definitive result of `Machine::send`.
#[derive(Clone, Debug, PartialEq)]
pub enum SendOutcome<S: State, E: Event> {
    Accepted(Cascade<S, E>),
    Rejected(TransitionRejected<S, E>),
}

impl<S: State, E: Event> SendOutcome<S, E> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Final state for accepted events.
    pub fn final_state(&self) -> Option<&S> {
        match self {
            Self::Accepted(cascade) => Some(&cascade.final_state),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejected) => Some(rejected.reason),
        }
    }
}

/// Failures surfaced by `Machine::send`.
#[derive(Debug, Error)]
pub enum SendError<S: State> {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The interceptor could not persist the target state. The machine's
    /// state was left at its last committed value.
    #[error("Persisting transition failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// The action failed after its transition committed. The committed
    /// state is not rolled back.
    #[error("Action failed after committing {committed:?}: {source}")]
    ActionExecution {
        committed: S,
        #[source]
        source: ActionError,
    },

    #[error("Send deadline of {deadline:?} exceeded after {elapsed:?}")]
    DeadlineExceeded { deadline: Duration, elapsed: Duration },
}
