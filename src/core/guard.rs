//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions that determine whether a matched rule
//! may fire. A guard that returns `false` makes the engine treat the event as
//! rejected; nothing is persisted and no action runs.

use super::context::TransitionContext;
use super::state::{Event, State};
use std::sync::Arc;

/// Pure predicate that determines if a transition can execute.
///
/// Guards must not mutate shared state and must not block. The engine does
/// not detect violations of this contract.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{Guard, Metadata, TransitionContext};
/// use waypoint::{event_enum, state_enum};
///
/// state_enum! {
///     enum Door { Closed, Open }
/// }
///
/// event_enum! {
///     enum Push { Open }
/// }
///
/// let guard = Guard::<Door, Push>::require_key("door_id");
///
/// let with_id = Metadata::new().with("door_id", 1);
/// let ctx = TransitionContext::before(&Door::Closed, &Door::Open, &Push::Open, &with_id);
/// assert!(guard.check(&ctx));
///
/// let empty = Metadata::new();
/// let ctx = TransitionContext::before(&Door::Closed, &Door::Open, &Push::Open, &empty);
/// assert!(!guard.check(&ctx));
/// ```
pub struct Guard<S: State, E: Event> {
    predicate: Arc<dyn Fn(&TransitionContext<'_, S, E>) -> bool + Send + Sync>,
}

impl<S: State, E: Event> Guard<S, E> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&TransitionContext<'_, S, E>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard that passes unconditionally.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Reject events whose metadata lacks `key`.
    ///
    /// This is the standard identity guard: it keeps the persistence
    /// interceptor from committing against an unidentified entity.
    pub fn require_key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(move |ctx| ctx.metadata.contains_key(&key))
    }

    /// Both guards must pass. `other` is not evaluated if `self` fails.
    pub fn and(self, other: Guard<S, E>) -> Self {
        Self::new(move |ctx| self.check(ctx) && other.check(ctx))
    }

    pub fn not(self) -> Self {
        Self::new(move |ctx| !self.check(ctx))
    }

    /// Evaluate the predicate for one transition attempt.
    pub fn check(&self, ctx: &TransitionContext<'_, S, E>) -> bool {
        (self.predicate)(ctx)
    }
}

impl<S: State, E: Event> Clone for Guard<S, E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S: State, E: Event> std::fmt::Debug for Guard<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard(..)")
    }
}
