//! Builder API for declaring transition tables.
//!
//! This module provides fluent builders and macros for declaring states,
//! events and rules with minimal boilerplate. Tables are validated once, at
//! build time; a table that builds is safe to share between machines.

pub mod error;
pub mod macros;
pub mod table;
pub mod transition;

pub use error::ConfigurationError;
pub use table::TransitionTableBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Event, Guard, State};
use crate::engine::Rule;

/// Create an unconditional rule without an action.
///
/// # Example
///
/// ```
/// use waypoint::builder::simple_transition;
/// use waypoint::{event_enum, state_enum};
///
/// state_enum! {
///     enum MyState { Start, End }
/// }
///
/// event_enum! {
///     enum MyEvent { Finish }
/// }
///
/// let rule = simple_transition(MyState::Start, MyEvent::Finish, MyState::End);
/// assert!(rule.guard.is_none());
/// ```
pub fn simple_transition<S: State, E: Event>(from: S, on: E, to: S) -> Rule<S, E> {
    Rule {
        source: from,
        event: on,
        target: to,
        guard: None,
        action: None,
    }
}

/// Create a rule gated by a guard.
pub fn guarded_transition<S: State, E: Event>(
    from: S,
    on: E,
    to: S,
    guard: Guard<S, E>,
) -> Rule<S, E> {
    Rule {
        guard: Some(guard),
        ..simple_transition(from, on, to)
    }
}
