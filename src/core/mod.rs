//! Core state machine types.
//!
//! This module contains the vocabulary the engine is generic over:
//! - States and events via the `State` and `Event` traits
//! - Event metadata and the per-transition context
//! - Guard predicates for transition control
//! - Immutable history tracking

mod context;
mod guard;
mod history;
mod metadata;
mod state;

pub use context::TransitionContext;
pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use metadata::Metadata;
pub use state::{Event, State};
