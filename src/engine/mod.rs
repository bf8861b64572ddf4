//! The state machine engine.
//!
//! # Key Concepts
//!
//! - **Transition table**: immutable rules shared by every instance
//! - **Machine**: owns the current state and dispatches events
//! - **Actions**: run after a commit and may emit follow-up events
//! - **Cascade**: follow-up events are drained from a FIFO work queue before
//!   `send` returns, bounded by the configured cascade limit
//!
//! # Dispatch order
//!
//! For each event: rule lookup, guard, interceptor, commit and listeners,
//! then the action. A rejected event never reaches the interceptor.

mod action;
mod machine;
mod outcome;
mod table;

pub use action::{decide, decision_fn, Action, ActionError, ActionFn, Decision, EventSink};
pub use machine::{Listener, Machine};
pub use outcome::{Cascade, RejectionReason, SendError, SendOutcome, TransitionRejected};
pub use table::{Rule, TransitionTable};
