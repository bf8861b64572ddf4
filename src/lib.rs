//! Waypoint: a table-driven state machine engine for entity lifecycles
//!
//! Waypoint drives a business entity (such as a payment) through a declared
//! set of states. Transitions are described once in an immutable table and
//! shared by every machine instance; each instance serves one entity for one
//! unit of work and persists every new state through a repository before it
//! commits.
//!
//! # Core Concepts
//!
//! - **States and events**: closed vocabularies via the `State` and `Event` traits
//! - **Guards**: pure predicates over the transition context
//! - **Actions**: run after a commit and may emit follow-up events
//! - **Interceptor**: persists the target state just before it is committed
//! - **History**: immutable tracking of committed transitions
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use waypoint::builder::TransitionTableBuilder;
//! use waypoint::core::Metadata;
//! use waypoint::engine::{Action, Machine};
//! use waypoint::{event_enum, state_enum};
//!
//! state_enum! {
//!     enum Order { Placed, Checking, Accepted }
//! }
//!
//! event_enum! {
//!     enum OrderEvent { Check, Pass }
//! }
//!
//! let table = TransitionTableBuilder::new()
//!     .states([Order::Placed, Order::Checking, Order::Accepted])
//!     .initial(Order::Placed)
//!     .terminal(Order::Accepted)
//!     .add_transition(
//!         Order::Placed,
//!         OrderEvent::Check,
//!         Order::Checking,
//!         None,
//!         Some(Action::emit(OrderEvent::Pass)),
//!     )
//!     .add_transition(Order::Checking, OrderEvent::Pass, Order::Accepted, None, None)
//!     .build()
//!     .unwrap();
//!
//! let mut machine = Machine::start(Arc::new(table));
//! let outcome = machine.send(OrderEvent::Check, Metadata::new()).unwrap();
//!
//! assert_eq!(outcome.final_state(), Some(&Order::Accepted));
//! assert_eq!(machine.history().len(), 2);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod engine;
pub mod factory;
pub mod logging;
pub mod payment;
pub mod persistence;
pub mod settings;

// Re-export commonly used types
pub use builder::{ConfigurationError, TransitionTableBuilder};
pub use core::{Event, Guard, Metadata, State, StateHistory, StateTransition};
pub use engine::{Machine, SendError, SendOutcome, TransitionTable};
pub use factory::MachineFactory;
pub use settings::EngineConfig;
