//! The canonical payment lifecycle.
//!
//! ```text
//! New --PreAuthorize--> New            (guard: payment id, action: decision)
//! New --PreAuthApproved--> PreAuth
//! New --PreAuthDeclined--> PreAuthError
//! PreAuth --Authorize--> PreAuth       (guard: payment id, action: decision)
//! PreAuth --AuthApproved--> Auth
//! PreAuth --AuthDeclined--> AuthError
//! ```
//!
//! `Auth`, `PreAuthError` and `AuthError` are terminal. The self transitions
//! on `PreAuthorize` and `Authorize` commit, then let the injected
//! [`Decision`](crate::engine::Decision) emit the approval or decline event,
//! which is processed before `send` returns.

mod decision;
mod service;

pub use decision::{verdict_event, FixedVerdict, RandomApproval};
pub use service::{PaymentError, PaymentResult, PaymentService};

use crate::builder::{ConfigurationError, TransitionTableBuilder};
use crate::core::Guard;
use crate::engine::{decide, Decision, TransitionTable};
use crate::persistence::Entity;
use crate::{event_enum, state_enum};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Metadata key carrying the payment id.
pub const PAYMENT_ID_KEY: &str = "payment_id";

state_enum! {
    /// Lifecycle stages of a payment.
    pub enum PaymentState {
        New,
        PreAuth,
        PreAuthError,
        Auth,
        AuthError,
    }
}

event_enum! {
    /// Events that move a payment through its lifecycle.
    pub enum PaymentEvent {
        PreAuthorize,
        PreAuthApproved,
        PreAuthDeclined,
        Authorize,
        AuthApproved,
        AuthDeclined,
    }
}

/// A payment record. Amounts are in minor currency units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub state: PaymentState,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(amount_minor: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: PaymentState::New,
            amount_minor,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Payment {
    type Id = Uuid;
    type State = PaymentState;

    fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> &PaymentState {
        &self.state
    }

    fn set_state(&mut self, state: PaymentState) {
        self.state = state;
    }
}

/// Build the payment transition table.
///
/// `decision` picks the approval or decline event for both the
/// pre-authorization and the authorization step.
pub fn payment_table(
    decision: Arc<dyn Decision<PaymentState, PaymentEvent>>,
) -> Result<TransitionTable<PaymentState, PaymentEvent>, ConfigurationError> {
    use PaymentEvent as Ev;
    use PaymentState as St;

    TransitionTableBuilder::new()
        .states(PaymentState::ALL.iter().cloned())
        .initial(St::New)
        .terminal(St::Auth)
        .terminal(St::PreAuthError)
        .terminal(St::AuthError)
        .add_transition(
            St::New,
            Ev::PreAuthorize,
            St::New,
            Some(Guard::require_key(PAYMENT_ID_KEY)),
            Some(decide(Arc::clone(&decision))),
        )
        .add_transition(St::New, Ev::PreAuthApproved, St::PreAuth, None, None)
        .add_transition(St::New, Ev::PreAuthDeclined, St::PreAuthError, None, None)
        .add_transition(
            St::PreAuth,
            Ev::Authorize,
            St::PreAuth,
            Some(Guard::require_key(PAYMENT_ID_KEY)),
            Some(decide(decision)),
        )
        .add_transition(St::PreAuth, Ev::AuthApproved, St::Auth, None, None)
        .add_transition(St::PreAuth, Ev::AuthDeclined, St::AuthError, None, None)
        .build()
}
