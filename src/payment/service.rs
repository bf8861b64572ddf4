//! Payment operations on top of the machine factory.

use super::{payment_table, Payment, PaymentEvent, PaymentState, PAYMENT_ID_KEY};
use crate::builder::ConfigurationError;
use crate::core::Metadata;
use crate::engine::{Decision, Listener, SendError, SendOutcome};
use crate::factory::{FactoryError, MachineFactory};
use crate::persistence::{PersistenceError, Repository};
use crate::settings::EngineConfig;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    Send(#[from] SendError<PaymentState>),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// State of a payment after an operation, with the machine's outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct PaymentResult {
    pub state: PaymentState,
    pub outcome: SendOutcome<PaymentState, PaymentEvent>,
}

/// Creates payments and drives them through pre-authorization and
/// authorization.
///
/// Each operation runs under the payment's lock, so concurrent requests for
/// one payment are applied one after the other.
pub struct PaymentService<R: Repository<Entity = Payment>> {
    repository: Arc<R>,
    factory: MachineFactory<R, PaymentEvent>,
}

impl<R: Repository<Entity = Payment> + 'static> PaymentService<R> {
    /// Build the service around the payment table. The identity key of
    /// `config` is replaced by [`PAYMENT_ID_KEY`].
    pub fn new(
        repository: Arc<R>,
        decision: Arc<dyn Decision<PaymentState, PaymentEvent>>,
        config: EngineConfig,
    ) -> Result<Self, ConfigurationError> {
        let table = Arc::new(payment_table(decision)?);
        let config = config.with_identity_key(PAYMENT_ID_KEY);
        let factory = MachineFactory::new(table, Arc::clone(&repository), config)?;
        Ok(Self { repository, factory })
    }

    pub fn with_listener(mut self, listener: Listener<PaymentState>) -> Self {
        self.factory = self.factory.with_listener(listener);
        self
    }

    pub fn factory(&self) -> &MachineFactory<R, PaymentEvent> {
        &self.factory
    }

    /// Save a new payment in the initial state.
    pub fn new_payment(&self, amount_minor: i64) -> Result<Payment, PaymentError> {
        let mut payment = Payment::new(amount_minor);
        payment.state = self.factory.table().initial().clone();
        let saved = self.repository.save(payment)?;
        tracing::info!(payment = %saved.id, amount_minor, "payment created");
        Ok(saved)
    }

    pub fn payment(&self, id: &Uuid) -> Result<Payment, PaymentError> {
        Ok(self.repository.load(id)?)
    }

    pub fn pre_auth(&self, id: &Uuid) -> Result<PaymentResult, PaymentError> {
        self.send(id, PaymentEvent::PreAuthorize)
    }

    /// Send `Authorize`. The table's decision then emits `AuthApproved` or
    /// `AuthDeclined`, so approval is decided here rather than by the caller
    /// sending `AuthApproved` directly. The rule requires the payment id in
    /// metadata, which this method always supplies.
    pub fn authorize(&self, id: &Uuid) -> Result<PaymentResult, PaymentError> {
        self.send(id, PaymentEvent::Authorize)
    }

    pub fn decline_auth(&self, id: &Uuid) -> Result<PaymentResult, PaymentError> {
        self.send(id, PaymentEvent::AuthDeclined)
    }

    fn send(&self, id: &Uuid, event: PaymentEvent) -> Result<PaymentResult, PaymentError> {
        let metadata = Metadata::new().with(PAYMENT_ID_KEY, id.to_string());
        let result = self.factory.with_machine(id, |machine| {
            machine.send(event, metadata).map(|outcome| PaymentResult {
                state: machine.current_state().clone(),
                outcome,
            })
        })??;

        if result.outcome.is_rejected() {
            tracing::debug!(payment = %id, state = ?result.state, "payment event rejected");
        }
        Ok(result)
    }
}
