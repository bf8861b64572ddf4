//! Decisions for the approval step of the payment lifecycle.

use super::{PaymentEvent, PaymentState};
use crate::core::TransitionContext;
use crate::engine::Decision;
use rand::Rng;

/// The approval or decline event for the step triggered by `trigger`.
///
/// `Authorize` answers with the authorization events; any other trigger
/// answers with the pre-authorization events.
pub fn verdict_event(trigger: &PaymentEvent, approved: bool) -> PaymentEvent {
    match (trigger, approved) {
        (PaymentEvent::Authorize, true) => PaymentEvent::AuthApproved,
        (PaymentEvent::Authorize, false) => PaymentEvent::AuthDeclined,
        (_, true) => PaymentEvent::PreAuthApproved,
        (_, false) => PaymentEvent::PreAuthDeclined,
    }
}

/// Approves with a fixed probability.
#[derive(Clone, Copy, Debug)]
pub struct RandomApproval {
    approval_rate: f64,
}

impl RandomApproval {
    pub const DEFAULT_RATE: f64 = 0.8;

    /// Rates outside `0.0..=1.0` are clamped.
    pub fn new(approval_rate: f64) -> Self {
        let approval_rate = if approval_rate.is_nan() {
            0.0
        } else {
            approval_rate.clamp(0.0, 1.0)
        };
        Self { approval_rate }
    }

    pub fn approval_rate(&self) -> f64 {
        self.approval_rate
    }
}

impl Default for RandomApproval {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATE)
    }
}

impl Decision<PaymentState, PaymentEvent> for RandomApproval {
    fn decide(&self, ctx: &TransitionContext<'_, PaymentState, PaymentEvent>) -> PaymentEvent {
        let approved = rand::rng().random_bool(self.approval_rate);
        verdict_event(ctx.event, approved)
    }
}

/// Always returns the same verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixedVerdict {
    Approve,
    Decline,
}

impl Decision<PaymentState, PaymentEvent> for FixedVerdict {
    fn decide(&self, ctx: &TransitionContext<'_, PaymentState, PaymentEvent>) -> PaymentEvent {
        verdict_event(ctx.event, *self == FixedVerdict::Approve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Metadata;

    fn decide_on(decision: &dyn Decision<PaymentState, PaymentEvent>, trigger: PaymentEvent) -> PaymentEvent {
        let metadata = Metadata::new();
        let ctx = TransitionContext::after(&PaymentState::New, &PaymentState::New, &trigger, &metadata);
        decision.decide(&ctx)
    }

    #[test]
    fn verdict_depends_on_trigger() {
        assert_eq!(verdict_event(&PaymentEvent::PreAuthorize, true), PaymentEvent::PreAuthApproved);
        assert_eq!(verdict_event(&PaymentEvent::PreAuthorize, false), PaymentEvent::PreAuthDeclined);
        assert_eq!(verdict_event(&PaymentEvent::Authorize, true), PaymentEvent::AuthApproved);
        assert_eq!(verdict_event(&PaymentEvent::Authorize, false), PaymentEvent::AuthDeclined);
    }

    #[test]
    fn fixed_verdicts() {
        assert_eq!(
            decide_on(&FixedVerdict::Approve, PaymentEvent::Authorize),
            PaymentEvent::AuthApproved
        );
        assert_eq!(
            decide_on(&FixedVerdict::Decline, PaymentEvent::PreAuthorize),
            PaymentEvent::PreAuthDeclined
        );
    }

    #[test]
    fn extreme_rates_are_deterministic() {
        let always = RandomApproval::new(1.0);
        let never = RandomApproval::new(0.0);

        for _ in 0..50 {
            assert_eq!(decide_on(&always, PaymentEvent::PreAuthorize), PaymentEvent::PreAuthApproved);
            assert_eq!(decide_on(&never, PaymentEvent::Authorize), PaymentEvent::AuthDeclined);
        }
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(RandomApproval::new(1.7).approval_rate(), 1.0);
        assert_eq!(RandomApproval::new(-0.2).approval_rate(), 0.0);
        assert_eq!(RandomApproval::new(f64::NAN).approval_rate(), 0.0);
        assert_eq!(RandomApproval::default().approval_rate(), 0.8);
    }
}
