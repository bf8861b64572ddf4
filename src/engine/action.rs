//! Actions, the event sink they emit into, and injectable decisions.

use crate::core::{Event, Metadata, State, TransitionContext};
use std::sync::Arc;
use thiserror::Error;

/// Error returned by an action that failed after its transition committed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it as the source.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Buffer through which an action submits follow-up events.
///
/// Events are processed by the same machine, in the order they were sent,
/// once the action has returned and before the originating `send` returns.
#[derive(Debug)]
pub struct EventSink<E: Event> {
    emitted: Vec<(E, Metadata)>,
}

impl<E: Event> EventSink<E> {
    pub(crate) fn new() -> Self {
        Self {
            emitted: Vec::new(),
        }
    }

    pub fn send(&mut self, event: E, metadata: Metadata) {
        self.emitted.push((event, metadata));
    }

    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }

    pub(crate) fn into_events(self) -> Vec<(E, Metadata)> {
        self.emitted
    }
}

/// Type alias for action callbacks.
pub type ActionFn<S, E> = dyn Fn(&TransitionContext<'_, S, E>, &mut EventSink<E>) -> Result<(), ActionError>
    + Send
    + Sync;

/// Side-effecting routine run after a transition commits.
///
/// Actions must not change the machine's state directly; the only way to
/// move on is to emit events that match further rules.
pub struct Action<S: State, E: Event> {
    run: Arc<ActionFn<S, E>>,
}

impl<S: State, E: Event> Action<S, E> {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&TransitionContext<'_, S, E>, &mut EventSink<E>) -> Result<(), ActionError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            run: Arc::new(action),
        }
    }

    /// Action that always emits `event`, forwarding the triggering metadata.
    pub fn emit(event: E) -> Self {
        Self::new(move |ctx, sink| {
            sink.send(event.clone(), ctx.metadata.clone());
            Ok(())
        })
    }

    pub fn run(
        &self,
        ctx: &TransitionContext<'_, S, E>,
        sink: &mut EventSink<E>,
    ) -> Result<(), ActionError> {
        (self.run)(ctx, sink)
    }
}

impl<S: State, E: Event> Clone for Action<S, E> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<S: State, E: Event> std::fmt::Debug for Action<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Action(..)")
    }
}

/// Chooses which event an action should emit next.
///
/// Keeps nondeterministic business logic (such as a random approval) out of
/// the engine so tests can substitute a deterministic stub.
pub trait Decision<S: State, E: Event>: Send + Sync {
    fn decide(&self, ctx: &TransitionContext<'_, S, E>) -> E;
}

struct DecisionFn<F>(F);

impl<S, E, F> Decision<S, E> for DecisionFn<F>
where
    S: State,
    E: Event,
    F: Fn(&TransitionContext<'_, S, E>) -> E + Send + Sync,
{
    fn decide(&self, ctx: &TransitionContext<'_, S, E>) -> E {
        (self.0)(ctx)
    }
}

/// Turn a closure into a shareable decision.
pub fn decision_fn<S, E, F>(decide: F) -> Arc<dyn Decision<S, E>>
where
    S: State,
    E: Event,
    F: Fn(&TransitionContext<'_, S, E>) -> E + Send + Sync + 'static,
{
    Arc::new(DecisionFn(decide))
}

/// Action that asks `decision` for the next event and emits it with the
/// triggering metadata.
pub fn decide<S: State, E: Event>(decision: Arc<dyn Decision<S, E>>) -> Action<S, E> {
    Action::new(move |ctx, sink| {
        let next = decision.decide(ctx);
        tracing::debug!(
            state = ctx.state.name(),
            trigger = ctx.event.name(),
            decided = next.name(),
            "decision made"
        );
        sink.send(next, ctx.metadata.clone());
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event_enum, state_enum};

    state_enum! {
        enum Light { Red, Green }
    }

    event_enum! {
        enum Signal { Go, Stop, Check }
    }

    #[test]
    fn emit_forwards_metadata() {
        let action = Action::<Light, Signal>::emit(Signal::Go);
        let metadata = Metadata::new().with("id", 3);
        let ctx = TransitionContext::after(&Light::Red, &Light::Red, &Signal::Check, &metadata);

        let mut sink = EventSink::new();
        action.run(&ctx, &mut sink).unwrap();

        let events = sink.into_events();
        assert_eq!(events, vec![(Signal::Go, metadata.clone())]);
    }

    #[test]
    fn decide_emits_the_decided_event() {
        let decision = decision_fn(|ctx: &TransitionContext<'_, Light, Signal>| {
            if *ctx.state == Light::Red {
                Signal::Go
            } else {
                Signal::Stop
            }
        });
        let action = decide(decision);
        let metadata = Metadata::new();

        let mut sink = EventSink::new();
        let ctx = TransitionContext::after(&Light::Green, &Light::Red, &Signal::Check, &metadata);
        action.run(&ctx, &mut sink).unwrap();

        let ctx = TransitionContext::after(&Light::Red, &Light::Green, &Signal::Check, &metadata);
        action.run(&ctx, &mut sink).unwrap();

        let emitted: Vec<Signal> = sink.into_events().into_iter().map(|(e, _)| e).collect();
        assert_eq!(emitted, vec![Signal::Go, Signal::Stop]);
    }

    #[test]
    fn action_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "gateway down");
        let error = ActionError::with_source("charge failed", io);

        assert_eq!(error.to_string(), "charge failed");
        assert!(std::error::Error::source(&error).is_some());
        assert!(std::error::Error::source(&ActionError::new("plain")).is_none());
    }
}
