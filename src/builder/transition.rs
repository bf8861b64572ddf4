//! Builder for constructing individual transition rules.

use crate::builder::error::ConfigurationError;
use crate::core::{Event, Guard, State, TransitionContext};
use crate::engine::{Action, ActionError, EventSink, Rule};

/// Builder for constructing rules with a fluent API.
pub struct TransitionBuilder<S: State, E: Event> {
    from: Option<S>,
    on: Option<E>,
    to: Option<S>,
    guard: Option<Guard<S, E>>,
    action: Option<Action<S, E>>,
}

impl<S: State, E: Event> TransitionBuilder<S, E> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            on: None,
            to: None,
            guard: None,
            action: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the triggering event (required).
    pub fn on(mut self, event: E) -> Self {
        self.on = Some(event);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Add a guard (optional).
    pub fn guard(mut self, guard: Guard<S, E>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&TransitionContext<'_, S, E>) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Require a metadata key, typically the entity id (optional).
    pub fn requires(self, key: impl Into<String>) -> Self {
        self.guard(Guard::require_key(key))
    }

    /// Attach a prepared action (optional).
    pub fn action(mut self, action: Action<S, E>) -> Self {
        self.action = Some(action);
        self
    }

    /// Attach an action using a closure (optional).
    pub fn perform<F>(self, action: F) -> Self
    where
        F: Fn(&TransitionContext<'_, S, E>, &mut EventSink<E>) -> Result<(), ActionError>
            + Send
            + Sync
            + 'static,
    {
        self.action(Action::new(action))
    }

    /// Build the rule.
    pub fn build(self) -> Result<Rule<S, E>, ConfigurationError> {
        let source = self.from.ok_or(ConfigurationError::IncompleteRule {
            missing: "source state",
            call: "from",
        })?;
        let event = self.on.ok_or(ConfigurationError::IncompleteRule {
            missing: "event",
            call: "on",
        })?;
        let target = self.to.ok_or(ConfigurationError::IncompleteRule {
            missing: "target state",
            call: "to",
        })?;

        Ok(Rule {
            source,
            event,
            target,
            guard: self.guard,
            action: self.action,
        })
    }
}

impl<S: State, E: Event> Default for TransitionBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
