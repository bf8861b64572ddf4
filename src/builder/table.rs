//! Builder for transition tables.

use crate::builder::error::ConfigurationError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Event, Guard, State};
use crate::engine::{Action, Rule, TransitionTable};
use std::collections::HashSet;
use stillwater::validation::Validation;

type Check = Validation<(), Vec<ConfigurationError>>;

/// Builder for transition tables with a fluent API.
///
/// `build` validates the whole declaration at once and reports every
/// violation, not just the first.
///
/// # Example
///
/// ```rust
/// use waypoint::builder::TransitionTableBuilder;
/// use waypoint::{event_enum, state_enum};
///
/// state_enum! {
///     enum Light { Red, Green }
/// }
///
/// event_enum! {
///     enum Signal { Go, Stop }
/// }
///
/// let table = TransitionTableBuilder::new()
///     .states(Light::ALL.iter().cloned())
///     .initial(Light::Red)
///     .add_transition(Light::Red, Signal::Go, Light::Green, None, None)
///     .add_transition(Light::Green, Signal::Stop, Light::Red, None, None)
///     .build()
///     .unwrap();
///
/// assert_eq!(table.rule(&Light::Red, &Signal::Go).unwrap().target, Light::Green);
/// assert!(table.rule(&Light::Red, &Signal::Stop).is_none());
/// ```
pub struct TransitionTableBuilder<S: State, E: Event> {
    states: Vec<S>,
    initial: Option<S>,
    terminal: Vec<S>,
    rules: Vec<Rule<S, E>>,
}

impl<S: State, E: Event> TransitionTableBuilder<S, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            initial: None,
            terminal: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Declare a state. Declaring a state twice has no effect.
    pub fn state(mut self, state: S) -> Self {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
        self
    }

    /// Declare several states.
    pub fn states<I: IntoIterator<Item = S>>(self, states: I) -> Self {
        states.into_iter().fold(self, Self::state)
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Mark a state terminal. No rules are evaluated from terminal states.
    pub fn terminal(mut self, state: S) -> Self {
        if !self.terminal.contains(&state) {
            self.terminal.push(state);
        }
        self
    }

    /// Add a rule from its parts.
    pub fn add_transition(
        mut self,
        source: S,
        event: E,
        target: S,
        guard: Option<Guard<S, E>>,
        action: Option<Action<S, E>>,
    ) -> Self {
        self.rules.push(Rule {
            source,
            event,
            target,
            guard,
            action,
        });
        self
    }

    /// Add a rule using a builder.
    /// Returns an error if the builder is incomplete.
    pub fn transition(mut self, builder: TransitionBuilder<S, E>) -> Result<Self, ConfigurationError> {
        self.rules.push(builder.build()?);
        Ok(self)
    }

    /// Add a pre-built rule.
    pub fn rule(mut self, rule: Rule<S, E>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Validate and build the table.
    pub fn build(self) -> Result<TransitionTable<S, E>, ConfigurationError> {
        self.validate()?;

        let initial = self.initial.ok_or(ConfigurationError::MissingInitialState)?;
        let terminal = self.terminal.into_iter().collect();
        Ok(TransitionTable::from_parts(
            self.states,
            initial,
            terminal,
            self.rules,
        ))
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let declared: HashSet<&S> = self.states.iter().collect();
        let is_declared = |state: &S, role: &'static str| -> Check {
            if declared.contains(state) {
                Validation::Success(())
            } else {
                Validation::Failure(vec![ConfigurationError::UndeclaredState {
                    state: state.name().to_string(),
                    role,
                }])
            }
        };

        let mut checks: Vec<Check> = Vec::new();

        checks.push(match &self.initial {
            Some(initial) => is_declared(initial, "the initial state"),
            None => Validation::Failure(vec![ConfigurationError::MissingInitialState]),
        });

        for state in &self.terminal {
            checks.push(is_declared(state, "a terminal state"));
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            checks.push(is_declared(&rule.source, "a rule source"));
            checks.push(is_declared(&rule.target, "a rule target"));
            if !seen.insert((&rule.source, &rule.event)) {
                checks.push(Validation::Failure(vec![ConfigurationError::AmbiguousRule {
                    state: rule.source.name().to_string(),
                    event: rule.event.name().to_string(),
                }]));
            }
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(mut errors) if errors.len() == 1 => Err(errors.remove(0)),
            Validation::Failure(errors) => Err(ConfigurationError::Multiple(errors)),
        }
    }
}

impl<S: State, E: Event> Default for TransitionTableBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
