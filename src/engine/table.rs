//! The immutable transition table shared by every machine instance.

use super::action::Action;
use crate::core::{Event, Guard, State, TransitionContext};
use std::collections::{HashMap, HashSet};

/// A declared `(source, event) -> target` rule with optional guard and action.
#[derive(Debug)]
pub struct Rule<S: State, E: Event> {
    pub source: S,
    pub event: E,
    pub target: S,
    pub guard: Option<Guard<S, E>>,
    pub action: Option<Action<S, E>>,
}

impl<S: State, E: Event> Rule<S, E> {
    /// Whether the guard (if any) lets this attempt through.
    pub fn permits(&self, ctx: &TransitionContext<'_, S, E>) -> bool {
        self.guard.as_ref().map_or(true, |g| g.check(ctx))
    }
}

impl<S: State, E: Event> Clone for Rule<S, E> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            event: self.event.clone(),
            target: self.target.clone(),
            guard: self.guard.clone(),
            action: self.action.clone(),
        }
    }
}

/// Validated set of states and rules.
///
/// Only [`TransitionTableBuilder`](crate::builder::TransitionTableBuilder)
/// constructs tables, so every table is event-disjoint per source state and
/// references declared states only. Tables are read-only and meant to be
/// shared behind an `Arc`.
#[derive(Debug)]
pub struct TransitionTable<S: State, E: Event> {
    states: Vec<S>,
    declared: HashSet<S>,
    initial: S,
    terminal: HashSet<S>,
    rules: HashMap<S, HashMap<E, Rule<S, E>>>,
}

impl<S: State, E: Event> TransitionTable<S, E> {
    pub(crate) fn from_parts(
        states: Vec<S>,
        initial: S,
        terminal: HashSet<S>,
        rules: Vec<Rule<S, E>>,
    ) -> Self {
        let declared = states.iter().cloned().collect();
        let mut by_source: HashMap<S, HashMap<E, Rule<S, E>>> = HashMap::new();
        for rule in rules {
            by_source
                .entry(rule.source.clone())
                .or_default()
                .insert(rule.event.clone(), rule);
        }

        Self {
            states,
            declared,
            initial,
            terminal,
            rules: by_source,
        }
    }

    /// Declared states, in declaration order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn initial(&self) -> &S {
        &self.initial
    }

    pub fn is_declared(&self, state: &S) -> bool {
        self.declared.contains(state)
    }

    /// Terminal states are those marked terminal, plus any declared state
    /// with no outgoing rules.
    pub fn is_terminal(&self, state: &S) -> bool {
        self.terminal.contains(state) || self.rules.get(state).map_or(true, HashMap::is_empty)
    }

    /// Look up the rule for `(state, event)`.
    pub fn rule(&self, state: &S, event: &E) -> Option<&Rule<S, E>> {
        self.rules.get(state).and_then(|by_event| by_event.get(event))
    }

    /// Events with a rule out of `state`.
    pub fn events_from(&self, state: &S) -> Vec<&E> {
        self.rules
            .get(state)
            .map(|by_event| by_event.keys().collect())
            .unwrap_or_default()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }
}
