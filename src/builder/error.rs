//! Configuration errors raised while building transition tables and machines.

use thiserror::Error;

/// Errors that make a transition table or machine unusable.
///
/// Table validation reports every violation it finds; when there is more
/// than one they are wrapped in [`ConfigurationError::Multiple`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Transition {missing} not specified. Call .{call}(..) before .build()")]
    IncompleteRule {
        missing: &'static str,
        call: &'static str,
    },

    #[error("State '{state}' is used as {role} but was never declared")]
    UndeclaredState { state: String, role: &'static str },

    #[error("State '{state}' has more than one rule for event '{event}'")]
    AmbiguousRule { state: String, event: String },

    #[error("Cascade exceeded {limit} events in a single send; the table likely contains a cycle")]
    CascadeLimitExceeded { limit: usize },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("{} configuration errors: {}", .0.len(), join(.0))]
    Multiple(Vec<ConfigurationError>),
}

impl ConfigurationError {
    /// Flatten into the individual violations.
    pub fn violations(&self) -> Vec<&ConfigurationError> {
        match self {
            Self::Multiple(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }
}

fn join(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
