//! Error types for the Relata solver

use relata_config::ConfigError;
use relata_core::{CoreError, Var};
use thiserror::Error;

/// Errors reported by query construction and search.
///
/// Failure to find a solution is never an error: it is an empty iterator.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The query configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A projected variable does not occur in the goal.
    #[error("Projected variable {0} does not occur in the goal")]
    UnknownVariable(Var),

    /// The wildcard was listed among the projected variables.
    #[error("The wildcard variable cannot be projected")]
    WildcardProjection,

    /// A relation was applied to the wrong number of arguments.
    #[error("Relation `{relation}` has arity {expected} but was given {found} arguments")]
    ArityMismatch {
        relation: String,
        expected: usize,
        found: usize,
    },

    /// A fatal invariant violation ended the search.
    #[error("Invariant violated in {subject}: {message}")]
    Invariant { subject: String, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, SolverError>;
