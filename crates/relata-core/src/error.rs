//! Error types for Relata core

use thiserror::Error;

/// Fatal errors raised by the core data model.
///
/// Ordinary search failure (a unification that does not hold, a violated
/// constraint) is never an error; it is the absence of a context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Two distinct facet types claimed the same facet name in one context.
    #[error("Facet key collision: `{name}` is registered by {existing} and {incoming}")]
    FacetCollision {
        name: &'static str,
        existing: &'static str,
        incoming: &'static str,
    },
}

/// Result type alias for Relata core operations
pub type Result<T> = std::result::Result<T, CoreError>;
