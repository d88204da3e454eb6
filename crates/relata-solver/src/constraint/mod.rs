//! Constraints that need goal capabilities.

mod cardinality;

pub use cardinality::Cardinality;
