//! Conditions that end a query run early.
//!
//! Terminations are checked once per pull, before the stream is advanced.

mod composite;
mod solution_count;
mod step_count;
mod time;

use std::fmt::Debug;

use crate::scope::SearchScope;

pub use composite::OrTermination;
pub use solution_count::SolutionCountTermination;
pub use step_count::StepCountTermination;
pub use time::TimeTermination;

/// Trait for determining when to stop searching.
pub trait Termination: Send + Sync + Debug {
    /// Returns true if the run should stop.
    fn is_terminated(&self, scope: &SearchScope) -> bool;
}

#[cfg(test)]
mod tests;
