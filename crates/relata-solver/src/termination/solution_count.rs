//! Solution count termination.

use super::Termination;
use crate::scope::SearchScope;

/// Terminates once `limit` solutions have been yielded.
#[derive(Debug, Clone)]
pub struct SolutionCountTermination {
    limit: u64,
}

impl SolutionCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Termination for SolutionCountTermination {
    fn is_terminated(&self, scope: &SearchScope) -> bool {
        scope.solution_count() >= self.limit
    }
}
