//! Composite termination.

use super::Termination;
use crate::scope::SearchScope;

/// Terminates when ANY child terminates.
///
/// # Examples
///
/// ```
/// use relata_solver::termination::{OrTermination, StepCountTermination, TimeTermination};
///
/// // Terminate after 30 seconds OR 1000 steps
/// let termination = OrTermination::new(vec![
///     Box::new(TimeTermination::seconds(30)),
///     Box::new(StepCountTermination::new(1000)),
/// ]);
/// assert_eq!(termination.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct OrTermination {
    terminations: Vec<Box<dyn Termination>>,
}

impl OrTermination {
    pub fn new(terminations: Vec<Box<dyn Termination>>) -> Self {
        Self { terminations }
    }

    pub fn push(&mut self, termination: Box<dyn Termination>) {
        self.terminations.push(termination);
    }

    pub fn len(&self) -> usize {
        self.terminations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminations.is_empty()
    }
}

impl Termination for OrTermination {
    fn is_terminated(&self, scope: &SearchScope) -> bool {
        self.terminations.iter().any(|t| t.is_terminated(scope))
    }
}
