//! Per-run search scope.

use std::time::{Duration, Instant};

/// Progress of one run of a query.
///
/// A step is one forced suspension; a solution is one yielded context.
#[derive(Debug, Clone)]
pub struct SearchScope {
    start_time: Instant,
    step_count: u64,
    solution_count: u64,
}

impl SearchScope {
    pub fn start() -> Self {
        Self {
            start_time: Instant::now(),
            step_count: 0,
            solution_count: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn increment_step_count(&mut self) {
        self.step_count += 1;
    }

    pub fn record_solution(&mut self) {
        self.solution_count += 1;
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn solution_count(&self) -> u64 {
        self.solution_count
    }
}

impl Default for SearchScope {
    fn default() -> Self {
        Self::start()
    }
}
