//! Query run statistics.

use std::time::Duration;

/// Statistics for one run of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStatistics {
    /// Wall time from the first pull to the end of the run.
    pub duration: Duration,
    /// Suspensions forced.
    pub step_count: u64,
    /// Solutions yielded.
    pub solution_count: u64,
    /// True if a termination condition ended the run.
    pub terminated_early: bool,
}

impl QueryStatistics {
    /// Returns the average time per forced step.
    pub fn avg_time_per_step(&self) -> Duration {
        match u32::try_from(self.step_count) {
            Ok(0) => Duration::ZERO,
            Ok(steps) => self.duration / steps,
            Err(_) => self.duration.div_f64(self.step_count as f64),
        }
    }

    /// Returns the solutions found per second.
    pub fn solutions_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.solution_count as f64 / secs
        } else {
            0.0
        }
    }

    /// Returns the forced steps per solution, or the total when none was found.
    pub fn steps_per_solution(&self) -> f64 {
        if self.solution_count == 0 {
            self.step_count as f64
        } else {
            self.step_count as f64 / self.solution_count as f64
        }
    }
}
