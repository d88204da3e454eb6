//! Ready-made observers for query monitoring.
//!
//! Both observers plug into the hook registry of a query like any other
//! [`Observer`]. Subscribe them to the empty key to see every event.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use relata_core::{keys, Context, HookPayload, HookRegistry};
//! use relata_solver::event::{CountingObserver, LoggingObserver};
//!
//! let counter = Arc::new(CountingObserver::new());
//! let registry = HookRegistry::builder()
//!     .observe(&[], counter.clone())
//!     .observe(&["query"], Arc::new(LoggingObserver::new()))
//!     .build();
//!
//! let ctx = Context::new().with_hooks(Arc::new(registry));
//! ctx.fire(keys::QUERY_STARTED, &HookPayload::None);
//! assert_eq!(counter.queries_started(), 1);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use relata_core::{keys, Context, HookPayload, Observer};
use tracing::{debug, trace};

/// Forwards hook events to `tracing`.
///
/// Bindings, fresh variables and relation rows are logged at `trace`,
/// everything else at `debug`.
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Observer for LoggingObserver {
    fn on_event(&self, key: &[&'static str], _ctx: &Context, payload: &HookPayload<'_>) {
        let key = key.join(".");
        let prefix = self.prefix.as_str();
        match *payload {
            HookPayload::Fresh(vars) => {
                trace!(prefix, key = %key, count = vars.len());
            }
            HookPayload::Bind { var, term } => {
                trace!(prefix, key = %key, var = %var, term = %term);
            }
            HookPayload::Condense { value, chain } => {
                trace!(prefix, key = %key, value = %value, chain = chain.len());
            }
            HookPayload::Row {
                relation,
                index,
                total,
            } => {
                trace!(prefix, key = %key, relation, index, total);
            }
            HookPayload::Violation { var, constraint } => {
                debug!(prefix, key = %key, var = %var, constraint);
            }
            HookPayload::Solution { index } => {
                debug!(prefix, key = %key, index);
            }
            HookPayload::Lifecycle { steps, solutions } => {
                debug!(prefix, key = %key, steps, solutions);
            }
            HookPayload::None => {
                debug!(prefix, key = %key);
            }
        }
    }
}

/// Counts events by kind.
///
/// Useful for testing and statistics collection.
#[derive(Debug, Default)]
pub struct CountingObserver {
    fresh_count: AtomicUsize,
    bind_count: AtomicUsize,
    condense_count: AtomicUsize,
    violation_count: AtomicUsize,
    row_succeeded_count: AtomicUsize,
    row_failed_count: AtomicUsize,
    query_started_count: AtomicUsize,
    solution_count: AtomicUsize,
    query_ended_count: AtomicUsize,
    other_count: AtomicUsize,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&self) -> usize {
        self.fresh_count.load(Ordering::SeqCst)
    }

    pub fn bindings(&self) -> usize {
        self.bind_count.load(Ordering::SeqCst)
    }

    pub fn condensed(&self) -> usize {
        self.condense_count.load(Ordering::SeqCst)
    }

    pub fn violations(&self) -> usize {
        self.violation_count.load(Ordering::SeqCst)
    }

    pub fn rows_succeeded(&self) -> usize {
        self.row_succeeded_count.load(Ordering::SeqCst)
    }

    pub fn rows_failed(&self) -> usize {
        self.row_failed_count.load(Ordering::SeqCst)
    }

    pub fn queries_started(&self) -> usize {
        self.query_started_count.load(Ordering::SeqCst)
    }

    pub fn solutions(&self) -> usize {
        self.solution_count.load(Ordering::SeqCst)
    }

    pub fn queries_ended(&self) -> usize {
        self.query_ended_count.load(Ordering::SeqCst)
    }

    /// Events fired under keys the engine does not define.
    pub fn other(&self) -> usize {
        self.other_count.load(Ordering::SeqCst)
    }

    /// Resets all counts to zero.
    pub fn reset(&self) {
        for counter in self.counters() {
            counter.store(0, Ordering::SeqCst);
        }
    }

    fn counters(&self) -> [&AtomicUsize; 10] {
        [
            &self.fresh_count,
            &self.bind_count,
            &self.condense_count,
            &self.violation_count,
            &self.row_succeeded_count,
            &self.row_failed_count,
            &self.query_started_count,
            &self.solution_count,
            &self.query_ended_count,
            &self.other_count,
        ]
    }

    fn counter_for(&self, key: &[&'static str]) -> &AtomicUsize {
        match key {
            k if k == keys::VARS_FRESH => &self.fresh_count,
            k if k == keys::SUBST_BIND => &self.bind_count,
            k if k == keys::SUBST_CONDENSE => &self.condense_count,
            k if k == keys::CONSTRAINT_VIOLATED => &self.violation_count,
            k if k == keys::ROW_SUCCEEDED => &self.row_succeeded_count,
            k if k == keys::ROW_FAILED => &self.row_failed_count,
            k if k == keys::QUERY_STARTED => &self.query_started_count,
            k if k == keys::QUERY_SOLUTION => &self.solution_count,
            k if k == keys::QUERY_ENDED => &self.query_ended_count,
            _ => &self.other_count,
        }
    }
}

impl Observer for CountingObserver {
    fn on_event(&self, key: &[&'static str], _ctx: &Context, _payload: &HookPayload<'_>) {
        self.counter_for(key).fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
