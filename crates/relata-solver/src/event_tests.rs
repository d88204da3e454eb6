//! Tests for the ready-made observers.

use super::*;
use crate::goal::{conj, eq, fresh, neq, Goal};
use crate::test_utils::{int_relation, vars};
use relata_core::{HookRegistry, Term};
use std::sync::Arc;

fn observed(observer: Arc<dyn Observer>) -> Context {
    let registry = HookRegistry::builder().observe(&[], observer).build();
    Context::new().with_hooks(Arc::new(registry))
}

#[test]
fn test_counting_observer_new() {
    let counter = CountingObserver::new();
    assert_eq!(counter.bindings(), 0);
    assert_eq!(counter.solutions(), 0);
    assert_eq!(counter.other(), 0);
}

#[test]
fn test_counting_observer_counts_search_events() {
    let counter = Arc::new(CountingObserver::new());
    let ctx = observed(counter.clone());
    let [x] = vars();
    let r = int_relation("r", 1, &[&[1], &[2], &[3]]);

    let goal = conj(vec![
        neq(x, 2),
        fresh(1, move |v| conj(vec![eq(v[0], 9), r.goal(vec![Term::from(x)]).unwrap()])),
    ]);
    let answers = goal.apply(ctx).contexts().count();

    assert_eq!(answers, 2);
    assert_eq!(counter.fresh(), 1);
    assert_eq!(counter.rows_succeeded(), 2);
    assert_eq!(counter.rows_failed(), 1);
    assert_eq!(counter.violations(), 1);
    // v := 9 once, then x := 1, 2, 3
    assert_eq!(counter.bindings(), 4);
}

#[test]
fn test_counting_observer_lifecycle_and_other() {
    let counter = Arc::new(CountingObserver::new());
    let ctx = observed(counter.clone());

    ctx.fire(keys::QUERY_STARTED, &HookPayload::None);
    ctx.fire(keys::QUERY_SOLUTION, &HookPayload::Solution { index: 0 });
    ctx.fire(
        keys::QUERY_ENDED,
        &HookPayload::Lifecycle {
            steps: 3,
            solutions: 1,
        },
    );
    ctx.fire(&["custom", "event"], &HookPayload::None);

    assert_eq!(counter.queries_started(), 1);
    assert_eq!(counter.solutions(), 1);
    assert_eq!(counter.queries_ended(), 1);
    assert_eq!(counter.other(), 1);
}

#[test]
fn test_counting_observer_reset() {
    let counter = Arc::new(CountingObserver::new());
    let ctx = observed(counter.clone());
    ctx.fire(keys::QUERY_STARTED, &HookPayload::None);
    counter.reset();
    assert_eq!(counter.queries_started(), 0);
}

#[test]
fn test_logging_observer_handles_every_payload() {
    let ctx = observed(Arc::new(LoggingObserver::with_prefix("test")));
    let [x] = vars();
    let term = Term::from(1);

    ctx.fire(keys::VARS_FRESH, &HookPayload::Fresh(&[x]));
    ctx.fire(keys::SUBST_BIND, &HookPayload::Bind { var: x, term: &term });
    ctx.fire(
        keys::ROW_SUCCEEDED,
        &HookPayload::Row {
            relation: "r",
            index: 0,
            total: 1,
        },
    );
    ctx.fire(
        keys::CONSTRAINT_VIOLATED,
        &HookPayload::Violation {
            var: x,
            constraint: "neq",
        },
    );
    ctx.fire(keys::QUERY_SOLUTION, &HookPayload::Solution { index: 0 });
    ctx.fire(keys::QUERY_ENDED, &HookPayload::Lifecycle { steps: 0, solutions: 0 });
    ctx.fire(keys::QUERY_STARTED, &HookPayload::None);
}
