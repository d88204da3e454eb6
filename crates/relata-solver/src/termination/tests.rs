//! Tests for termination conditions.

use super::*;
use std::thread;
use std::time::Duration;

#[test]
fn test_step_count_termination() {
    let mut scope = SearchScope::start();
    let term = StepCountTermination::new(3);

    assert!(!term.is_terminated(&scope));
    scope.increment_step_count();
    scope.increment_step_count();
    assert!(!term.is_terminated(&scope));
    scope.increment_step_count();
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_solution_count_termination() {
    let mut scope = SearchScope::start();
    let term = SolutionCountTermination::new(2);

    scope.record_solution();
    assert!(!term.is_terminated(&scope));
    scope.record_solution();
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_zero_limit_terminates_immediately() {
    let scope = SearchScope::start();
    assert!(StepCountTermination::new(0).is_terminated(&scope));
}

#[test]
fn test_time_termination() {
    let scope = SearchScope::start();
    assert!(!TimeTermination::seconds(60).is_terminated(&scope));

    let short = TimeTermination::millis(5);
    thread::sleep(Duration::from_millis(10));
    assert!(short.is_terminated(&scope));
}

#[test]
fn test_or_termination() {
    let mut scope = SearchScope::start();
    let term = OrTermination::new(vec![
        Box::new(SolutionCountTermination::new(5)),
        Box::new(StepCountTermination::new(1)),
    ]);

    assert!(!term.is_terminated(&scope));
    scope.increment_step_count();
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_empty_or_never_terminates() {
    let term = OrTermination::default();
    assert!(term.is_empty());
    assert!(!term.is_terminated(&SearchScope::start()));
}
