//! Tests for fact relations.

use super::*;
use crate::goal::{conj, eq, Goal};
use crate::test_utils::{counted_relation, family_tree, int_relation, run, sorted_values_of, vars};
use relata_core::{keys, Context, HookPayload, HookRegistry, Observer, Var};
use std::sync::Mutex;

fn parent() -> Relation {
    Relation::facts("parent", 2, family_tree()).unwrap()
}

#[test]
fn test_forward_query() {
    let [child] = vars();
    let goal = parent().goal(vec![Term::from("ada"), Term::from(child)]).unwrap();
    let answers = run(&goal);
    assert_eq!(
        sorted_values_of(&answers, child),
        vec![Term::from("bea"), Term::from("cal")]
    );
}

#[test]
fn test_backward_query() {
    let [who] = vars();
    let goal = parent().goal(vec![Term::from(who), Term::from("fay")]).unwrap();
    assert_eq!(sorted_values_of(&run(&goal), who), vec![Term::from("cal")]);
}

#[test]
fn test_join_through_shared_var() {
    let [grandparent, middle, grandchild] = vars();
    let rel = parent();
    let goal = conj(vec![
        rel.goal(vec![Term::from(grandparent), Term::from(middle)]).unwrap(),
        rel.goal(vec![Term::from(middle), Term::from(grandchild)]).unwrap(),
    ]);
    let answers = run(&goal);
    assert_eq!(answers.len(), 3);
    assert!(answers
        .iter()
        .all(|c| c.resolve(&Term::from(grandparent)) == Term::from("ada")));
}

#[test]
fn test_arity_mismatch() {
    let err = parent().goal(vec![Term::from(1)]).unwrap_err();
    assert!(matches!(
        err,
        SolverError::ArityMismatch { expected: 2, found: 1, .. }
    ));
}

#[test]
fn test_malformed_table_rejected() {
    let err = Relation::facts("bad", 2, vec![vec![Term::from(1)]]).unwrap_err();
    assert!(matches!(err, SolverError::Invariant { ref subject, .. } if subject == "fact table"));
}

#[test]
fn test_non_ground_row_rejected() {
    let x = relata_core::Var::fresh();
    let rows = vec![vec![Term::from(1), Term::from(2)], vec![Term::from(3), Term::from(x)]];
    let err = FactTable::from_rows(2, rows).unwrap_err();
    match err {
        SolverError::Invariant { subject, message } => {
            assert_eq!(subject, "fact table");
            assert_eq!(message, "row 1 column 1 is not ground");
        }
        other => panic!("expected an invariant error, got {:?}", other),
    }
}

#[test]
fn test_table_pattern_filtering() {
    let table = FactTable::from_rows(2, crate::test_utils::int_rows(&[&[1, 2], &[1, 3], &[2, 3]])).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.size(&[None, None]), SizeBound::Exact(3));
    assert_eq!(table.size(&[Some(Term::from(1)), None]), SizeBound::Exact(2));
    assert_eq!(
        table.size(&[Some(Term::from(1)), Some(Term::from(3))]),
        SizeBound::Exact(1)
    );
    assert_eq!(table.size(&[Some(Term::from(9)), None]), SizeBound::Exact(0));

    let rows: Vec<Row> = table.enumerate(&[None, Some(Term::from(3))]).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], Term::from(1));
    assert_eq!(rows[1][0], Term::from(2));
}

#[test]
fn test_column_values() {
    let table = FactTable::from_rows(2, family_tree()).unwrap();
    let parents = table.column_values(0).unwrap();
    assert_eq!(parents.len(), 3);
    assert!(parents.contains(&Term::from("bea")));
    assert!(table.column_values(5).is_none());
    assert!(FactTable::empty(1).is_empty());
}

#[test]
fn test_bound_args_narrow_enumeration() {
    let [y] = vars();
    let (rel, source) = counted_relation("r", 2, crate::test_utils::int_rows(&[&[1, 10], &[2, 20]]));
    let goal = conj(vec![
        eq(Var::fresh(), 0),
        rel.goal(vec![Term::from(2), Term::from(y)]).unwrap(),
    ]);
    let answers = run(&goal);
    assert_eq!(sorted_values_of(&answers, y), vec![Term::from(20)]);
    assert_eq!(source.enumerations(), 1);
}

#[test]
fn test_apply_is_lazy() {
    let [x] = vars();
    let (rel, source) = counted_relation("r", 1, crate::test_utils::range_rows(5));
    let stream = rel.goal(vec![Term::from(x)]).unwrap().apply(Context::new());
    assert_eq!(source.calls(), 0);
    let first = stream.contexts().next();
    assert!(first.is_some());
    assert_eq!(source.enumerations(), 1);
}

#[test]
fn test_shuffled_is_a_seeded_permutation() {
    let [x] = vars();
    let rel = Relation::facts("n", 1, crate::test_utils::range_rows(20)).unwrap();
    let natural = run(&rel.goal(vec![Term::from(x)]).unwrap());
    let first = run(&rel.shuffled(vec![Term::from(x)], 42).unwrap());
    let again = run(&rel.shuffled(vec![Term::from(x)], 42).unwrap());

    let order = |ctxs: &[Context]| crate::test_utils::values_of(ctxs, x);
    assert_eq!(order(&first), order(&again));
    assert_ne!(order(&first), order(&natural));
    assert_eq!(sorted_values_of(&first, x), sorted_values_of(&natural, x));
}

#[derive(Debug, Default)]
struct RowLog(Mutex<Vec<(String, usize, usize)>>);

impl Observer for RowLog {
    fn on_event(&self, key: &[&'static str], _ctx: &Context, payload: &HookPayload<'_>) {
        if let HookPayload::Row { index, total, .. } = payload {
            self.0.lock().unwrap().push((key[2].to_string(), *index, *total));
        }
    }
}

#[test]
fn test_row_broadcasts() {
    let log = Arc::new(RowLog::default());
    let hooks = HookRegistry::builder()
        .observe(&["relation", "row"], log.clone())
        .build();
    let ctx = Context::new().with_hooks(Arc::new(hooks));
    let rel = int_relation("r", 2, &[&[1, 1], &[1, 2], &[2, 2]]);
    let [x] = vars();

    let goal = rel.goal(vec![Term::from(x), Term::from(x)]).unwrap();
    assert_eq!(goal.apply(ctx).contexts().count(), 2);
    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            ("succeeded".to_string(), 0, 3),
            ("failed".to_string(), 1, 3),
            ("succeeded".to_string(), 2, 3),
        ]
    );
    assert!(keys::ROW_FAILED.starts_with(&["relation", "row"]));
}

#[derive(Debug)]
struct Ragged;

impl FactSource for Ragged {
    fn arity(&self) -> usize {
        2
    }

    fn enumerate(&self, _pattern: &Pattern) -> RowIter {
        let rows: Vec<Row> = vec![
            vec![Term::from(1), Term::from(2)].into(),
            vec![Term::from(3)].into(),
        ];
        Box::new(rows.into_iter())
    }

    fn size(&self, _pattern: &Pattern) -> SizeBound {
        SizeBound::AtMost(2)
    }
}

#[test]
fn test_ragged_row_aborts() {
    let rel = Relation::new("ragged", Arc::new(Ragged));
    let [a, b] = vars();
    let results: Vec<_> = rel
        .goal(vec![Term::from(a), Term::from(b)])
        .unwrap()
        .apply(Context::new())
        .contexts()
        .collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    let fault = results[1].clone().unwrap_err();
    assert_eq!(fault.subject, "relation `ragged`");
}

#[test]
fn test_domain_of_repeated_var() {
    let rel = int_relation("r", 2, &[&[1, 2], &[2, 3], &[3, 3]]);
    let [x] = vars();
    let goal = rel.goal(vec![Term::from(x), Term::from(x)]).unwrap();
    let domain = goal
        .as_enumerable()
        .unwrap()
        .domain_of(x, &Context::new())
        .unwrap();
    let mut values: Vec<Term> = domain.iter().cloned().collect();
    values.sort();
    assert_eq!(values, vec![Term::from(2), Term::from(3)]);
}
