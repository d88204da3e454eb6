//! Search-level properties checked over generated fact sets.

mod common;

use common::unplanned;
use proptest::prelude::*;
use relata::prelude::*;
use relata::{HeuristicConfig, RandomizeOrderConfig, SizeBound};
use relata_test::vars;

type Rows = Vec<(i64, i64)>;

fn relation(name: &str, rows: &Rows) -> Relation {
    Relation::facts(
        name,
        2,
        rows.iter().map(|&(a, b)| vec![Term::from(a), Term::from(b)]),
    )
    .unwrap()
}

fn rows() -> impl Strategy<Value = Rows> {
    prop::collection::vec((0i64..4, 0i64..4), 0..8)
}

/// Distinct answers of `goal` projected onto `vars`, sorted.
fn answers(goal: GoalRef, vars: [Var; 3], config: QueryConfig) -> Vec<Vec<Term>> {
    let query = Query::builder(goal)
        .project(vars)
        .config(config)
        .build()
        .unwrap();
    let mut out: Vec<Vec<Term>> = query
        .solutions()
        .map(|s| {
            let s = s.unwrap();
            vars.iter().map(|v| s.get(*v).cloned().unwrap()).collect()
        })
        .collect();
    out.sort();
    out.dedup();
    out
}

/// A triangle `r(x, y), s(y, z), t(z, x)` as three separate goals.
fn triangle(r: &Rows, s: &Rows, t: &Rows, [x, y, z]: [Var; 3]) -> [GoalRef; 3] {
    [
        relation("r", r).goal(vec![x.into(), y.into()]).unwrap(),
        relation("s", s).goal(vec![y.into(), z.into()]).unwrap(),
        relation("t", t).goal(vec![z.into(), x.into()]).unwrap(),
    ]
}

fn single_pass(pass: HeuristicConfig) -> QueryConfig {
    QueryConfig {
        heuristics: Some(vec![pass]),
        ..QueryConfig::default()
    }
}

fn nested_delay(depth: usize, goal: GoalRef) -> GoalRef {
    (0..depth).fold(goal, |inner, _| delay(move || inner.clone()))
}

fn forever() -> GoalRef {
    delay(forever)
}

/// A goal tree over three variables and small integers.
#[derive(Debug, Clone)]
enum Shape {
    Eq(usize, i64),
    Succeed,
    Fail,
    Conj(Vec<Shape>),
    Disj(Vec<Shape>),
    Delay(Box<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        (0usize..3, 0i64..3).prop_map(|(var, value)| Shape::Eq(var, value)),
        Just(Shape::Succeed),
        Just(Shape::Fail),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Shape::Conj),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Shape::Disj),
            inner.prop_map(|s| Shape::Delay(Box::new(s))),
        ]
    })
}

fn build(shape: &Shape, vars: [Var; 3]) -> GoalRef {
    match shape {
        Shape::Eq(var, value) => eq(vars[*var], *value),
        Shape::Succeed => succeed(),
        Shape::Fail => fail(),
        Shape::Conj(items) => conj(items.iter().map(|s| build(s, vars)).collect::<Vec<_>>()),
        Shape::Disj(items) => disj(items.iter().map(|s| build(s, vars)).collect::<Vec<_>>()),
        Shape::Delay(inner) => {
            let goal = build(inner, vars);
            delay(move || goal.clone())
        }
    }
}

proptest! {
    #[test]
    fn conj_is_associative(r in rows(), s in rows(), t in rows()) {
        let vs = vars();
        let [a, b, c] = triangle(&r, &s, &t, vs);

        let left = conj(vec![conj(vec![a.clone(), b.clone()]), c.clone()]);
        let right = conj(vec![a, conj(vec![b, c])]);
        prop_assert_eq!(
            answers(left, vs, unplanned()),
            answers(right, vs, unplanned())
        );
    }

    #[test]
    fn heuristics_preserve_solutions(r in rows(), s in rows(), t in rows(), seed in any::<u64>()) {
        let vs = vars();
        let goal = conj(triangle(&r, &s, &t, vs).to_vec());
        let expected = answers(goal.clone(), vs, unplanned());

        let configs = vec![
            single_pass(HeuristicConfig::ChainSharedVars),
            single_pass(HeuristicConfig::Relevance),
            single_pass(HeuristicConfig::Cardinality),
            single_pass(HeuristicConfig::RandomizeOrder(RandomizeOrderConfig { seed: Some(seed) })),
            QueryConfig::new().with_random_seed(seed),
        ];
        for config in configs {
            prop_assert_eq!(&answers(goal.clone(), vs, config), &expected);
        }
    }

    #[test]
    fn disjunction_is_fair(depth in 0usize..40) {
        let [x] = vars();
        let finite = nested_delay(depth, eq(x, 1));
        let query = Query::builder(disj(vec![forever(), finite]))
            .project([x])
            .build()
            .unwrap();

        let mut run = query.solutions();
        let first = run.next().unwrap().unwrap();
        prop_assert_eq!(first.get(x), Some(&Term::from(1)));
        prop_assert!(run.scope().step_count() <= 2 * depth as u64 + 1);
    }

    #[test]
    fn size_hint_bounds_answer_count(tree in shape()) {
        let vs = vars();
        let query = Query::builder(build(&tree, vs)).build().unwrap();
        let count = query.count().unwrap() as u64;
        match query.size_hint() {
            SizeBound::Exact(n) => prop_assert_eq!(count, n),
            SizeBound::AtMost(n) => prop_assert!(count <= n),
            SizeBound::Unbounded => {}
        }
    }
}
