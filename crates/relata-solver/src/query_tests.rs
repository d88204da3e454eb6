//! Tests for the query driver.

use super::*;
use crate::event::CountingObserver;
use crate::goal::{delay, disj, eq, fresh, Goal};
use crate::heuristic::Plan;
use crate::relation::Relation;
use crate::stream::Fault;
use crate::termination::StepCountTermination;
use crate::test_utils::{family_tree, int_relation, vars};
use relata_config::QueryConfig;
use relata_core::{CondenseChains, CoreError, Facet};

fn parent() -> Relation {
    Relation::facts("parent", 2, family_tree()).unwrap()
}

fn never() -> GoalRef {
    delay(never)
}

fn values(query: &Query, var: Var) -> Vec<Term> {
    query
        .solutions()
        .map(|s| s.unwrap().get(var).cloned().unwrap())
        .collect()
}

#[test]
fn test_projects_resolved_terms() {
    let [who, child] = vars();
    let goal = parent()
        .goal(vec![Term::from(who), Term::from(child)])
        .unwrap();
    let query = Query::builder(goal).project([child, who]).build().unwrap();

    let solutions = query.take(10).unwrap();
    assert_eq!(solutions.len(), 5);
    let first = &solutions[0];
    assert_eq!(first.index(), 0);
    assert_eq!(first.len(), 2);
    assert_eq!(first.get(who), Some(&Term::from("ada")));
    assert_eq!(first.get(child), Some(&Term::from("bea")));
    assert_eq!(
        first.iter().map(|(v, _)| v).collect::<Vec<_>>(),
        vec![child, who]
    );
    assert_eq!(first.bindings_made(), 2);
}

#[test]
fn test_solutions_restart() {
    let [x] = vars();
    let query = Query::builder(disj(vec![eq(x, 1), eq(x, 2), eq(x, 3)]))
        .project([x])
        .build()
        .unwrap();

    let first_run = values(&query, x);
    let second_run = values(&query, x);
    assert_eq!(first_run, second_run);
    assert_eq!(first_run.len(), 3);
}

#[test]
fn test_wildcard_projection_rejected() {
    let [x] = vars();
    let err = Query::builder(eq(x, 1))
        .project([Var::WILDCARD])
        .build()
        .unwrap_err();
    assert!(matches!(err, SolverError::WildcardProjection));
}

#[test]
fn test_unknown_variable_rejected() {
    let [x, y] = vars();
    let err = Query::builder(eq(x, 1)).project([y]).build().unwrap_err();
    assert!(matches!(err, SolverError::UnknownVariable(v) if v == y));
}

#[test]
fn test_opaque_goal_accepts_any_projection() {
    let [x] = vars();
    let query = Query::builder(fresh(1, |v| eq(v[0], 1)))
        .project([x])
        .build()
        .unwrap();
    let solution = query.first().unwrap().unwrap();
    assert_eq!(solution.get(x), Some(&Term::Var(x)));
}

#[test]
fn test_invalid_config_rejected() {
    let [x] = vars();
    let err = Query::builder(eq(x, 1))
        .config(QueryConfig::new().with_solution_limit(0))
        .build()
        .unwrap_err();
    assert!(matches!(err, SolverError::Config(_)));
}

#[test]
fn test_and_conjoins_goals() {
    let [x] = vars();
    let r = int_relation("r", 1, &[&[1], &[2], &[3]]);
    let query = Query::builder(r.goal(vec![Term::from(x)]).unwrap())
        .and(eq(x, 2))
        .project([x])
        .build()
        .unwrap();
    assert_eq!(values(&query, x), vec![Term::from(2)]);
    assert_eq!(query.goal().name(), "conj");
}

#[test]
fn test_solution_limit() {
    let [x] = vars();
    let query = Query::builder(disj(vec![eq(x, 1), eq(x, 2), eq(x, 3)]))
        .project([x])
        .config(QueryConfig::new().with_solution_limit(2))
        .build()
        .unwrap();

    assert_eq!(query.count().unwrap(), 2);
    let stats = query.statistics();
    assert_eq!(stats.solution_count, 2);
    assert!(stats.terminated_early);
}

#[test]
fn test_step_limit_stops_infinite_search() {
    let query = Query::builder(never())
        .config(QueryConfig::new().with_step_limit(5))
        .build()
        .unwrap();

    assert!(query.first().unwrap().is_none());
    let stats = query.statistics();
    assert_eq!(stats.step_count, 5);
    assert_eq!(stats.solution_count, 0);
    assert!(stats.terminated_early);
}

#[test]
fn test_custom_termination() {
    let query = Query::builder(never())
        .termination(Box::new(StepCountTermination::new(3)))
        .build()
        .unwrap();
    assert_eq!(query.count().unwrap(), 0);
    assert_eq!(query.statistics().step_count, 3);
}

#[test]
fn test_fair_disjunction_through_query() {
    let [x] = vars();
    let query = Query::builder(disj(vec![never(), eq(x, 1)]))
        .project([x])
        .build()
        .unwrap();

    let mut run = query.solutions();
    let solution = run.next().unwrap().unwrap();
    assert_eq!(solution.get(x), Some(&Term::from(1)));
    assert!(run.scope().step_count() <= 4);
}

#[derive(Debug)]
struct Broken;

impl Goal for Broken {
    fn apply(&self, ctx: Context) -> Stream {
        Stream::cons(ctx, Stream::abort(Fault::new("facet `broken`", "boom")))
    }
}

#[test]
fn test_fault_ends_the_run() {
    let query = Query::builder(Arc::new(Broken)).build().unwrap();
    let results: Vec<_> = query.solutions().collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    match &results[1] {
        Err(SolverError::Invariant { subject, message }) => {
            assert_eq!(subject, "facet `broken`");
            assert_eq!(message, "boom");
        }
        other => panic!("expected an invariant error, got {:?}", other),
    }
}

struct Depth;
impl Facet for Depth {
    type Value = u32;
    const NAME: &'static str = "depth";
}

struct OtherDepth;
impl Facet for OtherDepth {
    type Value = String;
    const NAME: &'static str = "depth";
}

struct Shadow;
impl Facet for Shadow {
    type Value = u32;
    const NAME: &'static str = "planner";
}

/// Claims the `depth` facet name when a variable is bound to 2.
#[derive(Debug)]
struct ClaimDepthOnTwo;

impl BindHook for ClaimDepthOnTwo {
    fn on_bind(&self, ctx: Context, _var: Var, term: &Term) -> relata_core::Result<Option<Context>> {
        if *term == Term::from(2) {
            ctx.try_set::<OtherDepth>("two".to_string()).map(Some)
        } else {
            Ok(Some(ctx))
        }
    }
}

#[test]
fn test_facet_collision_in_search_ends_the_run() {
    let [x] = vars();
    let query = Query::builder(disj(vec![eq(x, 1), eq(x, 2), eq(x, 3)]))
        .project([x])
        .context(Context::new().set::<Depth>(0))
        .bind_hook(Arc::new(ClaimDepthOnTwo))
        .build()
        .unwrap();
    let results: Vec<_> = query.solutions().collect();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().get(x), Some(&Term::from(1)));
    match &results[1] {
        Err(SolverError::Invariant { subject, message }) => {
            assert_eq!(subject, "facet `depth`");
            assert!(message.contains("Facet key collision"));
        }
        other => panic!("expected an invariant error, got {:?}", other),
    }
}

#[test]
fn test_starting_context_reaches_goals() {
    let [x] = vars();
    let query = Query::builder(eq(x, 1))
        .context(Context::new().set::<Depth>(7))
        .build()
        .unwrap();
    assert_eq!(query.root().get::<Depth>(), Some(&7));
    assert_eq!(query.count().unwrap(), 1);
}

#[test]
fn test_starting_context_name_clash_is_reported() {
    let [x] = vars();
    let built = Query::builder(eq(x, 1))
        .context(Context::new().set::<Shadow>(1))
        .build();
    assert!(matches!(
        built,
        Err(SolverError::Core(CoreError::FacetCollision { name: "planner", .. }))
    ));
}

#[test]
fn test_lifecycle_events() {
    let [x] = vars();
    let counter = Arc::new(CountingObserver::new());
    let query = Query::builder(disj(vec![eq(x, 1), eq(x, 2)]))
        .project([x])
        .observe(&["query"], counter.clone())
        .build()
        .unwrap();

    assert_eq!(query.count().unwrap(), 2);
    assert_eq!(counter.queries_started(), 1);
    assert_eq!(counter.solutions(), 2);
    assert_eq!(counter.queries_ended(), 1);
    assert_eq!(counter.bindings(), 0);

    // dropping a run early still ends it
    let mut run = query.solutions();
    run.next();
    drop(run);
    assert_eq!(counter.queries_started(), 2);
    assert_eq!(counter.queries_ended(), 2);
    assert_eq!(query.statistics().solution_count, 1);
}

#[test]
fn test_latest_solution() {
    let [x] = vars();
    let query = Query::builder(disj(vec![eq(x, 1), eq(x, 2)]))
        .project([x])
        .build()
        .unwrap();

    assert!(query.latest_solution().is_none());
    query.count().unwrap();
    let latest = query.latest_solution().unwrap();
    assert_eq!(latest.index(), 1);
    assert_eq!(latest.get(x), Some(&Term::from(2)));
}

#[test]
fn test_first_of_wide_disjunction() {
    let [x] = vars();
    let query = Query::builder(disj((0..50_000).map(|i| eq(x, i))))
        .project([x])
        .build()
        .unwrap();
    let first = query.first().unwrap().unwrap();
    assert_eq!(first.get(x), Some(&Term::from(0)));
}

#[test]
fn test_size_hint() {
    let [x, y] = vars();
    let r = int_relation("r", 1, &[&[1], &[2], &[3]]);
    let query = Query::builder(r.goal(vec![Term::from(x)]).unwrap())
        .build()
        .unwrap();
    assert_eq!(query.size_hint(), SizeBound::Exact(3));

    let opaque = Query::builder(fresh(1, move |v| eq(v[0], y))).build().unwrap();
    assert_eq!(opaque.size_hint(), SizeBound::Unbounded);
}

#[test]
fn test_occurs_check_from_config() {
    let [x] = vars();
    let cyclic = || eq(x, Term::compound("f", vec![Term::from(x)]));

    let lenient = Query::builder(cyclic()).project([x]).build().unwrap();
    assert_eq!(lenient.count().unwrap(), 1);

    let strict = Query::builder(cyclic())
        .project([x])
        .config(QueryConfig::new().with_occurs_check(true))
        .build()
        .unwrap();
    assert_eq!(strict.count().unwrap(), 0);
}

#[derive(Debug)]
struct RejectTwo;

impl BindHook for RejectTwo {
    fn on_bind(&self, ctx: Context, _var: Var, term: &Term) -> relata_core::Result<Option<Context>> {
        if *term == Term::from(2) {
            Ok(None)
        } else {
            Ok(Some(ctx))
        }
    }
}

#[test]
fn test_bind_hook_vetoes() {
    let [x] = vars();
    let query = Query::builder(disj(vec![eq(x, 1), eq(x, 2), eq(x, 3)]))
        .project([x])
        .bind_hook(Arc::new(RejectTwo))
        .build()
        .unwrap();
    assert_eq!(values(&query, x), vec![Term::from(1), Term::from(3)]);
}

#[derive(Debug)]
struct Reverse;

impl HeuristicPass for Reverse {
    fn name(&self) -> &str {
        "reverse"
    }

    fn apply(&self, plan: Plan, _ctx: &Context) -> Plan {
        let mut goals = plan.into_goals();
        goals.reverse();
        Plan::new(goals)
    }
}

#[test]
fn test_extra_pass_runs_after_configured() {
    let [x] = vars();
    let query = Query::builder(eq(x, 1))
        .config(QueryConfig {
            heuristics: Some(Vec::new()),
            ..QueryConfig::default()
        })
        .pass(Arc::new(Reverse))
        .build()
        .unwrap();

    let pipeline = query.root().get::<Planner>().unwrap();
    assert_eq!(pipeline.pass_names(), vec!["reverse"]);
}

#[test]
fn test_solution_display() {
    let [x, y] = vars();
    let query = Query::builder(eq(x, y))
        .and(eq(y, 7))
        .project([x, y])
        .build()
        .unwrap();
    let solution = query.first().unwrap().unwrap();
    assert_eq!(solution.to_string(), format!("{{{} = 7, {} = 7}}", x, y));
}

#[test]
fn test_walk_hook_condenses_during_search() {
    let [x, y, z] = vars();
    let counter = Arc::new(CountingObserver::new());
    let goal = conj(vec![eq(x, y), eq(y, z), eq(z, 1), eq(x, 1)]);
    let query = Query::builder(goal)
        .project([x, y, z])
        .config(QueryConfig {
            heuristics: Some(Vec::new()),
            ..QueryConfig::default()
        })
        .observe(keys::SUBST_CONDENSE, counter.clone())
        .walk_hook(Arc::new(CondenseChains::new(2)))
        .build()
        .unwrap();

    let solution = query.first().unwrap().unwrap();
    for var in [x, y, z] {
        assert_eq!(solution.get(var), Some(&Term::from(1)));
    }
    assert_eq!(counter.condensed(), 1);
}
