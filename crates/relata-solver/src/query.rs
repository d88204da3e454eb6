//! Query entry point.
//!
//! A [`Query`] owns a goal, the variables to report and a root context
//! carrying the hook registry, the planner and the occurs-check setting.
//! [`Query::solutions`] starts a fresh run every time it is called; each
//! run pulls the goal's stream lazily and projects every yielded context
//! onto the projected variables.
//!
//! # Example
//!
//! ```
//! use relata_core::{Term, Var};
//! use relata_solver::goal::{disj, eq};
//! use relata_solver::query::Query;
//!
//! let x = Var::fresh();
//! let query = Query::builder(disj(vec![eq(x, 1), eq(x, 2)]))
//!     .project([x])
//!     .build()
//!     .unwrap();
//!
//! let values: Vec<Term> = query
//!     .solutions()
//!     .map(|s| s.unwrap().get(x).cloned().unwrap())
//!     .collect();
//! assert_eq!(values, vec![Term::from(1), Term::from(2)]);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use relata_config::QueryConfig;
use relata_core::{
    keys, BindHook, Context, HookPayload, HookRegistryBuilder, Hooks, Observer, Term, Unification,
    Var, WalkHook,
};
use tracing::{debug, info};

use crate::builder::{occurs_check, PipelineBuilder, TerminationBuilder};
use crate::error::{Result, SolverError};
use crate::goal::{conj, GoalRef, SizeBound};
use crate::heuristic::{HeuristicPass, Planner};
use crate::scope::SearchScope;
use crate::statistics::QueryStatistics;
use crate::stream::{Step, Stream};
use crate::termination::{OrTermination, Termination};

/// One answer of a query: the projected variables and their resolved terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    index: u64,
    bindings: Vec<(Var, Term)>,
    bindings_made: u64,
}

impl Solution {
    /// Position of this solution in its run, starting at zero.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The resolved term of a projected variable.
    pub fn get(&self, var: Var) -> Option<&Term> {
        self.bindings
            .iter()
            .find(|(v, _)| *v == var)
            .map(|(_, term)| term)
    }

    /// Projected variables in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (Var, &Term)> {
        self.bindings.iter().map(|(var, term)| (*var, term))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings the branch made before reaching this solution.
    pub fn bindings_made(&self) -> u64 {
        self.bindings_made
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (var, term)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} = {}", var, term)?;
        }
        f.write_str("}")
    }
}

/// A goal ready to be solved.
pub struct Query {
    goal: GoalRef,
    projection: Vec<Var>,
    root: Context,
    termination: Option<Box<dyn Termination>>,
    statistics: Mutex<QueryStatistics>,
    latest: Mutex<Option<Solution>>,
}

impl Query {
    pub fn builder(goal: GoalRef) -> QueryBuilder {
        QueryBuilder::new(goal)
    }

    /// The top-level goal.
    pub fn goal(&self) -> &GoalRef {
        &self.goal
    }

    pub fn projection(&self) -> &[Var] {
        &self.projection
    }

    /// The context every run starts from.
    pub fn root(&self) -> &Context {
        &self.root
    }

    /// Starts a new run.
    pub fn solutions(&self) -> Solutions<'_> {
        Solutions::start(self)
    }

    /// The first solution, if any.
    pub fn first(&self) -> Result<Option<Solution>> {
        self.solutions().next().transpose()
    }

    /// Up to `n` solutions, in stream order.
    pub fn take(&self, n: usize) -> Result<Vec<Solution>> {
        self.solutions().take(n).collect()
    }

    /// Runs to exhaustion and counts the solutions.
    pub fn count(&self) -> Result<usize> {
        let mut count = 0;
        for solution in self.solutions() {
            solution?;
            count += 1;
        }
        Ok(count)
    }

    /// The goal's own estimate of its answer count in the root context.
    pub fn size_hint(&self) -> SizeBound {
        self.goal
            .as_ctx_sized()
            .map_or(SizeBound::Unbounded, |sized| sized.ctx_size(&self.root))
    }

    /// Statistics of the most recent run.
    pub fn statistics(&self) -> QueryStatistics {
        *lock(&self.statistics)
    }

    /// The last solution yielded by any run.
    pub fn latest_solution(&self) -> Option<Solution> {
        lock(&self.latest).clone()
    }

    fn project(&self, ctx: &Context, index: u64) -> Solution {
        Solution {
            index,
            bindings: self
                .projection
                .iter()
                .map(|&var| (var, ctx.resolve(&Term::Var(var))))
                .collect(),
            bindings_made: ctx.counter("bindings"),
        }
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("goal", &self.goal)
            .field("projection", &self.projection)
            .field("termination", &self.termination)
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builder for [`Query`].
pub struct QueryBuilder {
    goals: Vec<GoalRef>,
    projection: Vec<Var>,
    config: QueryConfig,
    hooks: HookRegistryBuilder,
    passes: Vec<Arc<dyn HeuristicPass>>,
    termination: Option<Box<dyn Termination>>,
    context: Context,
}

impl QueryBuilder {
    fn new(goal: GoalRef) -> Self {
        Self {
            goals: vec![goal],
            projection: Vec::new(),
            config: QueryConfig::default(),
            hooks: HookRegistryBuilder::default(),
            passes: Vec::new(),
            termination: None,
            context: Context::new(),
        }
    }

    /// Conjoins another top-level goal.
    pub fn and(mut self, goal: GoalRef) -> Self {
        self.goals.push(goal);
        self
    }

    /// Adds variables to report in every solution.
    pub fn project(mut self, vars: impl IntoIterator<Item = Var>) -> Self {
        for var in vars {
            if !self.projection.contains(&var) {
                self.projection.push(var);
            }
        }
        self
    }

    pub fn config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribes an observer to `key` and every key below it.
    pub fn observe(mut self, key: &[&'static str], observer: Arc<dyn Observer>) -> Self {
        self.hooks = self.hooks.observe(key, observer);
        self
    }

    pub fn bind_hook(mut self, hook: Arc<dyn BindHook>) -> Self {
        self.hooks = self.hooks.bind_hook(hook);
        self
    }

    pub fn walk_hook(mut self, hook: Arc<dyn WalkHook>) -> Self {
        self.hooks = self.hooks.walk_hook(hook);
        self
    }

    /// Starts the search from `ctx` instead of an empty context, so custom
    /// facets are visible to goals and hooks.
    pub fn context(mut self, ctx: Context) -> Self {
        self.context = ctx;
        self
    }

    /// Appends a planning pass after the configured ones.
    pub fn pass(mut self, pass: Arc<dyn HeuristicPass>) -> Self {
        self.passes.push(pass);
        self
    }

    /// Adds a termination; any configured limits still apply.
    pub fn termination(mut self, termination: Box<dyn Termination>) -> Self {
        self.termination = Some(match self.termination.take() {
            Some(existing) => Box::new(OrTermination::new(vec![existing, termination])),
            None => termination,
        });
        self
    }

    /// Validates the configuration and the projection.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Config`] for an invalid configuration,
    /// [`SolverError::WildcardProjection`] if the wildcard is projected and
    /// [`SolverError::UnknownVariable`] if a projected variable does not
    /// occur in a goal that reports its variables. A facet of the starting
    /// context whose name clashes with the solver's own facets is reported
    /// as [`SolverError::Core`].
    pub fn build(self) -> Result<Query> {
        let QueryBuilder {
            mut goals,
            projection,
            config,
            hooks,
            passes,
            termination,
            context,
        } = self;

        config.validate()?;

        let goal = if goals.len() == 1 {
            goals.remove(0)
        } else {
            conj(goals)
        };

        for &var in &projection {
            if var.is_wildcard() {
                return Err(SolverError::WildcardProjection);
            }
            if let Some(vared) = goal.as_vared() {
                if !vared.vars().contains(&var) {
                    return Err(SolverError::UnknownVariable(var));
                }
            }
        }

        let mut pipeline = PipelineBuilder::build(&config);
        for pass in passes {
            pipeline.push(pass);
        }

        let termination = match (TerminationBuilder::build(&config), termination) {
            (Some(configured), Some(custom)) => {
                Some(Box::new(OrTermination::new(vec![configured, custom])) as Box<dyn Termination>)
            }
            (configured, custom) => configured.or(custom),
        };

        debug!(
            event = "query_built",
            projected = projection.len(),
            passes = pipeline.len(),
            occurs_check = config.occurs_check,
            terminates = termination.is_some(),
        );

        let hooks = hooks.build();
        let mut root = context.try_set::<Unification>(occurs_check(&config))?;
        if !hooks.is_empty() {
            root = root.try_set::<Hooks>(Arc::new(hooks))?;
        }
        let root = root.try_set::<Planner>(Arc::new(pipeline))?;

        Ok(Query {
            goal,
            projection,
            root,
            termination,
            statistics: Mutex::new(QueryStatistics::default()),
            latest: Mutex::new(None),
        })
    }
}

/// One run of a query.
///
/// Each call to `next` checks the termination before every move of the
/// stream, then forces suspensions until a context is yielded. Dropping
/// the iterator ends the run.
pub struct Solutions<'q> {
    query: &'q Query,
    stream: Option<Stream>,
    scope: SearchScope,
    terminated_early: bool,
}

impl<'q> Solutions<'q> {
    fn start(query: &'q Query) -> Self {
        info!(
            event = "query_start",
            projected = query.projection.len(),
            goal = query.goal.name(),
        );
        query.root.fire(keys::QUERY_STARTED, &HookPayload::None);

        let stream = query.goal.apply(query.root.clone());
        Self {
            query,
            stream: Some(stream),
            scope: SearchScope::start(),
            terminated_early: false,
        }
    }

    /// Progress of this run so far.
    pub fn scope(&self) -> &SearchScope {
        &self.scope
    }

    fn is_terminated(&self) -> bool {
        self.query
            .termination
            .as_ref()
            .is_some_and(|t| t.is_terminated(&self.scope))
    }

    fn finish(&mut self) {
        if self.stream.take().is_none() {
            return;
        }
        let statistics = QueryStatistics {
            duration: self.scope.elapsed(),
            step_count: self.scope.step_count(),
            solution_count: self.scope.solution_count(),
            terminated_early: self.terminated_early,
        };
        *lock(&self.query.statistics) = statistics;

        self.query.root.fire(
            keys::QUERY_ENDED,
            &HookPayload::Lifecycle {
                steps: statistics.step_count,
                solutions: statistics.solution_count,
            },
        );
        info!(
            event = "query_end",
            steps = statistics.step_count,
            solutions = statistics.solution_count,
            duration_ms = statistics.duration.as_millis() as u64,
            terminated_early = statistics.terminated_early,
        );
    }
}

impl Iterator for Solutions<'_> {
    type Item = Result<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.is_terminated() {
                if self.stream.is_some() {
                    debug!(
                        event = "terminated",
                        steps = self.scope.step_count(),
                        solutions = self.scope.solution_count(),
                    );
                    self.terminated_early = true;
                }
                self.finish();
                return None;
            }

            match self.stream.take()?.step() {
                Step::Done => {
                    self.stream = Some(Stream::Empty);
                    self.finish();
                    return None;
                }
                Step::Yield(ctx, rest) => {
                    self.stream = Some(rest);
                    let index = self.scope.solution_count();
                    self.scope.record_solution();
                    let solution = self.query.project(&ctx, index);
                    ctx.fire(keys::QUERY_SOLUTION, &HookPayload::Solution { index });
                    *lock(&self.query.latest) = Some(solution.clone());
                    return Some(Ok(solution));
                }
                Step::Forced(next) => {
                    self.scope.increment_step_count();
                    self.stream = Some(next);
                }
                Step::Fault(fault) => {
                    self.stream = Some(Stream::Empty);
                    self.finish();
                    return Some(Err(fault.into()));
                }
            }
        }
    }
}

impl Drop for Solutions<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl fmt::Debug for Solutions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solutions")
            .field("scope", &self.scope)
            .field("running", &self.stream.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
