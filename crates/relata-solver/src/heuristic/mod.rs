//! Conjunction planning.
//!
//! Before a conjunction runs, its sub-goals go through an ordered chain
//! of [`HeuristicPass`]es. Passes inspect goals through their
//! capabilities but never run them. They may reorder goals, swap a goal
//! for an equivalent one, prepend auxiliary constraint goals, or decide
//! that the conjunction cannot hold at all. Every pass preserves the set
//! of solutions.
//!
//! Introspection is done once per planning run: each goal's free
//! variables and size bound are computed when the [`Plan`] is built and
//! shared by every pass.
//!
//! # Example
//!
//! ```
//! use relata_solver::heuristic::HeuristicPipeline;
//!
//! let pipeline = HeuristicPipeline::builder()
//!     .chain_shared_vars()
//!     .relevance()
//!     .cardinality()
//!     .randomize_order(Some(7))
//!     .build();
//! assert_eq!(
//!     pipeline.pass_names(),
//!     vec!["chain_shared_vars", "relevance", "cardinality", "randomize_order"]
//! );
//! ```

mod cardinality;
mod chain;
mod randomize;
mod relevance;

use std::fmt::Debug;
use std::sync::Arc;

use relata_core::{Context, Facet, Term, Var};
use tracing::debug;

use crate::goal::{fail, GoalRef, GoalVars, SizeBound};

pub use cardinality::CardinalityPass;
pub use chain::ChainSharedVars;
pub use randomize::RandomizeOrder;
pub use relevance::Relevance;

/// A goal of a conjunction together with what planning knows about it.
#[derive(Debug, Clone)]
pub struct PlannedGoal {
    goal: GoalRef,
    vars: Option<GoalVars>,
    size: Option<SizeBound>,
}

impl PlannedGoal {
    /// Inspects `goal` in `ctx`: its unbound variables if it is vared and
    /// its size bound if it is sized.
    pub fn inspect(goal: GoalRef, ctx: &Context) -> Self {
        let vars = goal.as_vared().map(|vared| {
            let mut free = GoalVars::new();
            for var in vared.vars() {
                for reached in ctx.free_vars(&Term::Var(var)) {
                    if !free.contains(&reached) {
                        free.push(reached);
                    }
                }
            }
            free
        });
        let size = goal.as_ctx_sized().map(|sized| sized.ctx_size(ctx));
        Self { goal, vars, size }
    }

    /// An auxiliary goal added by a pass. Only its variables are recorded.
    pub fn injected(goal: GoalRef) -> Self {
        let vars = goal.as_vared().map(|v| v.vars());
        Self {
            goal,
            vars,
            size: None,
        }
    }

    /// The same planning facts for a replacement goal.
    pub fn replaced(&self, goal: GoalRef) -> Self {
        Self {
            goal,
            vars: self.vars.clone(),
            size: self.size,
        }
    }

    pub fn goal(&self) -> &GoalRef {
        &self.goal
    }

    pub fn vars(&self) -> &[Var] {
        self.vars.as_deref().unwrap_or(&[])
    }

    pub fn size(&self) -> Option<SizeBound> {
        self.size
    }

    /// True for goals that are both vared and sized.
    pub fn is_vared_sized(&self) -> bool {
        self.vars.is_some() && self.size.is_some()
    }

    pub fn mentions(&self, var: Var) -> bool {
        self.vars().contains(&var)
    }

    pub fn shares_vars(&self, other: &[Var]) -> bool {
        self.vars().iter().any(|v| other.contains(v))
    }
}

/// Working state of one planning run.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    goals: Vec<PlannedGoal>,
    failed: bool,
}

impl Plan {
    pub fn new(goals: Vec<PlannedGoal>) -> Self {
        Self {
            goals,
            failed: false,
        }
    }

    /// Inspects every goal once.
    pub fn inspect(goals: &[GoalRef], ctx: &Context) -> Self {
        Self::new(
            goals
                .iter()
                .map(|g| PlannedGoal::inspect(Arc::clone(g), ctx))
                .collect(),
        )
    }

    /// A plan for a conjunction known to have no solution.
    pub fn failed() -> Self {
        Self {
            goals: Vec::new(),
            failed: true,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn goals(&self) -> &[PlannedGoal] {
        &self.goals
    }

    pub fn into_goals(self) -> Vec<PlannedGoal> {
        self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// The goals to run, in order. A failed plan runs a single `fail`.
    pub fn into_goal_refs(self) -> Vec<GoalRef> {
        if self.failed {
            return vec![fail()];
        }
        self.goals.into_iter().map(|p| p.goal).collect()
    }
}

/// One step of conjunction planning.
pub trait HeuristicPass: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Rewrites `plan`. Only called on plans that have not failed.
    fn apply(&self, plan: Plan, ctx: &Context) -> Plan;
}

/// An ordered chain of passes.
#[derive(Debug, Clone, Default)]
pub struct HeuristicPipeline {
    passes: Vec<Arc<dyn HeuristicPass>>,
}

impl HeuristicPipeline {
    pub fn new(passes: Vec<Arc<dyn HeuristicPass>>) -> Self {
        Self { passes }
    }

    pub fn builder() -> HeuristicPipelineBuilder {
        HeuristicPipelineBuilder::default()
    }

    /// Chaining, relevance, cardinality and randomization, in that order.
    pub fn standard(seed: Option<u64>) -> Self {
        Self::builder()
            .chain_shared_vars()
            .relevance()
            .cardinality()
            .randomize_order(seed)
            .build()
    }

    /// Appends a pass after the existing ones.
    pub fn push(&mut self, pass: Arc<dyn HeuristicPass>) {
        self.passes.push(pass);
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Plans the sub-goals of a conjunction against `ctx`.
    pub fn plan(&self, goals: &[GoalRef], ctx: &Context) -> Vec<GoalRef> {
        let mut plan = Plan::inspect(goals, ctx);
        for pass in &self.passes {
            if plan.is_failed() {
                break;
            }
            plan = pass.apply(plan, ctx);
        }
        debug!(
            event = "plan",
            goals_in = goals.len(),
            goals_out = plan.len(),
            failed = plan.is_failed(),
        );
        plan.into_goal_refs()
    }
}

/// Builder for [`HeuristicPipeline`].
#[derive(Debug, Default)]
pub struct HeuristicPipelineBuilder {
    passes: Vec<Arc<dyn HeuristicPass>>,
}

impl HeuristicPipelineBuilder {
    pub fn pass(mut self, pass: Arc<dyn HeuristicPass>) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn chain_shared_vars(self) -> Self {
        self.pass(Arc::new(ChainSharedVars))
    }

    pub fn relevance(self) -> Self {
        self.pass(Arc::new(Relevance))
    }

    pub fn cardinality(self) -> Self {
        self.pass(Arc::new(CardinalityPass))
    }

    /// Shuffles relation rows; `None` draws a seed from the thread rng.
    pub fn randomize_order(self, seed: Option<u64>) -> Self {
        let pass = match seed {
            Some(seed) => RandomizeOrder::new(seed),
            None => RandomizeOrder::from_entropy(),
        };
        self.pass(Arc::new(pass))
    }

    pub fn build(self) -> HeuristicPipeline {
        HeuristicPipeline::new(self.passes)
    }
}

/// The pipeline conjunctions plan with.
pub struct Planner;

impl Facet for Planner {
    type Value = Arc<HeuristicPipeline>;
    const NAME: &'static str = "planner";
}
