//! Conjunction and disjunction.

use std::sync::Arc;

use relata_core::{Constraint, Context};
use tracing::trace;

use super::{CtxSized, Goal, GoalRef, GoalVars, SizeBound, Vared};
use crate::heuristic::Planner;
use crate::stream::Stream;

/// Attaches `constraints` to `ctx`, checking each once.
fn attach_all(ctx: Context, constraints: &[Arc<dyn Constraint>]) -> Option<Context> {
    constraints
        .iter()
        .try_fold(ctx, |ctx, c| ctx.constrain(Arc::clone(c)))
}

fn union_vars(goals: &[GoalRef], constraints: &[Arc<dyn Constraint>]) -> Option<GoalVars> {
    let mut vars = GoalVars::new();
    for goal in goals {
        for var in goal.as_vared()?.vars() {
            if !vars.contains(&var) {
                vars.push(var);
            }
        }
    }
    for constraint in constraints {
        for var in constraint.vars() {
            if !vars.contains(&var) {
                vars.push(var);
            }
        }
    }
    Some(vars)
}

/// All sub-goals hold.
///
/// When the context carries a heuristic pipeline, the sub-goals are
/// planned against the context before running.
#[derive(Debug, Clone, Default)]
pub struct Conj {
    goals: Vec<GoalRef>,
    constraints: Vec<Arc<dyn Constraint>>,
    vars: Option<GoalVars>,
}

impl Conj {
    pub fn new(goals: Vec<GoalRef>) -> Self {
        let vars = union_vars(&goals, &[]);
        Self {
            goals,
            constraints: Vec::new(),
            vars,
        }
    }

    /// Attaches `constraint` before any sub-goal runs.
    pub fn with_constraint(mut self, constraint: Arc<dyn Constraint>) -> Self {
        self.constraints.push(constraint);
        self.vars = union_vars(&self.goals, &self.constraints);
        self
    }

    pub fn goals(&self) -> &[GoalRef] {
        &self.goals
    }

    pub fn constraints(&self) -> &[Arc<dyn Constraint>] {
        &self.constraints
    }
}

impl Goal for Conj {
    fn apply(&self, ctx: Context) -> Stream {
        let Some(ctx) = attach_all(ctx, &self.constraints) else {
            return Stream::Empty;
        };
        let goals = match ctx.get::<Planner>() {
            Some(pipeline) if !pipeline.is_empty() && self.goals.len() > 1 => {
                pipeline.plan(&self.goals, &ctx)
            }
            _ => self.goals.clone(),
        };
        trace!(event = "conj", goals = goals.len());
        goals
            .into_iter()
            .fold(Stream::unit(ctx), |stream, goal| stream.bind(goal))
    }

    fn name(&self) -> &str {
        "conj"
    }

    fn as_vared(&self) -> Option<&dyn Vared> {
        self.vars.as_ref().map(|_| self as &dyn Vared)
    }

    fn as_ctx_sized(&self) -> Option<&dyn CtxSized> {
        Some(self)
    }
}

impl Vared for Conj {
    fn vars(&self) -> GoalVars {
        self.vars.clone().unwrap_or_default()
    }
}

impl CtxSized for Conj {
    /// Product of the sub-goals. An unsized sub-goal makes the product
    /// unbounded unless another one is zero.
    fn ctx_size(&self, ctx: &Context) -> SizeBound {
        SizeBound::product(
            self.goals
                .iter()
                .map(|g| g.as_ctx_sized().map_or(SizeBound::Unbounded, |s| s.ctx_size(ctx))),
        )
    }
}

/// At least one sub-goal holds. Branches are interleaved fairly.
#[derive(Debug, Clone, Default)]
pub struct Disj {
    goals: Vec<GoalRef>,
    constraints: Vec<Arc<dyn Constraint>>,
    vars: Option<GoalVars>,
}

impl Disj {
    pub fn new(goals: Vec<GoalRef>) -> Self {
        let vars = union_vars(&goals, &[]);
        Self {
            goals,
            constraints: Vec::new(),
            vars,
        }
    }

    /// Attaches `constraint` before the branches run.
    pub fn with_constraint(mut self, constraint: Arc<dyn Constraint>) -> Self {
        self.constraints.push(constraint);
        self.vars = union_vars(&self.goals, &self.constraints);
        self
    }

    pub fn goals(&self) -> &[GoalRef] {
        &self.goals
    }
}

impl Goal for Disj {
    fn apply(&self, ctx: Context) -> Stream {
        let Some(ctx) = attach_all(ctx, &self.constraints) else {
            return Stream::Empty;
        };
        let branches = self.goals.iter().map(|g| g.apply(ctx.clone())).collect();
        Stream::interleave(branches)
    }

    fn name(&self) -> &str {
        "disj"
    }

    fn as_vared(&self) -> Option<&dyn Vared> {
        self.vars.as_ref().map(|_| self as &dyn Vared)
    }

    fn as_ctx_sized(&self) -> Option<&dyn CtxSized> {
        Some(self)
    }
}

impl Vared for Disj {
    fn vars(&self) -> GoalVars {
        self.vars.clone().unwrap_or_default()
    }
}

impl CtxSized for Disj {
    /// Sum of the branches; unbounded unless every branch is sized.
    fn ctx_size(&self, ctx: &Context) -> SizeBound {
        self.goals
            .iter()
            .map(|g| g.as_ctx_sized().map_or(SizeBound::Unbounded, |s| s.ctx_size(ctx)))
            .fold(SizeBound::Exact(0), SizeBound::plus)
    }
}

/// Conjunction of `goals`.
pub fn conj(goals: impl IntoIterator<Item = GoalRef>) -> GoalRef {
    Arc::new(Conj::new(goals.into_iter().collect()))
}

/// Fair disjunction of `goals`.
pub fn disj(goals: impl IntoIterator<Item = GoalRef>) -> GoalRef {
    Arc::new(Disj::new(goals.into_iter().collect()))
}
