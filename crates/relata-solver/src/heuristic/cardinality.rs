//! Cardinality constraint injection.

use std::sync::Arc;

use relata_core::{Context, Var};
use tracing::debug;

use super::{HeuristicPass, Plan, PlannedGoal};
use crate::constraint::Cardinality;
use crate::goal::{constrain, GoalRef, SizeBound};

/// Groups adjacent vared and sized goals that share variables into runs.
///
/// A run whose size product is already zero fails the plan. Every run of
/// two or more goals gets a [`Cardinality`] constraint in front of it, so
/// the branch is pruned as soon as a binding empties one of its goals.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardinalityPass;

impl HeuristicPass for CardinalityPass {
    fn name(&self) -> &str {
        "cardinality"
    }

    fn apply(&self, plan: Plan, _ctx: &Context) -> Plan {
        let mut out: Vec<PlannedGoal> = Vec::with_capacity(plan.len() + 1);
        let mut run: Vec<PlannedGoal> = Vec::new();
        let mut run_vars: Vec<Var> = Vec::new();

        for goal in plan.into_goals() {
            let joins = goal.is_vared_sized() && (run.is_empty() || goal.shares_vars(&run_vars));
            if !joins && !flush(&mut out, &mut run, &mut run_vars) {
                return Plan::failed();
            }
            if goal.is_vared_sized() {
                for var in goal.vars() {
                    if !run_vars.contains(var) {
                        run_vars.push(*var);
                    }
                }
                run.push(goal);
            } else {
                out.push(goal);
            }
        }
        if !flush(&mut out, &mut run, &mut run_vars) {
            return Plan::failed();
        }
        Plan::new(out)
    }
}

/// Moves `run` into `out`, preceded by its cardinality constraint.
///
/// Returns false if the run cannot produce any answer.
fn flush(out: &mut Vec<PlannedGoal>, run: &mut Vec<PlannedGoal>, run_vars: &mut Vec<Var>) -> bool {
    run_vars.clear();
    if run.is_empty() {
        return true;
    }
    let product = SizeBound::product(run.iter().filter_map(PlannedGoal::size));
    if product.is_zero() {
        debug!(event = "cardinality_zero", run = run.len());
        run.clear();
        return false;
    }
    if run.len() >= 2 {
        let factors: Vec<GoalRef> = run.iter().map(|g| Arc::clone(g.goal())).collect();
        out.push(PlannedGoal::injected(constrain(Arc::new(Cardinality::new(
            factors,
        )))));
    }
    out.append(run);
    true
}
