//! Restricting shared variables to values every relation can produce.

use std::collections::HashSet;
use std::sync::Arc;

use relata_core::{Context, Term, Var};
use tracing::debug;

use super::{HeuristicPass, Plan, PlannedGoal};
use crate::goal::in_domain;

/// For each variable shared by two or more relation goals, prepends an
/// `InDomain` constraint holding the intersection of the values the
/// relations can give it.
///
/// Domains are intersected smallest goal first. An empty intersection, or
/// a sharing goal whose relation is empty in this context, fails the plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relevance;

impl HeuristicPass for Relevance {
    fn name(&self) -> &str {
        "relevance"
    }

    fn apply(&self, plan: Plan, ctx: &Context) -> Plan {
        let enumerable: Vec<usize> = plan
            .goals()
            .iter()
            .enumerate()
            .filter(|(_, g)| g.goal().as_enumerable().is_some())
            .map(|(i, _)| i)
            .collect();

        let mut shared: Vec<(Var, Vec<usize>)> = Vec::new();
        for &i in &enumerable {
            for &var in plan.goals()[i].vars() {
                match shared.iter_mut().find(|(v, _)| *v == var) {
                    Some((_, goals)) => goals.push(i),
                    None => shared.push((var, vec![i])),
                }
            }
        }

        let mut injected: Vec<PlannedGoal> = Vec::new();
        for (var, mut goals) in shared.into_iter().filter(|(_, g)| g.len() >= 2) {
            if goals
                .iter()
                .any(|&i| plan.goals()[i].size().is_some_and(|s| s.is_zero()))
            {
                debug!(event = "relevance_empty_relation", var = %var);
                return Plan::failed();
            }
            goals.sort_by(|&a, &b| size_rank(&plan, a).total_cmp(&size_rank(&plan, b)));

            let mut domain: Option<HashSet<Term>> = None;
            for &i in &goals {
                let Some(values) = plan.goals()[i]
                    .goal()
                    .as_enumerable()
                    .and_then(|e| e.domain_of(var, ctx))
                else {
                    continue;
                };
                let next: HashSet<Term> = match domain {
                    None => values.iter().cloned().collect(),
                    Some(acc) => acc.into_iter().filter(|v| values.contains(v)).collect(),
                };
                if next.is_empty() {
                    debug!(event = "relevance_empty_domain", var = %var);
                    return Plan::failed();
                }
                domain = Some(next);
            }
            if let Some(domain) = domain {
                injected.push(PlannedGoal::injected(in_domain(var, Arc::new(domain))));
            }
        }

        if injected.is_empty() {
            return plan;
        }
        injected.extend(plan.into_goals());
        Plan::new(injected)
    }
}

fn size_rank(plan: &Plan, index: usize) -> f64 {
    plan.goals()[index]
        .size()
        .map_or(f64::INFINITY, |s| s.as_f64())
}
