//! Chaining goals by shared variables.

use std::collections::{BTreeSet, HashMap};

use relata_core::{Context, Var};

use super::{HeuristicPass, Plan, PlannedGoal};

/// Orders vared and sized goals so that each one shares variables with
/// the goals placed before it, cheapest first.
///
/// Goals are ranked by `size / entanglement`, where the entanglement of a
/// goal is the product, over its variables, of the number of goals that
/// mention the variable. The cheapest goal goes first. Each following
/// slot takes the cheapest goal that shares a variable with an already
/// placed goal, or the cheapest remaining goal when none does. Goals that
/// are not both vared and sized keep their relative order after the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainSharedVars;

impl HeuristicPass for ChainSharedVars {
    fn name(&self) -> &str {
        "chain_shared_vars"
    }

    fn apply(&self, plan: Plan, _ctx: &Context) -> Plan {
        let (mut sized, others): (Vec<PlannedGoal>, Vec<PlannedGoal>) = plan
            .into_goals()
            .into_iter()
            .partition(PlannedGoal::is_vared_sized);

        let mut mentions: HashMap<Var, usize> = HashMap::new();
        for goal in &sized {
            for var in goal.vars() {
                *mentions.entry(*var).or_default() += 1;
            }
        }
        let rank = |goal: &PlannedGoal| -> f64 {
            let entanglement: f64 = goal
                .vars()
                .iter()
                .map(|v| mentions.get(v).copied().unwrap_or(1) as f64)
                .product();
            let size = goal.size().map_or(f64::INFINITY, |s| s.as_f64());
            size / entanglement.max(1.0)
        };
        sized.sort_by(|a, b| rank(a).total_cmp(&rank(b)));

        let ranks: Vec<f64> = sized.iter().map(&rank).collect();
        let mut by_var: HashMap<Var, Vec<usize>> = HashMap::new();
        for (id, goal) in sized.iter().enumerate() {
            for var in goal.vars() {
                by_var.entry(*var).or_default().push(id);
            }
        }

        // `order[slot]` is the id (sorted position) of the goal in `slot`.
        let n = sized.len();
        let mut order: Vec<usize> = (0..n).collect();
        let mut staged: BTreeSet<usize> = BTreeSet::new();
        for slot in 0..n.saturating_sub(2) {
            let current = order[slot];
            let placed = &order[..=slot];
            for var in sized[current].vars() {
                for &id in by_var.get(var).into_iter().flatten() {
                    if !placed.contains(&id) {
                        staged.insert(id);
                    }
                }
            }
            staged.remove(&current);

            let best = (slot + 1..n)
                .filter(|&s| staged.is_empty() || staged.contains(&order[s]))
                .min_by(|&a, &b| ranks[order[a]].total_cmp(&ranks[order[b]]));
            if let Some(best) = best {
                order.swap(slot + 1, best);
            }
        }

        let mut slots: Vec<Option<PlannedGoal>> = sized.into_iter().map(Some).collect();
        let mut goals: Vec<PlannedGoal> = order.iter().filter_map(|&id| slots[id].take()).collect();
        goals.extend(others);
        Plan::new(goals)
    }
}
