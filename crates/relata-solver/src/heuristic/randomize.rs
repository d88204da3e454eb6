//! Randomized row order.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use relata_core::Context;

use super::{HeuristicPass, Plan, PlannedGoal};
use crate::relation::RowOrder;

/// Replaces relation goals with copies that visit their rows in a seeded
/// random order.
///
/// The row seeds of one planning run are drawn from a generator seeded
/// with the pass seed mixed with the number of bindings made so far, so a
/// query replays the same orders when run again.
#[derive(Debug, Clone, Copy)]
pub struct RandomizeOrder {
    seed: u64,
}

impl RandomizeOrder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// A pass seeded from the thread rng.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl HeuristicPass for RandomizeOrder {
    fn name(&self) -> &str {
        "randomize_order"
    }

    fn apply(&self, plan: Plan, ctx: &Context) -> Plan {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ ctx.counter("bindings").rotate_left(32));
        let goals = plan
            .into_goals()
            .into_iter()
            .map(|planned| match planned.goal().as_enumerable() {
                Some(enumerable) => {
                    let order = RowOrder::Shuffled { seed: rng.random() };
                    planned.replaced(enumerable.with_order(order))
                }
                None => planned,
            })
            .collect::<Vec<PlannedGoal>>();
        Plan::new(goals)
    }
}
