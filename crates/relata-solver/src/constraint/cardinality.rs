//! The cardinality product constraint.

use relata_core::{Constraint, Context, Term, Verdict, Var};

use crate::goal::{GoalRef, GoalVars, SizeBound};

/// Prunes a branch once one of its factor goals has no answers left.
///
/// The factors are `Vared + CtxSized` goals that share variables. Each
/// time one of those variables is bound, the product of the factors'
/// bounds is recomputed in the new context; a zero product means some
/// factor can no longer produce an answer. The bound may be loose but the
/// pruning is sound.
#[derive(Debug, Clone)]
pub struct Cardinality {
    factors: Vec<GoalRef>,
    vars: GoalVars,
}

impl Cardinality {
    /// Builds the constraint over `factors`, watching every variable they
    /// mention. Factors that are not sized are ignored.
    pub fn new(factors: Vec<GoalRef>) -> Self {
        let factors: Vec<GoalRef> = factors
            .into_iter()
            .filter(|g| g.as_ctx_sized().is_some())
            .collect();
        let mut vars = GoalVars::new();
        for factor in &factors {
            for var in factor.as_vared().map(|v| v.vars()).unwrap_or_default() {
                if !vars.contains(&var) {
                    vars.push(var);
                }
            }
        }
        Self { factors, vars }
    }

    pub fn factors(&self) -> &[GoalRef] {
        &self.factors
    }

    /// The product of the factors' bounds in `ctx`.
    pub fn product(&self, ctx: &Context) -> SizeBound {
        SizeBound::product(
            self.factors
                .iter()
                .filter_map(|g| g.as_ctx_sized())
                .map(|s| s.ctx_size(ctx)),
        )
    }
}

impl Constraint for Cardinality {
    fn name(&self) -> &str {
        "cardinality"
    }

    fn vars(&self) -> Vec<Var> {
        self.vars.to_vec()
    }

    fn evaluate(&self, ctx: &Context) -> Verdict {
        if self.product(ctx).is_zero() {
            return Verdict::Violated;
        }
        let ground = self
            .vars
            .iter()
            .all(|v| ctx.resolve(&Term::Var(*v)).is_ground());
        if ground {
            Verdict::Satisfied
        } else {
            Verdict::Pending
        }
    }
}
