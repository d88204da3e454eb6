//! Goals and their optional capabilities.
//!
//! A [`Goal`] maps a context to the stream of contexts on which it holds.
//! Goals may additionally expose capabilities that the heuristic pipeline
//! uses to plan a conjunction without running it:
//!
//! - [`Vared`]: the variables the goal mentions.
//! - [`CtxSized`]: an upper bound on the number of answers in a context.
//! - [`Enumerable`]: the goal is backed by a relation whose rows can be
//!   inspected and reordered.

mod basic;
mod connective;

use std::fmt::Debug;
use std::sync::Arc;

use relata_core::{Context, Term, TermSet, Var};
use smallvec::SmallVec;

use crate::relation::{Relation, RowOrder};
use crate::stream::Stream;

pub use basic::{
    constrain, delay, distinct, eq, fail, fresh, in_domain, neq, not_in, succeed, Constrain,
    Delay, Eq, Fail, Fresh, Succeed,
};
pub use connective::{conj, disj, Conj, Disj};

/// Shared handle to a goal.
pub type GoalRef = Arc<dyn Goal>;

/// Variables of a goal, usually only a handful.
pub type GoalVars = SmallVec<[Var; 4]>;

/// A relational goal.
pub trait Goal: Send + Sync + Debug {
    /// Runs the goal in `ctx`.
    fn apply(&self, ctx: Context) -> Stream;

    /// Short name for diagnostics.
    fn name(&self) -> &str {
        "goal"
    }

    fn as_vared(&self) -> Option<&dyn Vared> {
        None
    }

    fn as_ctx_sized(&self) -> Option<&dyn CtxSized> {
        None
    }

    fn as_enumerable(&self) -> Option<&dyn Enumerable> {
        None
    }
}

/// A goal whose variables are known up front.
pub trait Vared {
    /// Every variable the goal can bind, without duplicates.
    fn vars(&self) -> GoalVars;
}

/// A goal that can bound its number of answers without running.
pub trait CtxSized {
    fn ctx_size(&self, ctx: &Context) -> SizeBound;
}

/// A goal backed by an enumerable relation.
pub trait Enumerable {
    fn relation(&self) -> &Relation;

    fn args(&self) -> &[Term];

    /// Values the unbound variable `var` can take through this goal, if
    /// the relation can tell.
    fn domain_of(&self, var: Var, ctx: &Context) -> Option<TermSet>;

    /// A copy of this goal that visits rows in `order`.
    fn with_order(&self, order: RowOrder) -> GoalRef;
}

/// An upper bound on a number of answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeBound {
    Exact(u64),
    AtMost(u64),
    Unbounded,
}

impl SizeBound {
    /// The numeric bound, if finite.
    pub fn upper(self) -> Option<u64> {
        match self {
            SizeBound::Exact(n) | SizeBound::AtMost(n) => Some(n),
            SizeBound::Unbounded => None,
        }
    }

    pub fn is_zero(self) -> bool {
        self.upper() == Some(0)
    }

    pub fn is_exact(self) -> bool {
        matches!(self, SizeBound::Exact(_))
    }

    /// The bound as a float, infinite when unbounded.
    pub fn as_f64(self) -> f64 {
        self.upper().map_or(f64::INFINITY, |n| n as f64)
    }

    /// Bound on the answers of a conjunction of both goals.
    ///
    /// Zero wins over unbounded.
    pub fn times(self, other: SizeBound) -> SizeBound {
        if self.is_zero() || other.is_zero() {
            return SizeBound::Exact(0);
        }
        match (self, other) {
            (SizeBound::Exact(a), SizeBound::Exact(b)) => SizeBound::Exact(a.saturating_mul(b)),
            (SizeBound::Unbounded, _) | (_, SizeBound::Unbounded) => SizeBound::Unbounded,
            (a, b) => SizeBound::AtMost(a.as_u64().saturating_mul(b.as_u64())),
        }
    }

    /// Bound on the answers of a disjunction of both goals.
    pub fn plus(self, other: SizeBound) -> SizeBound {
        match (self, other) {
            (SizeBound::Exact(a), SizeBound::Exact(b)) => SizeBound::Exact(a.saturating_add(b)),
            (SizeBound::Unbounded, _) | (_, SizeBound::Unbounded) => SizeBound::Unbounded,
            (a, b) => SizeBound::AtMost(a.as_u64().saturating_add(b.as_u64())),
        }
    }

    pub fn product(bounds: impl IntoIterator<Item = SizeBound>) -> SizeBound {
        bounds.into_iter().fold(SizeBound::Exact(1), SizeBound::times)
    }

    pub fn sum(bounds: impl IntoIterator<Item = SizeBound>) -> SizeBound {
        bounds.into_iter().fold(SizeBound::Exact(0), SizeBound::plus)
    }

    fn as_u64(self) -> u64 {
        self.upper().unwrap_or(u64::MAX)
    }
}

/// Appends the variables of `terms` to `out`, skipping duplicates.
pub(crate) fn collect_vars<'a>(out: &mut GoalVars, terms: impl IntoIterator<Item = &'a Term>) {
    for term in terms {
        for var in term.vars() {
            if !out.contains(&var) {
                out.push(var);
            }
        }
    }
}
