//! The constraint store and propagation.
//!
//! A constraint is a predicate over variables that cannot be decided yet.
//! Attaching one indexes it under every variable it mentions; after each
//! binding of a variable, every constraint indexed under it is re-evaluated:
//!
//! - [`Verdict::Violated`] fails the branch.
//! - [`Verdict::Satisfied`] removes the constraint.
//! - [`Verdict::Simplified`] replaces it with a cheaper equivalent.
//! - [`Verdict::Pending`] keeps it, and also indexes it under the unbound
//!   variables of the term just bound, so a binding like `X = Y` hands the
//!   constraint over to `Y`.
//!
//! Constraints are monotonic: once satisfied or violated on a branch they
//! stay so on every extension of it.

mod builtin;

use std::fmt::{self, Debug};
use std::sync::Arc;

use im::{HashMap, OrdMap, OrdSet};

use crate::context::{Context, Facet};
use crate::hooks::{keys, HookPayload};
use crate::term::{Term, Var};

pub use builtin::{Distinct, InDomain, Neq, NotIn};

/// Outcome of evaluating a constraint against a context.
#[derive(Debug, Clone)]
pub enum Verdict {
    Satisfied,
    Violated,
    Simplified(Arc<dyn Constraint>),
    Pending,
}

/// A deferred predicate over logic variables.
pub trait Constraint: Send + Sync + Debug {
    /// Short name used in diagnostics and violation events.
    fn name(&self) -> &str;

    /// Variables the constraint is initially indexed under.
    fn vars(&self) -> Vec<Var>;

    /// Decides the constraint as far as `ctx` allows.
    fn evaluate(&self, ctx: &Context) -> Verdict;
}

/// Identifies a constraint within one store lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(u64);

impl ConstraintId {
    pub fn index(self) -> u64 {
        self.0
    }
}

/// Persistent store of pending constraints, indexed by variable.
#[derive(Clone, Default)]
pub struct ConstraintStore {
    next_id: u64,
    entries: OrdMap<ConstraintId, Arc<dyn Constraint>>,
    by_var: HashMap<Var, OrdSet<ConstraintId>>,
    indexed: OrdMap<ConstraintId, OrdSet<Var>>,
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ConstraintId) -> Option<&Arc<dyn Constraint>> {
        self.entries.get(&id)
    }

    /// Iterates over pending constraints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ConstraintId, &Arc<dyn Constraint>)> {
        self.entries.iter().map(|(id, c)| (*id, c))
    }

    /// Ids of the constraints indexed under `var`.
    pub fn ids_for(&self, var: Var) -> Vec<ConstraintId> {
        self.by_var
            .get(&var)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of variables with at least one constraint indexed under them.
    pub fn indexed_vars(&self) -> usize {
        self.by_var.len()
    }

    /// Adds `constraint`, indexed under `vars`.
    pub fn insert(&self, constraint: Arc<dyn Constraint>, vars: &[Var]) -> (Self, ConstraintId) {
        let id = ConstraintId(self.next_id);
        let store = Self {
            next_id: self.next_id + 1,
            entries: self.entries.update(id, constraint),
            ..self.clone()
        };
        (store.index_under(id, vars), id)
    }

    /// Replaces the constraint stored under `id` and indexes it under `vars`.
    pub fn replace(&self, id: ConstraintId, constraint: Arc<dyn Constraint>, vars: &[Var]) -> Self {
        let store = Self {
            entries: self.entries.update(id, constraint),
            ..self.clone()
        };
        store.index_under(id, vars)
    }

    /// Drops the constraint stored under `id` and unindexes it.
    pub fn remove(&self, id: ConstraintId) -> Self {
        let mut by_var = self.by_var.clone();
        for var in self.indexed.get(&id).into_iter().flatten() {
            let ids = by_var.get(var).map(|ids| ids.without(&id)).unwrap_or_default();
            by_var = if ids.is_empty() {
                by_var.without(var)
            } else {
                by_var.update(*var, ids)
            };
        }
        Self {
            next_id: self.next_id,
            entries: self.entries.without(&id),
            by_var,
            indexed: self.indexed.without(&id),
        }
    }

    /// Additionally indexes `id` under `vars`. The wildcard is skipped.
    pub fn index_under(&self, id: ConstraintId, vars: &[Var]) -> Self {
        let mut by_var = self.by_var.clone();
        let mut indexed = self.indexed.get(&id).cloned().unwrap_or_default();
        for var in vars.iter().filter(|v| !v.is_wildcard()) {
            let ids = by_var.get(var).cloned().unwrap_or_default().update(id);
            by_var = by_var.update(*var, ids);
            indexed = indexed.update(*var);
        }
        Self {
            by_var,
            indexed: self.indexed.update(id, indexed),
            ..self.clone()
        }
    }
}

impl Debug for ConstraintStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.values().map(|c| c.name().to_string()))
            .finish()
    }
}

/// The branch's pending constraints.
pub struct Constraints;

impl Facet for Constraints {
    type Value = ConstraintStore;
    const NAME: &'static str = "constraints";
}

/// Indexes `constraint` under the free variables it currently reaches.
///
/// The constraint is not evaluated.
pub fn attach(ctx: &Context, constraint: Arc<dyn Constraint>) -> (Context, ConstraintId) {
    let mut vars = constraint.vars();
    for var in constraint.vars() {
        for reached in ctx.free_vars(&Term::Var(var)) {
            if !vars.contains(&reached) {
                vars.push(reached);
            }
        }
    }
    let (store, id) = ctx.get_or_default::<Constraints>().insert(constraint, &vars);
    (ctx.set::<Constraints>(store), id)
}

/// Evaluates one stored constraint and applies its verdict.
pub fn check(ctx: Context, id: ConstraintId) -> Option<Context> {
    let Some(constraint) = ctx.constraints().and_then(|s| s.get(id)).cloned() else {
        return Some(ctx);
    };
    let store = ctx.get_or_default::<Constraints>();
    let store = apply(&ctx, store, id, &constraint, None, &[])?;
    Some(ctx.set::<Constraints>(store))
}

/// Re-evaluates the constraints indexed under `var` after `var := term`.
pub fn propagate(ctx: Context, var: Var, term: &Term) -> Option<Context> {
    let Some(store) = ctx.constraints() else {
        return Some(ctx);
    };
    let ids = store.ids_for(var);
    if ids.is_empty() {
        return Some(ctx);
    }
    let follow = ctx.free_vars(term);
    let mut store = store.clone();
    for id in ids {
        let Some(constraint) = store.get(id).cloned() else {
            continue;
        };
        store = apply(&ctx, store, id, &constraint, Some(var), &follow)?;
    }
    Some(ctx.set::<Constraints>(store))
}

fn apply(
    ctx: &Context,
    store: ConstraintStore,
    id: ConstraintId,
    constraint: &Arc<dyn Constraint>,
    bound: Option<Var>,
    follow: &[Var],
) -> Option<ConstraintStore> {
    match constraint.evaluate(ctx) {
        Verdict::Violated => {
            let var = bound.unwrap_or(Var::WILDCARD);
            ctx.fire(
                keys::CONSTRAINT_VIOLATED,
                &HookPayload::Violation {
                    var,
                    constraint: constraint.name(),
                },
            );
            None
        }
        Verdict::Satisfied => Some(store.remove(id)),
        Verdict::Simplified(next) => {
            let mut vars = next.vars();
            vars.extend_from_slice(follow);
            Some(store.replace(id, next, &vars))
        }
        Verdict::Pending => Some(store.index_under(id, follow)),
    }
}
