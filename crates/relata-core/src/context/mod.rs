//! Immutable search contexts built from typed facets.
//!
//! A [`Context`] is everything one branch of the search knows: its
//! substitution, its pending constraints, its hook registry, its counters.
//! Each of these lives in its own *facet*, a value keyed by a marker type
//! implementing [`Facet`]. Any crate can declare a new facet without
//! touching this module.
//!
//! Contexts are persistent. [`Context::set`] returns a new context that
//! shares every other facet with the receiver, so forking a branch costs a
//! few pointer copies and two forks never observe each other's updates.
//!
//! # Example
//!
//! ```
//! use relata_core::{Context, Facet};
//!
//! struct Depth;
//! impl Facet for Depth {
//!     type Value = u32;
//!     const NAME: &'static str = "depth";
//! }
//!
//! let root = Context::new();
//! let child = root.update::<Depth>(|d| d + 1);
//!
//! assert_eq!(root.get::<Depth>(), None);
//! assert_eq!(child.get::<Depth>(), Some(&1));
//! ```

mod facets;

use std::any::{Any, TypeId};
use std::fmt::{self, Debug};
use std::sync::Arc;

use im::HashMap;

use crate::constraint::{self, Constraint, ConstraintStore, Constraints};
use crate::error::{CoreError, Result};
use crate::hooks::{keys, HookPayload, HookRegistry};
use crate::substitution::Substitution;
use crate::term::{Term, Var};
use crate::unify::{self, Bindings, OccursCheck};

pub use facets::{Counters, Hooks, Substitutions, Unification};

/// A typed slot of a [`Context`].
///
/// The implementing type is only a key; the stored data is `Value`.
pub trait Facet: 'static {
    type Value: Clone + Default + Debug + Send + Sync + 'static;

    /// Unique name of the facet, used in diagnostics and collision checks.
    const NAME: &'static str;
}

type DebugFn = fn(&(dyn Any + Send + Sync), &mut fmt::Formatter<'_>) -> fmt::Result;

#[derive(Clone)]
struct FacetSlot {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    debug: DebugFn,
}

fn debug_value<F: Facet>(value: &(dyn Any + Send + Sync), f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<F::Value>() {
        Some(v) => Debug::fmt(v, f),
        None => f.write_str("<?>"),
    }
}

/// An immutable aggregate of facets.
#[derive(Clone, Default)]
pub struct Context {
    facets: HashMap<TypeId, FacetSlot>,
    names: HashMap<&'static str, TypeId>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of facet `F`, if set.
    pub fn get<F: Facet>(&self) -> Option<&F::Value> {
        self.facets
            .get(&TypeId::of::<F>())
            .and_then(|slot| slot.value.downcast_ref::<F::Value>())
    }

    /// Returns a copy of facet `F`, or its default if unset.
    pub fn get_or_default<F: Facet>(&self) -> F::Value {
        self.get::<F>().cloned().unwrap_or_default()
    }

    pub fn contains<F: Facet>(&self) -> bool {
        self.facets.contains_key(&TypeId::of::<F>())
    }

    /// Returns a context with facet `F` set to `value`.
    ///
    /// Fails with [`CoreError::FacetCollision`] if another facet type already
    /// uses `F::NAME` in this context.
    pub fn try_set<F: Facet>(&self, value: F::Value) -> Result<Context> {
        let id = TypeId::of::<F>();
        if let Some(existing) = self.names.get(F::NAME) {
            if *existing != id {
                let existing = self
                    .facets
                    .get(existing)
                    .map_or("<unknown>", |slot| slot.type_name);
                return Err(CoreError::FacetCollision {
                    name: F::NAME,
                    existing,
                    incoming: std::any::type_name::<F>(),
                });
            }
        }
        let slot = FacetSlot {
            type_name: std::any::type_name::<F>(),
            value: Arc::new(value),
            debug: debug_value::<F>,
        };
        Ok(Context {
            facets: self.facets.update(id, slot),
            names: self.names.update(F::NAME, id),
        })
    }

    /// Returns a context with facet `F` set to `value`.
    ///
    /// # Panics
    ///
    /// Panics on a facet key collision, naming both facet types.
    pub fn set<F: Facet>(&self, value: F::Value) -> Context {
        match self.try_set::<F>(value) {
            Ok(ctx) => ctx,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns a context with facet `F` replaced by `f(current_or_default)`.
    pub fn update<F: Facet>(&self, f: impl FnOnce(F::Value) -> F::Value) -> Context {
        self.set::<F>(f(self.get_or_default::<F>()))
    }

    /// Like [`Context::update`], reporting a facet name collision.
    pub fn try_update<F: Facet>(&self, f: impl FnOnce(F::Value) -> F::Value) -> Result<Context> {
        self.try_set::<F>(f(self.get_or_default::<F>()))
    }

    /// Returns a context without facet `F`.
    pub fn remove<F: Facet>(&self) -> Context {
        if !self.contains::<F>() {
            return self.clone();
        }
        Context {
            facets: self.facets.without(&TypeId::of::<F>()),
            names: self.names.without(F::NAME),
        }
    }

    /// Number of facets set.
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Names of the facets set, sorted.
    pub fn facet_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.names.keys().copied().collect();
        names.sort_unstable();
        names
    }

    // === Substitution ===

    /// The substitution of this branch (empty if none was set).
    pub fn substitution(&self) -> Substitution {
        self.get_or_default::<Substitutions>()
    }

    pub fn walk(&self, term: &Term) -> Term {
        match self.get::<Substitutions>() {
            Some(s) => s.walk(term),
            None => term.clone(),
        }
    }

    pub fn walk_var(&self, var: Var) -> Term {
        self.walk(&Term::Var(var))
    }

    /// Fully resolves `term` against this branch's substitution.
    pub fn resolve(&self, term: &Term) -> Term {
        match self.get::<Substitutions>() {
            Some(s) => s.resolve(term),
            None => term.clone(),
        }
    }

    /// Unbound variables of `term` once resolved.
    pub fn free_vars(&self, term: &Term) -> Vec<Var> {
        self.resolve(term).vars()
    }

    pub fn is_bound(&self, var: Var) -> bool {
        self.get::<Substitutions>()
            .is_some_and(|s| s.is_bound(var))
    }

    pub fn occurs_check(&self) -> OccursCheck {
        self.get_or_default::<Unification>()
    }

    pub fn with_occurs_check(&self, occurs_check: OccursCheck) -> Context {
        self.set::<Unification>(occurs_check)
    }

    /// Unifies `a` and `b` in this context, running propagation and hooks
    /// for every new binding.
    ///
    /// # Panics
    ///
    /// If a bind hook reports an invariant violation. Search code uses
    /// [`Context::try_unify`].
    pub fn unify(&self, a: &Term, b: &Term) -> Option<Context> {
        match self.try_unify(a, b) {
            Ok(ctx) => ctx,
            Err(err) => panic!("{err}"),
        }
    }

    /// Unifies `a` and `b`, reporting invariant violations raised by bind
    /// hooks. `Ok(None)` means the terms do not unify.
    pub fn try_unify(&self, a: &Term, b: &Term) -> Result<Option<Context>> {
        let (ctx, a) = self.walk_condensed(a);
        let (ctx, b) = ctx.walk_condensed(b);
        unify::try_unify(ctx, &a, &b)
    }

    /// Unifies two term sequences pairwise, like [`Context::try_unify`].
    pub fn try_unify_all(&self, left: &[Term], right: &[Term]) -> Result<Option<Context>> {
        unify::try_unify_all(self.clone(), left, right)
    }

    /// Walks `term`, handing any variable chain it passes through to the
    /// walk hooks, which may condense it.
    pub fn walk_condensed(&self, term: &Term) -> (Context, Term) {
        let registry = match self.hooks() {
            Some(registry) if registry.has_walk_hooks() => Arc::clone(registry),
            _ => return (self.clone(), self.walk(term)),
        };
        let Some(subst) = self.get::<Substitutions>() else {
            return (self.clone(), term.clone());
        };
        let (value, chain) = subst.walk_chain(term);
        if chain.len() < 2 {
            return (self.clone(), value);
        }
        let ctx = registry.run_walk_hooks(self.clone(), &value, &chain);
        (ctx, value)
    }

    /// Rebinds every variable of `chain` directly to `value`, which must be
    /// what the chain walks to.
    pub fn condense(&self, value: &Term, chain: &[Var]) -> Context {
        let subst = self.substitution().condense(chain, value);
        let ctx = self.set::<Substitutions>(subst).bump("condensed");
        ctx.fire(keys::SUBST_CONDENSE, &HookPayload::Condense { value, chain });
        ctx
    }

    // === Hooks ===

    pub fn hooks(&self) -> Option<&Arc<HookRegistry>> {
        self.get::<Hooks>()
    }

    pub fn with_hooks(&self, registry: Arc<HookRegistry>) -> Context {
        self.set::<Hooks>(registry)
    }

    /// Fires `key` on the registry carried by this context, if any.
    pub fn fire(&self, key: &[&'static str], payload: &HookPayload<'_>) {
        if let Some(registry) = self.hooks() {
            registry.fire(key, self, payload);
        }
    }

    // === Counters ===

    pub fn counter(&self, name: &'static str) -> u64 {
        self.get::<Counters>()
            .and_then(|c| c.get(name).copied())
            .unwrap_or(0)
    }

    /// Returns a context with counter `name` incremented.
    pub fn bump(&self, name: &'static str) -> Context {
        let next = self.counter(name) + 1;
        self.update::<Counters>(|c| c.update(name, next))
    }

    // === Constraints ===

    pub fn constraints(&self) -> Option<&ConstraintStore> {
        self.get::<Constraints>()
    }

    /// Indexes `constraint` under its variables without evaluating it.
    pub fn attach(&self, constraint: Arc<dyn Constraint>) -> Context {
        constraint::attach(self, constraint).0
    }

    /// Attaches `constraint` and evaluates it once against this context.
    ///
    /// Returns `None` if it is already violated.
    pub fn constrain(&self, constraint: Arc<dyn Constraint>) -> Option<Context> {
        let (ctx, id) = constraint::attach(self, constraint);
        constraint::check(ctx, id)
    }
}

impl Bindings for Context {
    type Error = CoreError;

    fn walk(&self, term: &Term) -> Term {
        Context::walk(self, term)
    }

    fn occurs(&self, var: Var, term: &Term) -> bool {
        match self.get::<Substitutions>() {
            Some(s) => s.occurs(var, term),
            None => term.mentions(var),
        }
    }

    fn occurs_check(&self) -> OccursCheck {
        Context::occurs_check(self)
    }

    fn bind(self, var: Var, term: Term) -> Result<Option<Self>> {
        let Some(subst) = self.substitution().extend(var, term.clone()) else {
            return Ok(None);
        };
        let ctx = self.try_set::<Substitutions>(subst)?.bump("bindings");
        ctx.fire(keys::SUBST_BIND, &HookPayload::Bind { var, term: &term });
        let Some(ctx) = constraint::propagate(ctx, var, &term) else {
            return Ok(None);
        };
        match ctx.hooks().cloned() {
            Some(registry) => registry.run_bind_hooks(ctx, var, &term),
            None => Ok(Some(ctx)),
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Slot<'a>(&'a FacetSlot);
        impl Debug for Slot<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                (self.0.debug)(&*self.0.value, f)
            }
        }

        let mut map = f.debug_map();
        for name in self.facet_names() {
            if let Some(slot) = self.names.get(name).and_then(|id| self.facets.get(id)) {
                map.entry(&name, &Slot(slot));
            }
        }
        map.finish()
    }
}
