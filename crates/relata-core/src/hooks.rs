//! Hook dispatch for observers and binding pipelines.
//!
//! Observers subscribe to hierarchical keys such as `["relation", "row",
//! "succeeded"]`. Firing a key delivers the event to subscribers of the key
//! itself and to subscribers of each of its prefixes, longest prefix first.
//! Subscribing to the empty key receives every event.
//!
//! Observers only ever see a `&Context`: they can watch the search but not
//! steer it. Steering a binding is the job of a [`BindHook`], which runs
//! after constraint propagation and may veto the binding or extend the
//! context it produced. A [`WalkHook`] sees every variable chain a
//! unification walks through and may condense it.
//!
//! The registry is built once per query and travels through the search
//! inside the [`Hooks`](crate::context::Hooks) facet.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use relata_core::{keys, Context, HookPayload, HookRegistry, Observer};
//!
//! #[derive(Debug)]
//! struct Printer;
//! impl Observer for Printer {
//!     fn on_event(&self, key: &[&'static str], _ctx: &Context, _payload: &HookPayload<'_>) {
//!         println!("{}", key.join("."));
//!     }
//! }
//!
//! let registry = HookRegistry::builder()
//!     .observe(&["relation"], Arc::new(Printer))
//!     .build();
//! assert_eq!(registry.observer_count(), 1);
//!
//! let ctx = Context::new().with_hooks(Arc::new(registry));
//! ctx.fire(keys::ROW_SUCCEEDED, &HookPayload::None);
//! ```

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::context::Context;
use crate::error::Result;
use crate::term::{Term, Var};

/// An owned hierarchical hook key.
pub type HookPath = SmallVec<[&'static str; 4]>;

/// The keys fired by the engine itself.
pub mod keys {
    /// Fresh variables were introduced.
    pub const VARS_FRESH: &[&str] = &["vars", "fresh"];
    /// A variable was bound.
    pub const SUBST_BIND: &[&str] = &["subst", "bind"];
    /// A variable chain was rebound straight to its value.
    pub const SUBST_CONDENSE: &[&str] = &["subst", "condense"];
    /// A constraint failed a branch.
    pub const CONSTRAINT_VIOLATED: &[&str] = &["constraint", "violated"];
    /// A relation row unified with the goal arguments.
    pub const ROW_SUCCEEDED: &[&str] = &["relation", "row", "succeeded"];
    /// A relation row was tried and rejected.
    pub const ROW_FAILED: &[&str] = &["relation", "row", "failed"];
    pub const QUERY_STARTED: &[&str] = &["query", "started"];
    pub const QUERY_SOLUTION: &[&str] = &["query", "solution"];
    pub const QUERY_ENDED: &[&str] = &["query", "ended"];
}

/// Data carried by a fired event.
#[derive(Debug, Clone, Copy)]
pub enum HookPayload<'a> {
    Fresh(&'a [Var]),
    Bind {
        var: Var,
        term: &'a Term,
    },
    Condense {
        value: &'a Term,
        chain: &'a [Var],
    },
    Violation {
        var: Var,
        constraint: &'a str,
    },
    Row {
        relation: &'a str,
        index: usize,
        total: usize,
    },
    Solution {
        index: u64,
    },
    Lifecycle {
        steps: u64,
        solutions: u64,
    },
    None,
}

/// Read-only subscriber to hook events.
pub trait Observer: Send + Sync + Debug {
    /// Called synchronously for every fired key this observer is subscribed to.
    fn on_event(&self, key: &[&'static str], ctx: &Context, payload: &HookPayload<'_>);
}

/// A step of the binding pipeline.
pub trait BindHook: Send + Sync + Debug {
    /// Runs after `var := term` has been recorded and propagated.
    ///
    /// Returning `Ok(None)` vetoes the binding and fails the branch. An
    /// `Err` is an invariant violation and ends the search.
    fn on_bind(&self, ctx: Context, var: Var, term: &Term) -> Result<Option<Context>>;
}

/// Sees the variable chains walked during unification.
pub trait WalkHook: Send + Sync + Debug {
    /// Called when a walk passed through `chain` (two or more bound
    /// variables, in walk order) and ended at `value`.
    ///
    /// The hook may return a condensed context, usually through
    /// [`Context::condense`].
    fn on_chain(&self, ctx: Context, value: &Term, chain: &[Var]) -> Context;
}

/// Condenses every walked chain of at least `min_len` variables.
#[derive(Debug, Clone, Copy)]
pub struct CondenseChains {
    pub min_len: usize,
}

impl CondenseChains {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }
}

impl WalkHook for CondenseChains {
    fn on_chain(&self, ctx: Context, value: &Term, chain: &[Var]) -> Context {
        if chain.len() >= self.min_len {
            ctx.condense(value, chain)
        } else {
            ctx
        }
    }
}

/// Subscriptions and bind hooks for one query.
#[derive(Default)]
pub struct HookRegistry {
    observers: HashMap<HookPath, Vec<Arc<dyn Observer>>>,
    bind_hooks: Vec<Arc<dyn BindHook>>,
    walk_hooks: Vec<Arc<dyn WalkHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> HookRegistryBuilder {
        HookRegistryBuilder::default()
    }

    /// Subscribes `observer` to `key` and everything below it.
    pub fn add_observer(&mut self, key: &[&'static str], observer: Arc<dyn Observer>) {
        self.observers
            .entry(key.iter().copied().collect())
            .or_default()
            .push(observer);
    }

    /// Appends a hook to the binding pipeline.
    pub fn add_bind_hook(&mut self, hook: Arc<dyn BindHook>) {
        self.bind_hooks.push(hook);
    }

    /// Appends a hook to the walk pipeline.
    pub fn add_walk_hook(&mut self, hook: Arc<dyn WalkHook>) {
        self.walk_hooks.push(hook);
    }

    /// Delivers an event to the subscribers of `key` and of its prefixes.
    pub fn fire(&self, key: &[&'static str], ctx: &Context, payload: &HookPayload<'_>) {
        if self.observers.is_empty() {
            return;
        }
        for len in (0..=key.len()).rev() {
            if let Some(subscribers) = self.observers.get(&key[..len]) {
                for observer in subscribers {
                    observer.on_event(key, ctx, payload);
                }
            }
        }
    }

    /// Threads a fresh binding through every bind hook in registration order.
    pub fn run_bind_hooks(&self, ctx: Context, var: Var, term: &Term) -> Result<Option<Context>> {
        let mut ctx = ctx;
        for hook in &self.bind_hooks {
            match hook.on_bind(ctx, var, term)? {
                Some(next) => ctx = next,
                None => return Ok(None),
            }
        }
        Ok(Some(ctx))
    }

    /// Threads a walked chain through every walk hook in registration order.
    pub fn run_walk_hooks(&self, ctx: Context, value: &Term, chain: &[Var]) -> Context {
        self.walk_hooks
            .iter()
            .fold(ctx, |ctx, hook| hook.on_chain(ctx, value, chain))
    }

    pub fn has_walk_hooks(&self) -> bool {
        !self.walk_hooks.is_empty()
    }

    /// Returns true if anything is subscribed to `key` or one of its prefixes.
    pub fn is_observed(&self, key: &[&'static str]) -> bool {
        (0..=key.len()).any(|len| self.observers.contains_key(&key[..len]))
    }

    pub fn observer_count(&self) -> usize {
        self.observers.values().map(Vec::len).sum()
    }

    pub fn bind_hook_count(&self) -> usize {
        self.bind_hooks.len()
    }

    pub fn walk_hook_count(&self) -> usize {
        self.walk_hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty() && self.bind_hooks.is_empty() && self.walk_hooks.is_empty()
    }
}

impl Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.observers.keys().map(|k| k.join(".")).collect();
        keys.sort();
        f.debug_struct("HookRegistry")
            .field("observed_keys", &keys)
            .field("observers", &self.observer_count())
            .field("bind_hooks", &self.bind_hooks.len())
            .field("walk_hooks", &self.walk_hooks.len())
            .finish()
    }
}

/// Builder for [`HookRegistry`].
#[derive(Default)]
pub struct HookRegistryBuilder {
    registry: HookRegistry,
}

impl HookRegistryBuilder {
    pub fn observe(mut self, key: &[&'static str], observer: Arc<dyn Observer>) -> Self {
        self.registry.add_observer(key, observer);
        self
    }

    pub fn bind_hook(mut self, hook: Arc<dyn BindHook>) -> Self {
        self.registry.add_bind_hook(hook);
        self
    }

    pub fn walk_hook(mut self, hook: Arc<dyn WalkHook>) -> Self {
        self.registry.add_walk_hook(hook);
        self
    }

    pub fn build(self) -> HookRegistry {
        self.registry
    }
}

impl Debug for HookRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HookRegistryBuilder")
            .field(&self.registry)
            .finish()
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
