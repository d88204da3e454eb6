//! Facets owned by the core crate.

use std::sync::Arc;

use im::HashMap;

use super::Facet;
use crate::hooks::HookRegistry;
use crate::substitution::Substitution;
use crate::unify::OccursCheck;

/// The branch's variable bindings.
pub struct Substitutions;

impl Facet for Substitutions {
    type Value = Substitution;
    const NAME: &'static str = "substitutions";
}

/// Unification settings, currently the occurs check.
pub struct Unification;

impl Facet for Unification {
    type Value = OccursCheck;
    const NAME: &'static str = "unification";
}

/// The query's hook registry.
pub struct Hooks;

impl Facet for Hooks {
    type Value = Arc<HookRegistry>;
    const NAME: &'static str = "hooks";
}

/// Named per-branch counters, e.g. `"bindings"`.
pub struct Counters;

impl Facet for Counters {
    type Value = HashMap<&'static str, u64>;
    const NAME: &'static str = "counters";
}
