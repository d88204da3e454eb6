//! Relata Core - the persistent data model of the relational solver
//!
//! This crate provides the pieces every search step shares:
//! - Terms and logic variables
//! - Triangular substitutions and unification
//! - Contexts built from independently owned facets
//! - Hook dispatch for observers and binding pipelines
//! - The constraint store and the built-in constraints

pub mod constraint;
pub mod context;
pub mod error;
pub mod hooks;
pub mod substitution;
pub mod term;
pub mod unify;

pub use constraint::{
    Constraint, ConstraintId, ConstraintStore, Constraints, Distinct, InDomain, Neq, NotIn,
    Verdict,
};
pub use context::{Context, Counters, Facet, Hooks, Substitutions, Unification};
pub use error::{CoreError, Result};
pub use hooks::{
    keys, BindHook, CondenseChains, HookPath, HookPayload, HookRegistry, HookRegistryBuilder,
    Observer, WalkHook,
};
pub use substitution::Substitution;
pub use term::{Atom, Compound, Term, TermSet, Var};
pub use unify::{try_unify, try_unify_all, unify, unify_all, Bindings, OccursCheck, OccursChecked};
