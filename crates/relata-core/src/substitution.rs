//! Triangular substitutions.
//!
//! A [`Substitution`] maps variables to terms. A bound term may itself
//! contain variables that are bound elsewhere in the same substitution, so
//! lookups go through [`Substitution::walk`], which follows variable chains
//! until it reaches an atom, a compound, or an unbound variable.
//!
//! The map is persistent: [`Substitution::extend`] returns a new
//! substitution and leaves the receiver untouched, sharing structure with it.

use std::fmt;

use im::HashMap;

use crate::term::{Compound, Term, Var};

/// A persistent variable-to-term mapping.
///
/// # Example
///
/// ```
/// use relata_core::{Substitution, Term, Var};
///
/// let x = Var::fresh();
/// let y = Var::fresh();
///
/// let s = Substitution::new()
///     .extend(x, Term::from(y))
///     .and_then(|s| s.extend(y, Term::from(5)))
///     .unwrap();
///
/// assert_eq!(s.walk(&Term::from(x)), Term::from(5));
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct Substitution {
    bindings: HashMap<Var, Term>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the term directly bound to `var`, without walking.
    pub fn lookup(&self, var: Var) -> Option<&Term> {
        self.bindings.get(&var)
    }

    pub fn is_bound(&self, var: Var) -> bool {
        self.bindings.contains_key(&var)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over the direct bindings, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Var, &Term)> {
        self.bindings.iter().map(|(v, t)| (*v, t))
    }

    /// Resolves `term` through variable chains to its representative.
    ///
    /// Only the top level is resolved; arguments of a compound are returned
    /// as stored. Use [`Substitution::resolve`] for a deep walk.
    pub fn walk(&self, term: &Term) -> Term {
        let mut current = term;
        while let Term::Var(v) = current {
            match self.bindings.get(v) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.clone()
    }

    /// Walks a variable.
    pub fn walk_var(&self, var: Var) -> Term {
        self.walk(&Term::Var(var))
    }

    /// Like [`Substitution::walk`], also returning the bound variables
    /// passed through, in walk order.
    pub fn walk_chain(&self, term: &Term) -> (Term, Vec<Var>) {
        let mut chain = Vec::new();
        let mut current = term;
        while let Term::Var(v) = current {
            match self.bindings.get(v) {
                Some(next) => {
                    chain.push(*v);
                    current = next;
                }
                None => break,
            }
        }
        (current.clone(), chain)
    }

    /// Rebinds every variable of `chain` directly to `value`.
    ///
    /// `value` must be what the chain walks to, so every walk in the
    /// result ends where it did before.
    pub fn condense(&self, chain: &[Var], value: &Term) -> Self {
        let mut bindings = self.bindings.clone();
        for var in chain {
            if *value != Term::Var(*var) {
                bindings.insert(*var, value.clone());
            }
        }
        Self { bindings }
    }

    /// Binds `var` to `term`.
    ///
    /// Returns `None` if the binding would make `var` resolve to itself,
    /// which is the one cycle a substitution never stores. The caller is
    /// expected to pass an unbound variable; rebinding replaces the old
    /// binding.
    pub fn extend(&self, var: Var, term: Term) -> Option<Self> {
        if var.is_wildcard() || self.walk(&term) == Term::Var(var) {
            return None;
        }
        Some(Self {
            bindings: self.bindings.update(var, term),
        })
    }

    /// Fully resolves `term`, substituting bound variables at every depth.
    ///
    /// Unbound variables are left in place. A variable that is reached again
    /// while its own binding is being expanded (only possible when the
    /// occurs check is disabled) is left unexpanded.
    pub fn resolve(&self, term: &Term) -> Term {
        let mut expanding = Vec::new();
        self.resolve_inner(term, &mut expanding)
    }

    fn resolve_inner(&self, term: &Term, expanding: &mut Vec<Var>) -> Term {
        match term {
            Term::Var(v) => {
                if expanding.contains(v) {
                    return term.clone();
                }
                match self.bindings.get(v) {
                    None => term.clone(),
                    Some(bound) => {
                        expanding.push(*v);
                        let resolved = self.resolve_inner(bound, expanding);
                        expanding.pop();
                        resolved
                    }
                }
            }
            Term::Atom(_) => term.clone(),
            Term::Compound(c) => {
                if c.args().iter().all(Term::is_ground) {
                    return term.clone();
                }
                let args: Vec<Term> = c
                    .args()
                    .iter()
                    .map(|a| self.resolve_inner(a, expanding))
                    .collect();
                Term::Compound(Compound::new(c.functor(), args))
            }
        }
    }

    /// Returns true if `var` occurs in `term` once bindings are followed.
    pub fn occurs(&self, var: Var, term: &Term) -> bool {
        match self.walk(term) {
            Term::Var(v) => v == var,
            Term::Atom(_) => false,
            Term::Compound(c) => c.args().iter().any(|a| self.occurs(var, a)),
        }
    }

    /// Returns the unbound variables of `term` after resolution.
    pub fn free_vars(&self, term: &Term) -> Vec<Var> {
        self.resolve(term).vars()
    }
}

impl fmt::Debug for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(Var, &Term)> = self.iter().collect();
        entries.sort_by_key(|(v, _)| *v);
        f.debug_map().entries(entries).finish()
    }
}

#[cfg(test)]
#[path = "substitution_tests.rs"]
mod tests;
