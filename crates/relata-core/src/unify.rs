//! Structural unification.
//!
//! The algorithm is written once, against the [`Bindings`] trait. A bare
//! [`Substitution`] implements it for pure term-level unification, and
//! `Context` implements it so that every binding also runs constraint
//! propagation and bind hooks.

use std::convert::Infallible;

use crate::substitution::Substitution;
use crate::term::{Term, Var};

/// Whether unification rejects binding a variable to a term containing it.
///
/// Disabled by default: the top-level self-binding is still never stored,
/// but `X = f(X)` succeeds and produces a cyclic (rational) term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OccursCheck {
    #[default]
    Disabled,
    Enabled,
}

impl OccursCheck {
    pub fn is_enabled(self) -> bool {
        self == OccursCheck::Enabled
    }
}

impl From<bool> for OccursCheck {
    fn from(enabled: bool) -> Self {
        if enabled {
            OccursCheck::Enabled
        } else {
            OccursCheck::Disabled
        }
    }
}

/// A store of variable bindings that unification can extend.
pub trait Bindings: Sized {
    /// A fatal error raised while recording a binding.
    type Error;

    /// Resolves the top level of `term`.
    fn walk(&self, term: &Term) -> Term;

    /// Returns true if `var` occurs anywhere in `term` once bindings are followed.
    fn occurs(&self, var: Var, term: &Term) -> bool;

    fn occurs_check(&self) -> OccursCheck;

    /// Records `var := term`. `var` is unbound and `term` is already walked.
    ///
    /// Returns `Ok(None)` if the binding is rejected.
    fn bind(self, var: Var, term: Term) -> Result<Option<Self>, Self::Error>;
}

impl Bindings for Substitution {
    type Error = Infallible;

    fn walk(&self, term: &Term) -> Term {
        Substitution::walk(self, term)
    }

    fn occurs(&self, var: Var, term: &Term) -> bool {
        Substitution::occurs(self, var, term)
    }

    fn occurs_check(&self) -> OccursCheck {
        OccursCheck::Disabled
    }

    fn bind(self, var: Var, term: Term) -> Result<Option<Self>, Infallible> {
        Ok(self.extend(var, term))
    }
}

/// A bare substitution that unifies with the occurs check enabled.
#[derive(Debug, Clone)]
pub struct OccursChecked(pub Substitution);

impl Bindings for OccursChecked {
    type Error = Infallible;

    fn walk(&self, term: &Term) -> Term {
        self.0.walk(term)
    }

    fn occurs(&self, var: Var, term: &Term) -> bool {
        self.0.occurs(var, term)
    }

    fn occurs_check(&self) -> OccursCheck {
        OccursCheck::Enabled
    }

    fn bind(self, var: Var, term: Term) -> Result<Option<Self>, Infallible> {
        Ok(self.0.extend(var, term).map(OccursChecked))
    }
}

/// Unifies `a` and `b`, returning the extended bindings or `None`.
///
/// # Example
///
/// ```
/// use relata_core::{unify, Substitution, Term, Var};
///
/// let x = Var::fresh();
/// let s = unify(Substitution::new(), &Term::from(x), &Term::from(5)).unwrap();
/// assert_eq!(s.walk_var(x), Term::from(5));
///
/// assert!(unify(Substitution::new(), &Term::from(1), &Term::from(2)).is_none());
/// ```
pub fn unify<B: Bindings<Error = Infallible>>(bindings: B, a: &Term, b: &Term) -> Option<B> {
    infallible(try_unify(bindings, a, b))
}

/// Unifies two term sequences pairwise. Lengths must match.
pub fn unify_all<B: Bindings<Error = Infallible>>(
    bindings: B,
    left: &[Term],
    right: &[Term],
) -> Option<B> {
    infallible(try_unify_all(bindings, left, right))
}

/// Like [`unify`], for stores whose bindings can raise an error.
///
/// `Ok(None)` means the terms do not unify. An `Err` stops unification at
/// the binding that raised it.
pub fn try_unify<B: Bindings>(bindings: B, a: &Term, b: &Term) -> Result<Option<B>, B::Error> {
    let a = bindings.walk(a);
    let b = bindings.walk(b);
    if a == b {
        return Ok(Some(bindings));
    }
    match (&a, &b) {
        (Term::Var(v), _) | (_, Term::Var(v)) if v.is_wildcard() => Ok(Some(bindings)),
        (Term::Var(v), other) | (other, Term::Var(v)) => bind_var(bindings, *v, other),
        (Term::Compound(x), Term::Compound(y)) => {
            if !x.same_shape(y) {
                return Ok(None);
            }
            try_unify_pairs(bindings, x.args(), y.args())
        }
        _ => Ok(None),
    }
}

/// Like [`unify_all`], for stores whose bindings can raise an error.
pub fn try_unify_all<B: Bindings>(
    bindings: B,
    left: &[Term],
    right: &[Term],
) -> Result<Option<B>, B::Error> {
    if left.len() != right.len() {
        return Ok(None);
    }
    try_unify_pairs(bindings, left, right)
}

fn try_unify_pairs<B: Bindings>(
    bindings: B,
    left: &[Term],
    right: &[Term],
) -> Result<Option<B>, B::Error> {
    let mut acc = bindings;
    for (l, r) in left.iter().zip(right) {
        match try_unify(acc, l, r)? {
            Some(next) => acc = next,
            None => return Ok(None),
        }
    }
    Ok(Some(acc))
}

fn bind_var<B: Bindings>(bindings: B, var: Var, term: &Term) -> Result<Option<B>, B::Error> {
    if let Term::Compound(_) = term {
        if bindings.occurs_check().is_enabled() && bindings.occurs(var, term) {
            return Ok(None);
        }
    }
    bindings.bind(var, term.clone())
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
#[path = "unify_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "unify_proptest.rs"]
mod proptest_tests;
