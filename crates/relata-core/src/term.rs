//! Logic variables and terms.
//!
//! A [`Term`] is either a logic [`Var`], an [`Atom`], or a [`Compound`]
//! (a functor applied to an ordered argument sequence). Terms are immutable:
//! compound arguments live behind an `Arc` so cloning a term never copies
//! its structure.
//!
//! # Example
//!
//! ```
//! use relata_core::{Term, Var};
//!
//! let x = Var::fresh();
//! let t = Term::compound("point", vec![Term::from(x), Term::from(3)]);
//!
//! assert!(!t.is_ground());
//! assert_eq!(t.vars(), vec![x]);
//! assert_eq!(t.to_string(), format!("point({}, 3)", x));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;

/// Ordinal 0 is the wildcard; fresh variables start at 1.
static NEXT_VAR: AtomicU64 = AtomicU64::new(1);

/// A set of ground terms, shared between constraints and relations.
pub type TermSet = Arc<HashSet<Term>>;

/// A logic variable.
///
/// Variables are identity tokens: two variables are equal only if they were
/// produced by the same call to [`Var::fresh`]. The ordinal is unique for
/// the lifetime of the process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(u64);

impl Var {
    /// The anonymous variable. It unifies with anything and is never bound.
    pub const WILDCARD: Var = Var(0);

    /// Creates a new variable with a process-wide unique ordinal.
    pub fn fresh() -> Self {
        Var(NEXT_VAR.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates `n` fresh variables.
    pub fn fresh_n(n: usize) -> Vec<Var> {
        (0..n).map(|_| Var::fresh()).collect()
    }

    /// Returns the ordinal of this variable.
    pub fn ordinal(self) -> u64 {
        self.0
    }

    /// Returns true for [`Var::WILDCARD`].
    pub fn is_wildcard(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard() {
            f.write_str("__")
        } else {
            write!(f, "_{}", self.0)
        }
    }
}

/// An atomic value. Two atoms unify only if they are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Atom {
    Bool(bool),
    Int(i64),
    Char(char),
    Str(Arc<str>),
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Bool(b) => write!(f, "{}", b),
            Atom::Int(i) => write!(f, "{}", i),
            Atom::Char(c) => write!(f, "{:?}", c),
            Atom::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// A functor applied to an ordered sequence of arguments.
///
/// Tuples are compounds with an empty functor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Compound {
    functor: Arc<str>,
    args: Arc<[Term]>,
}

impl Compound {
    pub fn new(functor: impl Into<Arc<str>>, args: impl Into<Arc<[Term]>>) -> Self {
        Self {
            functor: functor.into(),
            args: args.into(),
        }
    }

    pub fn functor(&self) -> &str {
        &self.functor
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Returns true if both compounds have the same functor and arity.
    pub fn same_shape(&self, other: &Compound) -> bool {
        self.arity() == other.arity() && self.functor == other.functor
    }
}

/// A logic term.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Var(Var),
    Atom(Atom),
    Compound(Compound),
}

impl Term {
    pub fn int(value: i64) -> Self {
        Term::Atom(Atom::Int(value))
    }

    pub fn str(value: impl Into<Arc<str>>) -> Self {
        Term::Atom(Atom::Str(value.into()))
    }

    pub fn compound(functor: impl Into<Arc<str>>, args: Vec<Term>) -> Self {
        Term::Compound(Compound::new(functor, args))
    }

    /// Builds a tuple, i.e. a compound with an empty functor.
    pub fn tuple(args: Vec<Term>) -> Self {
        Term::Compound(Compound::new("", args))
    }

    /// The wildcard as a term.
    pub fn wildcard() -> Self {
        Term::Var(Var::WILDCARD)
    }

    pub fn as_var(&self) -> Option<Var> {
        match self {
            Term::Var(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Term::Atom(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Term::Atom(Atom::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Term::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Returns true if the term contains no variables at all.
    ///
    /// This is a syntactic check; use `Context::resolve` first to account
    /// for bindings.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Var(_) => false,
            Term::Atom(_) => true,
            Term::Compound(c) => c.args().iter().all(Term::is_ground),
        }
    }

    /// Returns the distinct non-wildcard variables of the term, in order of
    /// first occurrence.
    pub fn vars(&self) -> Vec<Var> {
        let mut out: SmallVec<[Var; 8]> = SmallVec::new();
        self.collect_vars(&mut out);
        out.into_vec()
    }

    fn collect_vars(&self, out: &mut SmallVec<[Var; 8]>) {
        match self {
            Term::Var(v) if !v.is_wildcard() && !out.contains(v) => out.push(*v),
            Term::Compound(c) => c.args().iter().for_each(|a| a.collect_vars(out)),
            _ => {}
        }
    }

    /// Returns true if `var` occurs syntactically in the term.
    pub fn mentions(&self, var: Var) -> bool {
        match self {
            Term::Var(v) => *v == var,
            Term::Atom(_) => false,
            Term::Compound(c) => c.args().iter().any(|a| a.mentions(var)),
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(v) => write!(f, "{}", v),
            Term::Atom(a) => write!(f, "{}", a),
            Term::Compound(c) => {
                write!(f, "{}(", c.functor())?;
                for (i, arg) in c.args().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                if c.arity() == 1 && c.functor().is_empty() {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<Var> for Term {
    fn from(v: Var) -> Self {
        Term::Var(v)
    }
}

impl From<Atom> for Term {
    fn from(a: Atom) -> Self {
        Term::Atom(a)
    }
}

impl From<Compound> for Term {
    fn from(c: Compound) -> Self {
        Term::Compound(c)
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Term::int(i)
    }
}

impl From<i32> for Term {
    fn from(i: i32) -> Self {
        Term::int(i64::from(i))
    }
}

impl From<usize> for Term {
    fn from(i: usize) -> Self {
        Term::int(i as i64)
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Atom(Atom::Bool(b))
    }
}

impl From<char> for Term {
    fn from(c: char) -> Self {
        Term::Atom(Atom::Char(c))
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::str(s)
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_vars_are_distinct() {
        let a = Var::fresh();
        let b = Var::fresh();
        assert_ne!(a, b);
        assert!(b.ordinal() > a.ordinal());
        assert!(!a.is_wildcard());
    }

    #[test]
    fn test_wildcard_display() {
        assert_eq!(Var::WILDCARD.to_string(), "__");
        assert!(Term::wildcard().as_var().is_some_and(Var::is_wildcard));
    }

    #[test]
    fn test_structural_equality() {
        let x = Var::fresh();
        let a = Term::compound("f", vec![Term::from(x), Term::from(1)]);
        let b = Term::compound("f", vec![Term::from(x), Term::from(1)]);
        let c = Term::compound("g", vec![Term::from(x), Term::from(1)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_vars_in_order_without_duplicates() {
        let x = Var::fresh();
        let y = Var::fresh();
        let t = Term::tuple(vec![
            Term::from(y),
            Term::wildcard(),
            Term::compound("f", vec![Term::from(x), Term::from(y)]),
        ]);
        assert_eq!(t.vars(), vec![y, x]);
        assert!(t.mentions(x));
        assert!(!t.is_ground());
    }

    #[test]
    fn test_display() {
        let t = Term::tuple(vec![Term::from(1), Term::from("a"), Term::from('c')]);
        assert_eq!(t.to_string(), "(1, \"a\", 'c')");
        assert_eq!(Term::tuple(vec![Term::from(true)]).to_string(), "(true,)");
    }
}
