//! Fact relations.
//!
//! A [`Relation`] names a [`FactSource`], the collaborator that stores
//! rows of ground terms. Applying a relation to argument terms produces a
//! goal that unifies the arguments with each matching row in turn.
//!
//! # Example
//!
//! ```
//! use relata_core::{Context, Term, Var};
//! use relata_solver::goal::Goal;
//! use relata_solver::relation::Relation;
//!
//! let parent = Relation::facts(
//!     "parent",
//!     2,
//!     vec![
//!         vec![Term::from("ann"), Term::from("bob")],
//!         vec![Term::from("bob"), Term::from("cid")],
//!     ],
//! )
//! .unwrap();
//!
//! let child = Var::fresh();
//! let goal = parent.goal(vec![Term::from("ann"), Term::from(child)]).unwrap();
//! let answers: Vec<_> = goal.apply(Context::new()).contexts().collect();
//! assert_eq!(answers.len(), 1);
//! ```

mod goal;
mod table;

use std::fmt::{self, Debug};
use std::sync::Arc;

use relata_core::{Term, TermSet};

use crate::error::{Result, SolverError};
use crate::goal::{GoalRef, SizeBound};

pub use goal::RelationGoal;
pub use table::FactTable;

/// One row of a relation.
pub type Row = Arc<[Term]>;

/// Lazy rows produced by a fact source.
pub type RowIter = Box<dyn Iterator<Item = Row> + Send>;

/// Per-column filter: `Some(value)` for columns whose argument is ground.
pub type Pattern = [Option<Term>];

/// Storage behind a relation.
///
/// Implementations must only yield rows that agree with the ground
/// columns of the pattern they were asked for; other columns are checked
/// by unification.
pub trait FactSource: Send + Sync + Debug {
    fn arity(&self) -> usize;

    /// Rows matching `pattern`, produced lazily.
    fn enumerate(&self, pattern: &Pattern) -> RowIter;

    /// Bound on the number of rows `enumerate(pattern)` yields.
    fn size(&self, pattern: &Pattern) -> SizeBound;

    /// Distinct values of column `column`, if cheaply known.
    fn column_values(&self, _column: usize) -> Option<TermSet> {
        None
    }
}

/// The order in which a relation goal visits its rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RowOrder {
    /// Source order.
    #[default]
    Natural,
    /// A permutation of the source order fixed by `seed`.
    Shuffled { seed: u64 },
}

/// A named fact source.
#[derive(Clone)]
pub struct Relation {
    name: Arc<str>,
    source: Arc<dyn FactSource>,
}

impl Relation {
    pub fn new(name: impl Into<Arc<str>>, source: Arc<dyn FactSource>) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// An in-memory relation over `rows`.
    ///
    /// Fails if a row does not have `arity` columns.
    pub fn facts(
        name: impl Into<Arc<str>>,
        arity: usize,
        rows: impl IntoIterator<Item = Vec<Term>>,
    ) -> Result<Self> {
        let table = FactTable::from_rows(arity, rows)?;
        Ok(Self::new(name, Arc::new(table)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.source.arity()
    }

    pub fn source(&self) -> &Arc<dyn FactSource> {
        &self.source
    }

    /// The goal `name(args..)`, visiting rows in source order.
    pub fn goal(&self, args: Vec<Term>) -> Result<GoalRef> {
        self.goal_with_order(args, RowOrder::Natural)
    }

    /// The goal `name(args..)` visiting rows in a permutation fixed by `seed`.
    pub fn shuffled(&self, args: Vec<Term>, seed: u64) -> Result<GoalRef> {
        self.goal_with_order(args, RowOrder::Shuffled { seed })
    }

    fn goal_with_order(&self, args: Vec<Term>, order: RowOrder) -> Result<GoalRef> {
        if args.len() != self.arity() {
            return Err(SolverError::ArityMismatch {
                relation: self.name.to_string(),
                expected: self.arity(),
                found: args.len(),
            });
        }
        Ok(Arc::new(RelationGoal::new(self.clone(), args, order)))
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }
}

impl Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .finish()
    }
}

#[cfg(test)]
mod tests;
