//! Test utilities for relata-solver
//!
//! Provides common test fixtures used across the crate's test modules.
//! Re-exports row builders from relata-test and adds solver-specific helpers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use relata_core::{Context, Term, TermSet, Var};

use crate::goal::{GoalRef, SizeBound};
use crate::relation::{FactSource, FactTable, Pattern, Relation, RowIter};

pub use relata_test::{family_tree, int_rows, range_rows, str_rows, vars};

// ============================================================================
// CountingSource - a fact source that records collaborator calls
// ============================================================================

/// Wraps a [`FactTable`] and counts every call made to it.
#[derive(Debug)]
pub struct CountingSource {
    table: FactTable,
    sizes: AtomicUsize,
    enumerations: AtomicUsize,
    column_lookups: AtomicUsize,
}

impl CountingSource {
    pub fn new(table: FactTable) -> Arc<Self> {
        Arc::new(Self {
            table,
            sizes: AtomicUsize::new(0),
            enumerations: AtomicUsize::new(0),
            column_lookups: AtomicUsize::new(0),
        })
    }

    pub fn sizes(&self) -> usize {
        self.sizes.load(Ordering::SeqCst)
    }

    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub fn column_lookups(&self) -> usize {
        self.column_lookups.load(Ordering::SeqCst)
    }

    /// Every call of any kind.
    pub fn calls(&self) -> usize {
        self.sizes() + self.enumerations() + self.column_lookups()
    }
}

impl FactSource for CountingSource {
    fn arity(&self) -> usize {
        self.table.arity()
    }

    fn enumerate(&self, pattern: &Pattern) -> RowIter {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        self.table.enumerate(pattern)
    }

    fn size(&self, pattern: &Pattern) -> SizeBound {
        self.sizes.fetch_add(1, Ordering::SeqCst);
        self.table.size(pattern)
    }

    fn column_values(&self, column: usize) -> Option<TermSet> {
        self.column_lookups.fetch_add(1, Ordering::SeqCst);
        self.table.column_values(column)
    }
}

/// A counted relation over `rows`.
pub fn counted_relation(
    name: &str,
    arity: usize,
    rows: Vec<Vec<Term>>,
) -> (Relation, Arc<CountingSource>) {
    let source = CountingSource::new(FactTable::from_rows(arity, rows).unwrap());
    (Relation::new(name, source.clone()), source)
}

/// An in-memory relation over integer rows.
pub fn int_relation(name: &str, arity: usize, rows: &[&[i64]]) -> Relation {
    Relation::facts(name, arity, int_rows(rows)).unwrap()
}

/// Runs `goal` on an empty context and collects every answer.
pub fn run(goal: &GoalRef) -> Vec<Context> {
    goal.apply(Context::new())
        .contexts()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// The resolved value of `var` in each context.
pub fn values_of(contexts: &[Context], var: Var) -> Vec<Term> {
    contexts
        .iter()
        .map(|ctx| ctx.resolve(&Term::Var(var)))
        .collect()
}

/// Like [`values_of`], sorted.
pub fn sorted_values_of(contexts: &[Context], var: Var) -> Vec<Term> {
    let mut values = values_of(contexts, var);
    values.sort();
    values
}
