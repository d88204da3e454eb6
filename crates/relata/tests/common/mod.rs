//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use relata::solver::{FactSource, FactTable, Pattern, RowIter};
use relata::{QueryConfig, Relation, SizeBound, Term, TermSet};

/// A fact source that records every call made to it.
#[derive(Debug)]
pub struct CountingSource {
    table: FactTable,
    sizes: AtomicUsize,
    enumerations: AtomicUsize,
    column_lookups: AtomicUsize,
}

impl CountingSource {
    pub fn sizes(&self) -> usize {
        self.sizes.load(Ordering::SeqCst)
    }

    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.sizes() + self.enumerations() + self.column_lookups.load(Ordering::SeqCst)
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

/// A relation whose collaborator calls are counted.
pub fn counted(name: &str, arity: usize, rows: Vec<Vec<Term>>) -> (Relation, Arc<CountingSource>) {
    let source = Arc::new(CountingSource {
        table: FactTable::from_rows(arity, rows).unwrap(),
        sizes: AtomicUsize::new(0),
        enumerations: AtomicUsize::new(0),
        column_lookups: AtomicUsize::new(0),
    });
    (Relation::new(name, source.clone()), source)
}

/// Configuration with planning disabled.
pub fn unplanned() -> QueryConfig {
    QueryConfig {
        heuristics: Some(Vec::new()),
        ..QueryConfig::default()
    }
}
