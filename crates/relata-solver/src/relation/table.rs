//! In-memory fact table.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use relata_core::{Term, TermSet};

use super::{FactSource, Pattern, Row, RowIter};
use crate::error::{Result, SolverError};
use crate::goal::SizeBound;

/// Rows of ground terms with a hash index per column.
#[derive(Debug, Clone)]
pub struct FactTable {
    arity: usize,
    rows: Arc<Vec<Row>>,
    columns: Vec<HashMap<Term, Vec<usize>>>,
}

impl FactTable {
    /// Builds a table, rejecting rows that do not have `arity` columns or
    /// that are not ground.
    pub fn from_rows(arity: usize, rows: impl IntoIterator<Item = Vec<Term>>) -> Result<Self> {
        let mut stored: Vec<Row> = Vec::new();
        let mut columns: Vec<HashMap<Term, Vec<usize>>> = vec![HashMap::new(); arity];
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != arity {
                return Err(SolverError::Invariant {
                    subject: "fact table".to_string(),
                    message: format!(
                        "row {index} has {} columns, expected {arity}",
                        row.len()
                    ),
                });
            }
            if let Some(column) = row.iter().position(|value| !value.is_ground()) {
                return Err(SolverError::Invariant {
                    subject: "fact table".to_string(),
                    message: format!("row {index} column {column} is not ground"),
                });
            }
            for (column, value) in row.iter().enumerate() {
                columns[column].entry(value.clone()).or_default().push(index);
            }
            stored.push(row.into());
        }
        Ok(Self {
            arity,
            rows: Arc::new(stored),
            columns,
        })
    }

    pub fn empty(arity: usize) -> Self {
        Self {
            arity,
            rows: Arc::new(Vec::new()),
            columns: vec![HashMap::new(); arity],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of the rows matching `pattern`, in table order.
    ///
    /// `None` means every row matches.
    fn matching(&self, pattern: &Pattern) -> Option<Vec<usize>> {
        let mut postings: Vec<&[usize]> = Vec::new();
        for (column, value) in pattern.iter().enumerate().take(self.arity) {
            let Some(value) = value else { continue };
            match self.columns[column].get(value) {
                Some(rows) => postings.push(rows),
                None => return Some(Vec::new()),
            }
        }
        postings.sort_by_key(|p| p.len());
        let (first, rest) = postings.split_first()?;
        Some(
            first
                .iter()
                .copied()
                .filter(|row| rest.iter().all(|p| p.binary_search(row).is_ok()))
                .collect(),
        )
    }
}

impl FactSource for FactTable {
    fn arity(&self) -> usize {
        self.arity
    }

    fn enumerate(&self, pattern: &Pattern) -> RowIter {
        let rows = Arc::clone(&self.rows);
        match self.matching(pattern) {
            None => Box::new((0..rows.len()).map(move |i| Arc::clone(&rows[i]))),
            Some(indices) => Box::new(indices.into_iter().map(move |i| Arc::clone(&rows[i]))),
        }
    }

    fn size(&self, pattern: &Pattern) -> SizeBound {
        let count = match self.matching(pattern) {
            None => self.rows.len(),
            Some(indices) => indices.len(),
        };
        SizeBound::Exact(count as u64)
    }

    fn column_values(&self, column: usize) -> Option<TermSet> {
        let values: HashSet<Term> = self.columns.get(column)?.keys().cloned().collect();
        Some(Arc::new(values))
    }
}
