//! A three-generation family.

use relata_core::Term;

/// `(parent, child)` pairs.
pub const PARENT_PAIRS: &[(&str, &str)] = &[
    ("ada", "bea"),
    ("ada", "cal"),
    ("bea", "dan"),
    ("bea", "eve"),
    ("cal", "fay"),
];

/// [`PARENT_PAIRS`] as two-column rows.
pub fn family_tree() -> Vec<Vec<Term>> {
    PARENT_PAIRS
        .iter()
        .map(|&(parent, child)| vec![Term::str(parent), Term::str(child)])
        .collect()
}
