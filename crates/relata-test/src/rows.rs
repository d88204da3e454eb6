//! Row builders for fact tables.

use relata_core::Term;

/// Rows of integer atoms.
pub fn int_rows(rows: &[&[i64]]) -> Vec<Vec<Term>> {
    rows.iter()
        .map(|row| row.iter().map(|&v| Term::int(v)).collect())
        .collect()
}

/// Rows of string atoms.
pub fn str_rows(rows: &[&[&str]]) -> Vec<Vec<Term>> {
    rows.iter()
        .map(|row| row.iter().map(|&v| Term::str(v)).collect())
        .collect()
}

/// `count` single-column rows `0, 1, .., count - 1`.
pub fn range_rows(count: usize) -> Vec<Vec<Term>> {
    (0..count).map(|i| vec![Term::from(i)]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_rows() {
        let rows = int_rows(&[&[1, 2], &[3, 4]]);
        assert_eq!(rows[1], vec![Term::int(3), Term::int(4)]);
    }

    #[test]
    fn test_range_rows() {
        let rows = range_rows(3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec![Term::int(2)]);
    }
}
