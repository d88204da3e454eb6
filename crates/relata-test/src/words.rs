//! Small word lists for crossword-style tests.

use relata_core::Term;

pub const WORDS: &[&str] = &["cat", "car", "arc", "tar", "rat", "act"];

/// One row per word of length `len`, one column per letter.
pub fn letter_rows(words: &[&str], len: usize) -> Vec<Vec<Term>> {
    words
        .iter()
        .filter(|w| w.chars().count() == len)
        .map(|w| w.chars().map(Term::from).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_rows_filters_length() {
        let rows = letter_rows(&["ab", "abc"], 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][2], Term::from('c'));
    }
}
