//! Shared test fixtures for Relata crates.
//!
//! This crate provides fact rows and variable helpers for tests. It only
//! depends on `relata-core`, so every other crate can use it as a
//! dev-dependency.
//!
//! - [`rows`] - builders for fact-table rows
//! - [`family`] - a small parent/child fact set
//! - [`words`] - word lists split into letter rows
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! relata-test = { workspace = true }
//! ```
//!
//! ```
//! use relata_test::rows::int_rows;
//!
//! let rows = int_rows(&[&[1, 2], &[2, 3]]);
//! assert_eq!(rows.len(), 2);
//! ```

pub mod family;
pub mod rows;
pub mod words;

use relata_core::Var;

pub use family::{family_tree, PARENT_PAIRS};
pub use rows::{int_rows, range_rows, str_rows};
pub use words::{letter_rows, WORDS};

/// `N` fresh variables.
pub fn vars<const N: usize>() -> [Var; N] {
    std::array::from_fn(|_| Var::fresh())
}
