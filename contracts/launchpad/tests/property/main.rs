#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests. Run with:
//!
//! ```bash
//! cargo test --test property
//! ```
//!
//! Raise `PROPTEST_CASES` for a deeper search.

mod ledger;
