// src/tests/mod.rs

//! Tests for _rdslib_.
//!
//! Tests are placed at `src/tests/`, inside the `rdslib`, for crate-internal
//! visibility. Tests at top-level path `tests/` exercise only the public
//! API.

pub mod iprange_tests;
pub mod summary_tests;
pub mod workerpool_tests;
