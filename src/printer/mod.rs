// src/printer/mod.rs

//! The `printer` module is for ranking the aggregated statistics and
//! writing the user-facing report.

pub mod report;
