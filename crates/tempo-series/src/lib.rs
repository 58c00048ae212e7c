//! Commit-count period tables and time-block selection.
//!
//! Loads a CSV of commit counts (rows are hourly blocks, columns are logged
//! periods) into memory once, then slices a single hourly block out of
//! every period for regression.

pub mod select;
pub mod table;
