//! Shared utilities for the survey workspace.
//!
//! This crate provides common helpers used across the survey crates:
//! Polars `AnyValue` conversions, case-insensitive column lookup,
//! three-valued boolean logic for nullable indicator columns, and
//! `tracing` subscriber setup.

pub mod kleene;
pub mod logging;
pub mod lookup;
pub mod polars;

pub use kleene::{kleene_and, kleene_not, kleene_or};
pub use lookup::CaseInsensitiveSet;
pub use polars::{
    any_to_bool, any_to_f64, any_to_string, bool_column, column_values, f64_column,
    format_numeric, is_numeric_dtype, parse_f64, parse_i64,
};
