#![deny(unsafe_code)]

//! Harmonization Engine.
//!
//! Translates wave-specific raw columns into the canonical schema and
//! derives labor-force indicator columns. Harmonization is fail-soft:
//! absent variables and unmapped codes are logged, never raised.

mod column;
pub mod engine;
pub mod error;
pub mod exceptions;
pub mod fallback;
pub mod labor;
pub mod log;
pub mod rules;
pub mod validate;

pub use crate::engine::{HarmonizeOptions, Harmonizer};
pub use crate::error::{HarmonizeError, Result};
pub use crate::labor::{LaborForceOptions, create_labor_force_indicators};
pub use crate::log::{DerivedColumn, LabelApplication, LabelSource, MappingLog};
pub use crate::rules::{HarmonizationRuleSet, merge_rules};
pub use crate::validate::ValidationReport;
