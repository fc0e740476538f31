#![deny(unsafe_code)]

//! Indicator Engine: weighted labor-force rates, welfare means, inequality
//! and poverty measures over a [`survey_design::SurveyDesign`], optionally
//! broken down by domain columns.
//!
//! # Example
//!
//! ```ignore
//! use survey_indicators::{CalculationRequest, IndicatorOptions, calculate_indicators};
//!
//! let request = CalculationRequest::new("labor_force_participation_rate".parse()?)
//!     .with_by(["province_code"]);
//! let results = calculate_indicators(&design, &request, &IndicatorOptions::default())?;
//! let table = results.to_table()?;
//! ```

pub mod bootstrap;
pub mod catalog;
mod domain;
pub mod engine;
pub mod error;
pub mod formulas;
pub mod options;
pub mod results;

pub use crate::bootstrap::{BootstrapEstimate, BootstrapOptions, gini_bootstrap};
pub use crate::catalog::{Indicator, IndicatorSelection};
pub use crate::engine::{calculate_indicators, calculate_indicators_multi};
pub use crate::error::{IndicatorError, Result};
pub use crate::formulas::{
    PercentileRatios, atkinson_index, fgt, gini, percentile_ratios, theil_index, weighted_mean,
    weighted_quantile, weighted_rate,
};
pub use crate::options::{
    CalculationRequest, HOUSEHOLD_SIZE_FALLBACK_COLUMN, IndicatorOptions, VALUE_FALLBACK_COLUMN,
};
pub use crate::results::{IndicatorResult, IndicatorResults, wave_table};
