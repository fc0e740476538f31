#![deny(unsafe_code)]

//! Survey Design: a canonical dataset bound to its weight, strata and
//! sampling-unit columns.

pub mod design;
pub mod error;
pub mod summary;
pub mod variance;

pub use crate::design::{DesignSpec, SurveyDesign};
pub use crate::error::{DesignError, Result};
pub use crate::summary::{DesignSummary, WeightStats, kish_effective_sample_size, weight_cv};
pub use crate::variance::{ConfidenceInterval, LinearizationEstimator, VarianceEstimator, z_value};
