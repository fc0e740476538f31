#![deny(unsafe_code)]

//! Data model shared by the harmonizer and the indicator engine.

pub mod coded;
pub mod error;
pub mod mapping;
pub mod poverty;
pub mod province;

pub use coded::{CodedValue, MappingOutcome, ValueLabels};
pub use error::{ModelError, Result};
pub use mapping::{ALL_WAVES, VariableMapping};
pub use poverty::{
    AreaLines, AreaType, FALLBACK_RURAL_LINE, FALLBACK_URBAN_LINE, LineSource, NATIONAL_REGION,
    PovertyLine, PovertyLineTable, region_key,
};
pub use province::{province_code, province_name};
