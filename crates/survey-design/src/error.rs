use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("{role} column not found: {column}")]
    MissingColumn { role: &'static str, column: String },

    #[error("weight column {column} is not numeric ({dtype})")]
    NonNumericWeight { column: String, dtype: String },

    #[error("row mask has {actual} entries, design has {expected} rows")]
    MaskLength { expected: usize, actual: usize },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, DesignError>;
