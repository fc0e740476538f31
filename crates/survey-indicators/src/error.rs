use polars::prelude::PolarsError;
use survey_design::DesignError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("{indicator} requires column {column}")]
    MissingColumn {
        indicator: &'static str,
        column: String,
    },

    #[error("{indicator} requires a poverty-line table")]
    MissingPovertyLines { indicator: &'static str },

    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("domain column not found: {0}")]
    MissingDomainColumn(String),

    #[error(transparent)]
    Design(#[from] DesignError),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl IndicatorError {
    /// True for errors caused by an input the dataset does not carry.
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. } | Self::MissingPovertyLines { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, IndicatorError>;
