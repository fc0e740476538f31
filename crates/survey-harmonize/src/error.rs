use polars::prelude::PolarsError;
use survey_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarmonizeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, HarmonizeError>;
