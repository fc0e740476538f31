use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid poverty line for {region}/{area}: {value}")]
    InvalidPovertyLine {
        region: String,
        area: String,
        value: f64,
    },
    #[error("unknown area category: {0}")]
    UnknownArea(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
