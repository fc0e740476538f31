use std::path::PathBuf;

use survey_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML document {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config directory not found: {path}")]
    MissingDataset { path: PathBuf },

    #[error("field {field} references unknown codelist {codelist}")]
    UnknownCodelist { field: String, codelist: String },

    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Toml {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
