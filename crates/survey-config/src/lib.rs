#![deny(unsafe_code)]

//! Config Store: per-dataset TOML rule documents.
//!
//! Each dataset directory holds an optional `base.toml` with shared field
//! definitions and codelists, plus one document per wave. Wave documents
//! extend the base; [`resolve`] merges the two and expands codelist
//! references eagerly.

pub mod document;
pub mod error;
pub mod paths;
pub mod poverty;
pub mod resolve;
pub mod store;

pub use crate::document::{BaseDocument, DeriveKind, DeriveRule, FieldDef, WaveDocument};
pub use crate::error::{ConfigError, Result};
pub use crate::paths::{CONFIG_ENV_VAR, config_root, dataset_dir, poverty_lines_path};
pub use crate::poverty::{PovertyLineDocument, load_poverty_lines, parse_poverty_lines};
pub use crate::resolve::{FieldSource, ResolvedField, ResolvedWaveConfig, resolve};
pub use crate::store::{ConfigStore, FieldDescription, SkippedDocument};
