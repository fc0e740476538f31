//! Config directory path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the config directory.
pub const CONFIG_ENV_VAR: &str = "SURVEY_CONFIG_DIR";

/// Get the config root directory.
///
/// Resolution order:
/// 1. `SURVEY_CONFIG_DIR` environment variable
/// 2. `configs/` directory relative to workspace root
pub fn config_root() -> PathBuf {
    if let Ok(root) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../configs")
}

/// Rule documents for one dataset type (`sakernas`, `susenas`).
pub fn dataset_dir(dataset: &str) -> PathBuf {
    config_root().join(dataset)
}

/// Poverty-line reference table for a period (`2024-03`).
pub fn poverty_lines_path(period: &str) -> PathBuf {
    config_root()
        .join("poverty_lines")
        .join(format!("{period}.toml"))
}
