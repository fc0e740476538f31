//! Poverty-line reference documents.
//!
//! ```toml
//! period = "2024-03"
//!
//! [national]
//! urban = 615000.0
//! rural = 570000.0
//!
//! [provinces.31]
//! urban = 846000.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use survey_model::{AreaLines, CodedValue, PovertyLineTable};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalLines {
    pub urban: f64,
    pub rural: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PovertyLineDocument {
    #[serde(default)]
    pub period: Option<String>,
    pub national: NationalLines,
    /// Keyed by province code or province name.
    #[serde(default)]
    pub provinces: BTreeMap<String, AreaLines>,
}

impl PovertyLineDocument {
    pub fn into_table(self) -> Result<PovertyLineTable> {
        let mut table = PovertyLineTable::new(AreaLines::new(
            Some(self.national.urban),
            Some(self.national.rural),
        ));
        table.period = self.period;
        for (key, lines) in &self.provinces {
            let region = CodedValue::parse(key).ok_or_else(|| ConfigError::InvalidDocument {
                message: "empty province key in poverty-line table".to_string(),
            })?;
            table.insert_region(&region, *lines)?;
        }
        if self.national.urban <= 0.0 || self.national.rural <= 0.0 {
            return Err(ConfigError::InvalidDocument {
                message: "national poverty lines must be positive".to_string(),
            });
        }
        Ok(table)
    }
}

pub fn parse_poverty_lines(text: &str, path: &Path) -> Result<PovertyLineTable> {
    let document: PovertyLineDocument =
        toml::from_str(text).map_err(|e| ConfigError::toml(path, e))?;
    document.into_table()
}

/// Load a poverty-line table; the `[national]` entry is mandatory.
pub fn load_poverty_lines(path: &Path) -> Result<PovertyLineTable> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    parse_poverty_lines(&text, path)
}

#[cfg(test)]
mod tests {
    use survey_model::{AreaType, LineSource};

    use super::*;

    #[test]
    fn parses_sparse_provinces() {
        let table = parse_poverty_lines(
            r#"
            period = "2024-03"
            [national]
            urban = 615000.0
            rural = 570000.0
            [provinces.31]
            urban = 846000.0
            [provinces."JAWA BARAT"]
            urban = 520000.0
            rural = 500000.0
            "#,
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(table.period.as_deref(), Some("2024-03"));
        let jakarta_rural = table.lookup(Some(&CodedValue::Code(31)), AreaType::Rural);
        assert_eq!(jakarta_rural.source, LineSource::National);
        let west_java = table.lookup(Some(&CodedValue::Code(32)), AreaType::Rural);
        assert_eq!(west_java.value, 500000.0);
    }

    #[test]
    fn national_entry_is_required() {
        let err = parse_poverty_lines("period = \"2024-03\"", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }
}
