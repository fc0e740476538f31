use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use survey_model::{ValueLabels, VariableMapping};

use crate::document::{BaseDocument, WaveDocument};
use crate::error::{ConfigError, Result};
use crate::resolve::{ResolvedField, ResolvedWaveConfig, resolve};

const BASE_FILE: &str = "base.toml";

/// A wave document that was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Human-oriented view of one raw field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescription {
    pub raw_name: String,
    pub canon_name: String,
    pub label: Option<String>,
    pub category: Option<String>,
    pub value_labels: Option<ValueLabels>,
}

/// Resolved configuration for every wave of one dataset type.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    dataset: String,
    base: BaseDocument,
    waves: BTreeMap<String, ResolvedWaveConfig>,
    skipped: Vec<SkippedDocument>,
}

impl ConfigStore {
    /// Load `<root>/<dataset>/base.toml` and every other `*.toml` beside it.
    ///
    /// Wave files load in file-name order; a later file for the same wave
    /// wins on conflicting claims. A malformed wave file is logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Missing dataset directory, unreadable directory, or a malformed base document.
    pub fn load(root: &Path, dataset: &str) -> Result<Self> {
        let dir = root.join(dataset);
        if !dir.is_dir() {
            return Err(ConfigError::MissingDataset { path: dir });
        }

        let base_path = dir.join(BASE_FILE);
        let mut base = if base_path.is_file() {
            let text = std::fs::read_to_string(&base_path)
                .map_err(|e| ConfigError::io(&base_path, e))?;
            toml::from_str::<BaseDocument>(&text).map_err(|e| ConfigError::toml(&base_path, e))?
        } else {
            BaseDocument::default()
        };
        if base.dataset.is_empty() {
            base.dataset = dataset.to_string();
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| ConfigError::io(&dir, e))? {
            let path = entry.map_err(|e| ConfigError::io(&dir, e))?.path();
            let is_toml = path.extension().is_some_and(|ext| ext == "toml");
            let is_base = path.file_name().is_some_and(|name| name == BASE_FILE);
            if is_toml && !is_base && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::new();
        let mut skipped = Vec::new();
        for path in paths {
            match read_wave_document(&path).and_then(|doc| resolve(&base, &doc).map(|_| doc)) {
                Ok(doc) => documents.push(doc),
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "skipping malformed wave document"
                    );
                    skipped.push(SkippedDocument {
                        path,
                        reason: error.to_string(),
                    });
                }
            }
        }

        let mut store = Self::from_documents(base, documents)?;
        store.skipped = skipped;
        tracing::debug!(
            dataset,
            waves = store.waves.len(),
            skipped = store.skipped.len(),
            "loaded config store"
        );
        Ok(store)
    }

    /// Build a store from already-parsed documents, in precedence order.
    ///
    /// # Errors
    ///
    /// Any document that fails [`resolve`].
    pub fn from_documents(base: BaseDocument, documents: Vec<WaveDocument>) -> Result<Self> {
        let mut merged: BTreeMap<String, WaveDocument> = BTreeMap::new();
        for doc in documents {
            match merged.get_mut(&doc.wave) {
                Some(existing) => merge_wave(existing, doc),
                None => {
                    merged.insert(doc.wave.clone(), doc);
                }
            }
        }

        let mut waves = BTreeMap::new();
        for (wave, doc) in &merged {
            waves.insert(wave.clone(), resolve(&base, doc)?);
        }

        Ok(Self {
            dataset: base.dataset.clone(),
            base,
            waves,
            skipped: Vec::new(),
        })
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn base(&self) -> &BaseDocument {
        &self.base
    }

    pub fn wave(&self, wave: &str) -> Option<&ResolvedWaveConfig> {
        self.waves.get(wave)
    }

    pub fn waves(&self) -> impl Iterator<Item = &str> {
        self.waves.keys().map(String::as_str)
    }

    pub fn skipped(&self) -> &[SkippedDocument] {
        &self.skipped
    }

    /// Standard-name rules built from every wave's overrides.
    pub fn rules(&self) -> BTreeMap<String, VariableMapping> {
        let mut rules: BTreeMap<String, VariableMapping> = BTreeMap::new();
        for (wave, config) in &self.waves {
            for field in config.overrides() {
                let rule = rules.entry(field.canon_name.clone()).or_insert_with(|| {
                    VariableMapping::new(
                        field.canon_name.clone(),
                        field.label.clone().unwrap_or_default(),
                    )
                });
                rule.wave_names.insert(wave.clone(), field.raw_name.clone());
                if let Some(labels) = &field.value_labels {
                    rule.value_mappings.insert(wave.clone(), labels.clone());
                }
                if rule.description.is_empty()
                    && let Some(label) = &field.label
                {
                    rule.description = label.clone();
                }
            }
        }
        rules
    }

    /// Category name to canonical variable names for a wave.
    pub fn list_categories(&self, wave: &str) -> BTreeMap<String, Vec<String>> {
        self.waves
            .get(wave)
            .map(|config| config.categories.clone())
            .unwrap_or_default()
    }

    pub fn describe(&self, wave: &str, raw_field: &str) -> Option<FieldDescription> {
        let field = self.waves.get(wave)?.field(raw_field)?;
        Some(FieldDescription {
            raw_name: field.raw_name.clone(),
            canon_name: field.canon_name.clone(),
            label: field.label.clone(),
            category: field.category.clone(),
            value_labels: field.value_labels.clone(),
        })
    }

    /// Fields whose raw or canonical name matches a `*` wildcard pattern (case-insensitive).
    pub fn filter_fields(&self, wave: &str, pattern: &str) -> Vec<&ResolvedField> {
        let Some(config) = self.waves.get(wave) else {
            return Vec::new();
        };
        config
            .fields
            .values()
            .filter(|field| {
                wildcard_match(pattern, &field.raw_name) || wildcard_match(pattern, &field.canon_name)
            })
            .collect()
    }

    /// Raw field names mapped to a canonical name in a wave.
    pub fn raw_names_for(&self, wave: &str, canon_name: &str) -> Vec<String> {
        let Some(config) = self.waves.get(wave) else {
            return Vec::new();
        };
        config
            .fields
            .values()
            .filter(|field| field.canon_name == canon_name)
            .map(|field| field.raw_name.clone())
            .collect()
    }
}

fn read_wave_document(path: &Path) -> Result<WaveDocument> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    toml::from_str(&text).map_err(|e| ConfigError::toml(path, e))
}

fn merge_wave(existing: &mut WaveDocument, later: WaveDocument) {
    for (raw_name, def) in later.overrides {
        existing
            .overrides
            .retain(|name, other| name == &raw_name || other.canon_name != def.canon_name);
        existing.overrides.insert(raw_name, def);
    }
    existing.codelists.extend(later.codelists);
    existing.derive.extend(later.derive);
    if existing.dataset.is_empty() {
        existing.dataset = later.dataset;
    }
}

fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let text = text.to_ascii_lowercase();
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let mut rest = text.as_str();
    let last = parts.len() - 1;
    for (idx, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if idx == 0 {
            match rest.strip_prefix(part) {
                Some(tail) => rest = tail,
                None => return false,
            }
        } else if idx == last {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_patterns() {
        assert!(wildcard_match("B5R*", "b5r28"));
        assert!(wildcard_match("*wage", "cash_wage"));
        assert!(wildcard_match("*_R*1", "DEM_R01"));
        assert!(wildcard_match("*", "anything"));
        assert!(!wildcard_match("B5R*", "DEM_AGE"));
        assert!(!wildcard_match("age", "DEM_AGE"));
        assert!(!wildcard_match("a*b*b", "ab"));
    }

    #[test]
    fn later_document_wins_canonical_claim() {
        let first: WaveDocument = toml::from_str(
            r#"
            wave = "2025-02"
            [overrides.OLD_AGE]
            canon_name = "age"
            "#,
        )
        .unwrap();
        let second: WaveDocument = toml::from_str(
            r#"
            wave = "2025-02"
            [overrides.DEM_AGE]
            canon_name = "age"
            "#,
        )
        .unwrap();
        let store = ConfigStore::from_documents(BaseDocument::default(), vec![first, second])
            .unwrap();
        assert_eq!(store.raw_names_for("2025-02", "age"), vec!["DEM_AGE"]);
        assert_eq!(store.rules()["age"].raw_name_for("2025-02"), Some("DEM_AGE"));
    }
}
