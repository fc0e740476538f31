//! Base + wave layering.

use std::collections::BTreeMap;

use serde::Serialize;
use survey_model::ValueLabels;

use crate::document::{BaseDocument, DeriveRule, FieldDef, WaveDocument};
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Base,
    WaveOverride,
}

/// A field definition with its codelist reference expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
    pub raw_name: String,
    pub canon_name: String,
    pub label: Option<String>,
    pub category: Option<String>,
    pub value_labels: Option<ValueLabels>,
    pub source: FieldSource,
}

/// Fully merged configuration for one wave. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedWaveConfig {
    pub dataset: String,
    pub wave: String,
    /// Raw field name to definition; overrides already applied.
    pub fields: BTreeMap<String, ResolvedField>,
    pub categories: BTreeMap<String, Vec<String>>,
    pub derived: Vec<DeriveRule>,
}

impl ResolvedWaveConfig {
    pub fn overrides(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields
            .values()
            .filter(|field| field.source == FieldSource::WaveOverride)
    }

    pub fn base_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields
            .values()
            .filter(|field| field.source == FieldSource::Base)
    }

    pub fn field(&self, raw_name: &str) -> Option<&ResolvedField> {
        self.fields.get(raw_name).or_else(|| {
            self.fields
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(raw_name))
                .map(|(_, field)| field)
        })
    }
}

/// Merge a wave document onto its base.
///
/// - codelist references expand into concrete dictionaries (wave codelists
///   shadow base codelists of the same name);
/// - explicit `value_labels` win over `codelist` on the same field;
/// - an override replaces the base field with the same raw name, and
///   removes any other base field claiming the same canonical name.
///
/// # Errors
///
/// Unknown codelist references, or a wave declaring a different dataset
/// than its base.
pub fn resolve(base: &BaseDocument, wave: &WaveDocument) -> Result<ResolvedWaveConfig> {
    if wave.wave.trim().is_empty() {
        return Err(ConfigError::InvalidDocument {
            message: "wave identifier is empty".to_string(),
        });
    }
    if !base.dataset.is_empty() && !wave.dataset.is_empty() && base.dataset != wave.dataset {
        return Err(ConfigError::InvalidDocument {
            message: format!(
                "wave {} declares dataset {} but base is {}",
                wave.wave, wave.dataset, base.dataset
            ),
        });
    }

    let mut codelists = base.codelists.clone();
    codelists.extend(wave.codelists.clone());

    let mut fields = BTreeMap::new();
    for (raw_name, def) in &base.fields {
        let field = expand(raw_name, def, &codelists, FieldSource::Base)?;
        fields.insert(raw_name.clone(), field);
    }
    for (raw_name, def) in &wave.overrides {
        let field = expand(raw_name, def, &codelists, FieldSource::WaveOverride)?;
        fields.retain(|name: &String, existing: &mut ResolvedField| {
            name == raw_name
                || existing.source == FieldSource::WaveOverride
                || existing.canon_name != field.canon_name
        });
        fields.insert(raw_name.clone(), field);
    }

    let mut categories = base.categories.clone();
    for field in fields.values() {
        if let Some(category) = &field.category {
            let members = categories.entry(category.clone()).or_default();
            if !members.contains(&field.canon_name) {
                members.push(field.canon_name.clone());
            }
        }
    }

    let dataset = if wave.dataset.is_empty() {
        base.dataset.clone()
    } else {
        wave.dataset.clone()
    };

    Ok(ResolvedWaveConfig {
        dataset,
        wave: wave.wave.clone(),
        fields,
        categories,
        derived: wave.derive.clone(),
    })
}

fn expand(
    raw_name: &str,
    def: &FieldDef,
    codelists: &BTreeMap<String, ValueLabels>,
    source: FieldSource,
) -> Result<ResolvedField> {
    let value_labels = match (&def.value_labels, &def.codelist) {
        (Some(labels), _) => Some(labels.clone()),
        (None, Some(name)) => Some(codelists.get(name).cloned().ok_or_else(|| {
            ConfigError::UnknownCodelist {
                field: raw_name.to_string(),
                codelist: name.clone(),
            }
        })?),
        (None, None) => None,
    };
    Ok(ResolvedField {
        raw_name: raw_name.to_string(),
        canon_name: def.canon_name.clone(),
        label: def.label.clone(),
        category: def.category.clone(),
        value_labels: value_labels.filter(|labels| !labels.is_empty()),
        source,
    })
}

#[cfg(test)]
mod tests {
    use survey_model::CodedValue;

    use super::*;

    fn base() -> BaseDocument {
        toml::from_str(
            r#"
            dataset = "sakernas"

            [codelists.yes_no]
            1 = "Ya"
            2 = "Tidak"

            [fields.KLASIFIKAS]
            canon_name = "urban_rural"
            category = "geography"
            value_labels = { 1 = "Urban", 2 = "Rural" }

            [fields.B5R1]
            canon_name = "worked_1hour"
            codelist = "yes_no"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn codelists_expand_eagerly() {
        let wave = WaveDocument {
            wave: "2025-02".to_string(),
            ..WaveDocument::default()
        };
        let resolved = resolve(&base(), &wave).unwrap();
        let labels = resolved.fields["B5R1"].value_labels.as_ref().unwrap();
        assert_eq!(labels.get(&CodedValue::Code(1)), Some("Ya"));
        assert_eq!(resolved.dataset, "sakernas");
        assert_eq!(resolved.categories["geography"], vec!["urban_rural"]);
    }

    #[test]
    fn override_claim_removes_base_field() {
        let wave: WaveDocument = toml::from_str(
            r#"
            wave = "2025-02"
            [overrides.DEM_KLAS]
            canon_name = "urban_rural"
            codelist = "yes_no"
            "#,
        )
        .unwrap();
        let resolved = resolve(&base(), &wave).unwrap();
        assert!(!resolved.fields.contains_key("KLASIFIKAS"));
        assert_eq!(resolved.fields["DEM_KLAS"].source, FieldSource::WaveOverride);
        assert_eq!(resolved.overrides().count(), 1);
        assert_eq!(resolved.base_fields().count(), 1);
    }

    #[test]
    fn explicit_labels_beat_codelist() {
        let wave: WaveDocument = toml::from_str(
            r#"
            wave = "2025-02"
            [overrides.B5R1]
            canon_name = "worked_1hour"
            codelist = "yes_no"
            value_labels = { 1 = "Yes", 2 = "No" }
            "#,
        )
        .unwrap();
        let resolved = resolve(&base(), &wave).unwrap();
        let labels = resolved.fields["B5R1"].value_labels.as_ref().unwrap();
        assert_eq!(labels.get(&CodedValue::Code(1)), Some("Yes"));
    }

    #[test]
    fn unknown_codelist_is_an_error() {
        let wave: WaveDocument = toml::from_str(
            r#"
            wave = "2025-02"
            [overrides.X]
            canon_name = "x"
            codelist = "missing"
            "#,
        )
        .unwrap();
        let err = resolve(&base(), &wave).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCodelist { .. }));
    }

    #[test]
    fn dataset_mismatch_is_rejected() {
        let wave = WaveDocument {
            dataset: "susenas".to_string(),
            wave: "2024-03".to_string(),
            ..WaveDocument::default()
        };
        assert!(matches!(
            resolve(&base(), &wave),
            Err(ConfigError::InvalidDocument { .. })
        ));
    }
}
