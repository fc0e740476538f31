//! Record of every action a harmonization call took.

use std::collections::BTreeMap;

use serde::Serialize;

/// Where a value-label dictionary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// Standard-name rule (configured or fallback).
    RuleTable,
    /// Wave document override outside the rule table.
    WaveOverride,
    /// Shared base document field.
    BaseConfig,
    /// Column synthesized by a structural exception; labels emitted directly.
    Derived,
}

impl LabelSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RuleTable => "applied",
            Self::WaveOverride => "applied_from_wave",
            Self::BaseConfig => "applied_from_base",
            Self::Derived => "derived",
        }
    }
}

/// Per-column counts from one dictionary substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelApplication {
    pub source: LabelSource,
    pub mapped: usize,
    pub already_labeled: usize,
    pub unmapped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedColumn {
    pub name: String,
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingLog {
    /// Raw column name to canonical name.
    pub renames: BTreeMap<String, String>,
    /// Output column name to label substitution summary.
    pub labels: BTreeMap<String, LabelApplication>,
    pub derived: Vec<DerivedColumn>,
}

impl MappingLog {
    pub fn is_labeled(&self, column: &str) -> bool {
        self.labels.contains_key(column)
    }

    /// Columns with at least one code that had no dictionary entry.
    pub fn unmapped(&self) -> BTreeMap<&str, usize> {
        self.labels
            .iter()
            .filter(|(_, application)| application.unmapped > 0)
            .map(|(column, application)| (column.as_str(), application.unmapped))
            .collect()
    }

    /// Flat string view: renames as `raw -> canonical`, label substitutions
    /// as `<column>_labels -> <source>`, derivations as `<column>_derived -> inputs`.
    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        let mut flat = self.renames.clone();
        for (column, application) in &self.labels {
            flat.insert(
                format!("{column}_labels"),
                application.source.as_str().to_string(),
            );
        }
        for derived in &self.derived {
            flat.insert(format!("{}_derived", derived.name), derived.inputs.join("+"));
        }
        flat
    }

    pub(crate) fn record_labels(&mut self, column: &str, application: LabelApplication) {
        self.labels.insert(column.to_string(), application);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_map_lists_every_action() {
        let mut log = MappingLog::default();
        log.renames.insert("DEM_AGE".to_string(), "age".to_string());
        log.record_labels(
            "gender",
            LabelApplication {
                source: LabelSource::RuleTable,
                mapped: 4,
                already_labeled: 0,
                unmapped: 1,
            },
        );
        log.record_labels(
            "B5R2",
            LabelApplication {
                source: LabelSource::BaseConfig,
                mapped: 5,
                already_labeled: 0,
                unmapped: 0,
            },
        );
        log.derived.push(DerivedColumn {
            name: "work_status".to_string(),
            inputs: vec!["B5R1".to_string(), "B5R25".to_string()],
        });

        let rendered = log
            .to_flat_map()
            .iter()
            .map(|(k, v)| format!("{k} -> {v}"))
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!(rendered, @r"
        B5R2_labels -> applied_from_base
        DEM_AGE -> age
        gender_labels -> applied
        work_status_derived -> B5R1+B5R25
        ");
        assert_eq!(log.unmapped().get("gender"), Some(&1));
        assert!(log.unmapped().get("B5R2").is_none());
    }
}
