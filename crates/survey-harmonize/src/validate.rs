use polars::prelude::{DataFrame, DataType};
use serde::Serialize;
use survey_common::CaseInsensitiveSet;

use crate::engine::Harmonizer;

/// Cross-check of a harmonized dataset against its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub wave: String,
    pub original_shape: (usize, usize),
    pub harmonized_shape: (usize, usize),
    /// `raw -> canonical` for every rule that produced its column.
    pub variables_mapped: Vec<String>,
    /// Canonical columns that carry labels from a rule dictionary.
    pub value_mappings_applied: Vec<String>,
    pub missing_variables: Vec<String>,
    pub validation_passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Harmonizer {
    /// Every rule whose raw column existed in `original` must have produced
    /// its canonical column, and the row count must be unchanged.
    pub fn validate_harmonization(
        &self,
        original: &DataFrame,
        harmonized: &DataFrame,
        wave: &str,
    ) -> ValidationReport {
        let mut report = ValidationReport {
            wave: wave.to_string(),
            original_shape: original.shape(),
            harmonized_shape: harmonized.shape(),
            variables_mapped: Vec::new(),
            value_mappings_applied: Vec::new(),
            missing_variables: Vec::new(),
            validation_passed: true,
            error: None,
        };

        let lookup = CaseInsensitiveSet::new(original.get_column_names_owned());
        for rule in self.rules().iter() {
            let Some(raw_name) = rule.raw_name_for(wave) else {
                continue;
            };
            let Some(actual) = lookup.get(raw_name) else {
                continue;
            };
            match harmonized.column(&rule.standard_name) {
                Ok(column) => {
                    report
                        .variables_mapped
                        .push(format!("{actual} -> {}", rule.standard_name));
                    if rule.labels_for(wave).is_some() && column.dtype() == &DataType::String {
                        report.value_mappings_applied.push(rule.standard_name.clone());
                    }
                }
                Err(_) => {
                    report.missing_variables.push(rule.standard_name.clone());
                    report.validation_passed = false;
                }
            }
        }

        if original.height() != harmonized.height() {
            report.validation_passed = false;
            report.error = Some("Row count mismatch between original and harmonized data".to_string());
        }

        if !report.validation_passed {
            tracing::warn!(
                wave,
                missing = report.missing_variables.len(),
                "harmonization validation failed"
            );
        }
        report
    }
}
