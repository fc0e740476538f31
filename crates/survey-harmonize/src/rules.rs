use std::collections::BTreeMap;

use survey_config::ConfigStore;
use survey_model::VariableMapping;

use crate::fallback::fallback_rules;

/// Merge two rule sources keyed by canonical name.
///
/// A configured rule replaces the fallback rule with the same name
/// wholesale; fallback rules without a configured counterpart are kept.
pub fn merge_rules(
    fallback: BTreeMap<String, VariableMapping>,
    configured: BTreeMap<String, VariableMapping>,
) -> BTreeMap<String, VariableMapping> {
    let mut merged = fallback;
    merged.extend(configured);
    merged
}

/// Rules for one dataset type.
#[derive(Debug, Clone, Default)]
pub struct HarmonizationRuleSet {
    dataset: String,
    rules: BTreeMap<String, VariableMapping>,
}

impl HarmonizationRuleSet {
    pub fn new(dataset: impl Into<String>, rules: BTreeMap<String, VariableMapping>) -> Self {
        Self {
            dataset: dataset.into(),
            rules,
        }
    }

    /// Fallback table for `dataset`, overlaid with the store's rules.
    pub fn build(dataset: &str, config: Option<&ConfigStore>) -> Self {
        let configured = config.map(ConfigStore::rules).unwrap_or_default();
        let fallback = fallback_rules(dataset);
        tracing::debug!(
            dataset,
            fallback = fallback.len(),
            configured = configured.len(),
            "building rule set"
        );
        Self::new(dataset, merge_rules(fallback, configured))
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn get(&self, standard_name: &str) -> Option<&VariableMapping> {
        self.rules.get(standard_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableMapping> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use survey_model::{ALL_WAVES, ValueLabels};

    use super::*;

    fn rule(name: &str, wave: &str, raw: &str) -> (String, VariableMapping) {
        (
            name.to_string(),
            VariableMapping::new(name, "").with_wave(wave, raw),
        )
    }

    #[test]
    fn configured_rule_replaces_fallback() {
        let mut fallback: BTreeMap<_, _> = [rule("age", "2024", "B4K5"), rule("gender", "2024", "B4K4")]
            .into_iter()
            .collect();
        fallback.get_mut("gender").unwrap().value_mappings.insert(
            ALL_WAVES.to_string(),
            ValueLabels::new().with("1", "Male"),
        );
        let configured = [rule("gender", "2025-02", "DEM_SEX")].into_iter().collect();

        let merged = merge_rules(fallback, configured);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["age"].raw_name_for("2024"), Some("B4K5"));
        assert_eq!(merged["gender"].raw_name_for("2025-02"), Some("DEM_SEX"));
        assert_eq!(merged["gender"].raw_name_for("2024"), None);
        assert!(merged["gender"].labels_for("2024").is_none());
    }

    #[test]
    fn build_without_config_uses_fallback() {
        let rules = HarmonizationRuleSet::build("sakernas", None);
        assert_eq!(rules.dataset(), "sakernas");
        assert!(rules.get("hours_worked").is_some());
        assert!(!rules.is_empty());
    }
}
