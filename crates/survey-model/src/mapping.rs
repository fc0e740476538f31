use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coded::ValueLabels;

/// Key in [`VariableMapping::value_mappings`] shared by every wave.
pub const ALL_WAVES: &str = "all";

/// Rule for one canonical variable across waves.
///
/// A wave without an entry in `wave_names` does not carry the variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableMapping {
    pub standard_name: String,
    #[serde(default)]
    pub wave_names: BTreeMap<String, String>,
    #[serde(default)]
    pub value_mappings: BTreeMap<String, ValueLabels>,
    #[serde(default)]
    pub description: String,
}

impl VariableMapping {
    pub fn new(standard_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            standard_name: standard_name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_wave(mut self, wave: impl Into<String>, raw_name: impl Into<String>) -> Self {
        self.wave_names.insert(wave.into(), raw_name.into());
        self
    }

    /// Attach a value dictionary for one wave, or for every wave with [`ALL_WAVES`].
    #[must_use]
    pub fn with_values(mut self, wave: impl Into<String>, labels: ValueLabels) -> Self {
        self.value_mappings.insert(wave.into(), labels);
        self
    }

    pub fn raw_name_for(&self, wave: &str) -> Option<&str> {
        self.wave_names.get(wave).map(String::as_str)
    }

    /// Value dictionary for `wave`, preferring a wave-specific one over the shared one.
    pub fn labels_for(&self, wave: &str) -> Option<&ValueLabels> {
        self.value_mappings
            .get(wave)
            .or_else(|| self.value_mappings.get(ALL_WAVES))
            .filter(|labels| !labels.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_dictionary_preferred_over_shared() {
        let mapping = VariableMapping::new("urban_rural", "Urban/rural classification")
            .with_wave("2025-02", "KLASIFIKAS")
            .with_values(ALL_WAVES, ValueLabels::new().with("1", "Urban"))
            .with_values("2025-02", ValueLabels::new().with("1", "Perkotaan"));

        let wave = mapping.labels_for("2025-02").unwrap();
        assert_eq!(wave.iter().next(), Some(("1", "Perkotaan")));
        let shared = mapping.labels_for("2024-08").unwrap();
        assert_eq!(shared.iter().next(), Some(("1", "Urban")));
        assert_eq!(mapping.raw_name_for("2024-08"), None);
    }
}
