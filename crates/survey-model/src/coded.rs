//! Tagged cell values and value-label dictionaries.
//!
//! Raw survey files carry categorical answers as integer codes, while a
//! harmonized dataset may already carry the human-readable labels. Every
//! derivation matches on [`CodedValue`] instead of guessing from a sample
//! of the column.
//!
//! ## Classification
//!
//! | Cell | Value |
//! |---|---|
//! | integer | `Code(n)` |
//! | float with integral value | `Code(n)` |
//! | string parsing as an integer (`"01"`, `" 2 "`) | `Code(n)` |
//! | any other non-blank string | `Label(text)` |
//! | boolean | `Code(1)` / `Code(0)` |
//! | null, blank | `None` |
//!
//! Other dtypes are classified from their string rendering.

use std::collections::BTreeMap;

use polars::prelude::AnyValue;
use serde::{Deserialize, Serialize};
use survey_common::{any_to_string, format_numeric, parse_f64, parse_i64};

/// A single categorical cell, either still coded or already labeled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CodedValue {
    Code(i64),
    Label(String),
}

impl CodedValue {
    /// Classify a Polars cell. Returns `None` for null or blank cells.
    pub fn from_any(value: AnyValue<'_>) -> Option<Self> {
        match value {
            AnyValue::Null => None,
            AnyValue::Boolean(b) => Some(Self::Code(i64::from(b))),
            AnyValue::Int8(v) => Some(Self::Code(i64::from(v))),
            AnyValue::Int16(v) => Some(Self::Code(i64::from(v))),
            AnyValue::Int32(v) => Some(Self::Code(i64::from(v))),
            AnyValue::Int64(v) => Some(Self::Code(v)),
            AnyValue::UInt8(v) => Some(Self::Code(i64::from(v))),
            AnyValue::UInt16(v) => Some(Self::Code(i64::from(v))),
            AnyValue::UInt32(v) => Some(Self::Code(i64::from(v))),
            AnyValue::UInt64(v) => Some(
                i64::try_from(v)
                    .map(Self::Code)
                    .unwrap_or_else(|_| Self::Label(v.to_string())),
            ),
            AnyValue::Float32(v) => Self::from_float(f64::from(v)),
            AnyValue::Float64(v) => Self::from_float(v),
            AnyValue::String(s) => Self::parse(s),
            AnyValue::StringOwned(s) => Self::parse(&s),
            other => Self::parse(&any_to_string(other)),
        }
    }

    /// Classify a textual value (config keys, domain values).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(code) = parse_i64(trimmed) {
            return Some(Self::Code(code));
        }
        if let Some(v) = parse_f64(trimmed)
            && v.is_finite()
            && v.fract() == 0.0
        {
            return Some(Self::Code(v as i64));
        }
        Some(Self::Label(trimmed.to_string()))
    }

    fn from_float(v: f64) -> Option<Self> {
        if v.is_nan() {
            return None;
        }
        if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
            Some(Self::Code(v as i64))
        } else {
            Some(Self::Label(format_numeric(v)))
        }
    }

    /// Dictionary key: the decimal code, or the label text.
    pub fn key(&self) -> String {
        match self {
            Self::Code(code) => code.to_string(),
            Self::Label(label) => label.clone(),
        }
    }

    pub fn is_code(&self, code: i64) -> bool {
        matches!(self, Self::Code(c) if *c == code)
    }

    /// Case-insensitive, whitespace-trimmed label comparison.
    pub fn is_label(&self, label: &str) -> bool {
        matches!(self, Self::Label(l) if l.trim().eq_ignore_ascii_case(label.trim()))
    }

    /// True for a "yes" answer on a 1 = yes / 2 = no question, coded or labeled.
    pub fn is_affirmative(&self) -> bool {
        match self {
            Self::Code(code) => *code == 1,
            Self::Label(label) => matches!(
                label.trim().to_ascii_lowercase().as_str(),
                "ya" | "yes" | "y" | "true"
            ),
        }
    }
}

impl std::fmt::Display for CodedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Result of substituting one cell through a value-label dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingOutcome {
    /// The code had an entry; carries the label.
    Mapped(String),
    /// The cell already holds one of the dictionary's labels and is kept.
    AlreadyLabeled(String),
    /// No entry matched; the cell becomes null.
    Unmapped(CodedValue),
    /// The input cell was null or blank.
    Missing,
}

impl MappingOutcome {
    /// Value written to the output column.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Mapped(label) | Self::AlreadyLabeled(label) => Some(label.as_str()),
            Self::Unmapped(_) | Self::Missing => None,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, Self::Unmapped(_))
    }
}

/// A raw-code → label dictionary.
///
/// Keys are normalized on insert so `"01"`, `"1"` and `1` address the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ValueLabels {
    entries: BTreeMap<String, String>,
}

impl ValueLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: impl AsRef<str>, label: impl Into<String>) {
        let key = normalize_key(raw.as_ref());
        self.entries.insert(key, label.into());
    }

    #[must_use]
    pub fn with(mut self, raw: impl AsRef<str>, label: impl Into<String>) -> Self {
        self.insert(raw, label);
        self
    }

    pub fn get(&self, value: &CodedValue) -> Option<&str> {
        self.entries.get(&value.key()).map(String::as_str)
    }

    /// True when `label` is one of the dictionary's output labels.
    pub fn contains_label(&self, label: &str) -> bool {
        self.entries.values().any(|value| value == label)
    }

    /// Reverse lookup: the code whose label matches (case-insensitive).
    pub fn code_for_label(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(_, value)| value.eq_ignore_ascii_case(label.trim()))
            .and_then(|(key, _)| parse_i64(key))
    }

    pub fn apply(&self, value: Option<&CodedValue>) -> MappingOutcome {
        let Some(value) = value else {
            return MappingOutcome::Missing;
        };
        if let Some(label) = self.get(value) {
            return MappingOutcome::Mapped(label.to_string());
        }
        if let CodedValue::Label(label) = value
            && self.contains_label(label)
        {
            return MappingOutcome::AlreadyLabeled(label.clone());
        }
        MappingOutcome::Unmapped(value.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn normalize_key(raw: &str) -> String {
    match CodedValue::parse(raw) {
        Some(value) => value.key(),
        None => String::new(),
    }
}

impl From<BTreeMap<String, String>> for ValueLabels {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut labels = Self::new();
        for (raw, label) in map {
            labels.insert(raw, label);
        }
        labels
    }
}

impl From<ValueLabels> for BTreeMap<String, String> {
    fn from(labels: ValueLabels) -> Self {
        labels.entries
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ValueLabels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut labels = Self::new();
        for (raw, label) in iter {
            labels.insert(raw, label);
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_polars_cells() {
        assert_eq!(CodedValue::from_any(AnyValue::Int32(1)), Some(CodedValue::Code(1)));
        assert_eq!(CodedValue::from_any(AnyValue::Float64(2.0)), Some(CodedValue::Code(2)));
        assert_eq!(
            CodedValue::from_any(AnyValue::Float64(2.5)),
            Some(CodedValue::Label("2.5".to_string()))
        );
        assert_eq!(CodedValue::from_any(AnyValue::String(" 03 ")), Some(CodedValue::Code(3)));
        assert_eq!(
            CodedValue::from_any(AnyValue::String("Bekerja")),
            Some(CodedValue::Label("Bekerja".to_string()))
        );
        assert_eq!(CodedValue::from_any(AnyValue::String("  ")), None);
        assert_eq!(CodedValue::from_any(AnyValue::Null), None);
        assert_eq!(CodedValue::from_any(AnyValue::Boolean(true)), Some(CodedValue::Code(1)));
        assert_eq!(CodedValue::from_any(AnyValue::Boolean(false)), Some(CodedValue::Code(0)));
    }

    #[test]
    fn affirmative_answers() {
        assert!(CodedValue::Code(1).is_affirmative());
        assert!(!CodedValue::Code(2).is_affirmative());
        assert!(CodedValue::Label("Ya".to_string()).is_affirmative());
        assert!(!CodedValue::Label("Tidak".to_string()).is_affirmative());
    }

    #[test]
    fn keys_are_normalized() {
        let labels = ValueLabels::new().with("01", "Urban").with("2", "Rural");
        assert_eq!(labels.get(&CodedValue::Code(1)), Some("Urban"));
        assert_eq!(labels.get(&CodedValue::Code(2)), Some("Rural"));
        assert_eq!(labels.code_for_label("rural"), Some(2));
    }

    #[test]
    fn apply_reports_outcomes() {
        let labels = ValueLabels::new().with("1", "Male").with("2", "Female");
        assert_eq!(
            labels.apply(Some(&CodedValue::Code(1))),
            MappingOutcome::Mapped("Male".to_string())
        );
        assert_eq!(
            labels.apply(Some(&CodedValue::Label("Female".to_string()))),
            MappingOutcome::AlreadyLabeled("Female".to_string())
        );
        assert_eq!(
            labels.apply(Some(&CodedValue::Code(9))),
            MappingOutcome::Unmapped(CodedValue::Code(9))
        );
        assert_eq!(labels.apply(None), MappingOutcome::Missing);
        assert!(labels.apply(Some(&CodedValue::Code(9))).value().is_none());
    }

    #[test]
    fn deserializes_from_string_map() {
        let labels: ValueLabels = serde_json::from_str(r#"{"01": "Ya", "2": "Tidak"}"#).unwrap();
        assert_eq!(labels.get(&CodedValue::Code(1)), Some("Ya"));
        assert_eq!(labels.len(), 2);
    }
}
