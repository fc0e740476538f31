use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use survey_model::ValueLabels;

/// One raw field's definition, in a base document or a wave override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub canon_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_labels: Option<ValueLabels>,
    /// Name of a shared codelist; ignored when `value_labels` is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codelist: Option<String>,
}

/// `base.toml`: definitions shared by every wave of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDocument {
    #[serde(default)]
    pub dataset: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDef>,
    #[serde(default)]
    pub codelists: BTreeMap<String, ValueLabels>,
    /// Category name to canonical variable names.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

/// `<wave>.toml`: wave-specific overrides layered on the base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveDocument {
    #[serde(default)]
    pub dataset: String,
    pub wave: String,
    #[serde(default)]
    pub overrides: BTreeMap<String, FieldDef>,
    /// Codelists local to the wave; shadow base codelists of the same name.
    #[serde(default)]
    pub codelists: BTreeMap<String, ValueLabels>,
    #[serde(default)]
    pub derive: Vec<DeriveRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeriveKind {
    /// Work status from a "worked at least one hour" flag and a "seeking work" flag.
    WorkStatusFromFlags,
}

/// A structural exception: a canonical column synthesized from several raw fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveRule {
    pub kind: DeriveKind,
    #[serde(default = "default_derive_target")]
    pub target: String,
    pub worked: String,
    pub seeking: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absent: Option<String>,
}

fn default_derive_target() -> String {
    "work_status".to_string()
}
