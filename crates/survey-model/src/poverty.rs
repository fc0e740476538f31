//! Poverty-line reference tables.
//!
//! Lines are keyed by region and urban/rural category. Lookup falls back
//! from the region entry to the national entry for the same area, and from
//! there to a fixed last-resort constant.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coded::CodedValue;
use crate::error::{ModelError, Result};
use crate::province::province_code;

/// Region name the statistics agency uses for the national aggregate.
pub const NATIONAL_REGION: &str = "INDONESIA";

/// Last-resort urban line (rupiah per capita per month).
pub const FALLBACK_URBAN_LINE: f64 = 601_871.0;

/// Last-resort rural line (rupiah per capita per month).
pub const FALLBACK_RURAL_LINE: f64 = 556_874.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    Urban,
    Rural,
}

impl AreaType {
    /// Classify a cell. Code 1 or an urban label is urban; everything else is rural.
    pub fn from_coded(value: &CodedValue) -> Self {
        match value {
            CodedValue::Code(1) => Self::Urban,
            CodedValue::Label(label) => match label.trim().to_ascii_lowercase().as_str() {
                "urban" | "perkotaan" | "kota" => Self::Urban,
                _ => Self::Rural,
            },
            CodedValue::Code(_) => Self::Rural,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urban => "urban",
            Self::Rural => "rural",
        }
    }

    fn fallback_line(self) -> f64 {
        match self {
            Self::Urban => FALLBACK_URBAN_LINE,
            Self::Rural => FALLBACK_RURAL_LINE,
        }
    }
}

impl FromStr for AreaType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urban" | "perkotaan" => Ok(Self::Urban),
            "rural" | "perdesaan" => Ok(Self::Rural),
            _ => Err(ModelError::UnknownArea(s.to_string())),
        }
    }
}

/// Urban and rural thresholds for one region. Either may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaLines {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urban: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rural: Option<f64>,
}

impl AreaLines {
    pub fn new(urban: Option<f64>, rural: Option<f64>) -> Self {
        Self { urban, rural }
    }

    pub fn get(&self, area: AreaType) -> Option<f64> {
        match area {
            AreaType::Urban => self.urban,
            AreaType::Rural => self.rural,
        }
    }

    fn set(&mut self, area: AreaType, value: f64) {
        match area {
            AreaType::Urban => self.urban = Some(value),
            AreaType::Rural => self.rural = Some(value),
        }
    }
}

/// Which tier of the lookup produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSource {
    Region,
    National,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PovertyLine {
    pub value: f64,
    pub source: LineSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PovertyLineTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    pub national: AreaLines,
    /// Keyed by province code (`"31"`), or by upper-cased name when the name is not registered.
    #[serde(default)]
    pub regions: BTreeMap<String, AreaLines>,
}

impl PovertyLineTable {
    pub fn new(national: AreaLines) -> Self {
        Self {
            national,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    /// Add or replace a region entry after validating its thresholds.
    pub fn insert_region(&mut self, region: &CodedValue, lines: AreaLines) -> Result<()> {
        let key = region_key(region);
        for (area, value) in [(AreaType::Urban, lines.urban), (AreaType::Rural, lines.rural)] {
            if let Some(value) = value {
                check_line(&key, area, value)?;
            }
        }
        self.regions.insert(key, lines);
        Ok(())
    }

    /// Build a table from `(region name, area, line)` triples, the shape the
    /// statistics agency publishes. [`NATIONAL_REGION`] rows fill the national entry.
    pub fn from_named_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str, f64)>,
    {
        let mut table = Self::default();
        for (name, area, value) in pairs {
            let area: AreaType = area.parse()?;
            let name = name.trim();
            check_line(name, area, value)?;
            if name.eq_ignore_ascii_case(NATIONAL_REGION) {
                table.national.set(area, value);
                continue;
            }
            let key = region_key(&CodedValue::Label(name.to_string()));
            table.regions.entry(key).or_default().set(area, value);
        }
        if table.national.urban.is_none() || table.national.rural.is_none() {
            tracing::warn!(
                urban = table.national.urban.is_some(),
                rural = table.national.rural.is_some(),
                "poverty line table has no complete national entry"
            );
        }
        Ok(table)
    }

    /// Resolve the line for a region and area.
    ///
    /// Region entry first, then the national entry for the same area, then
    /// the fixed constant.
    pub fn lookup(&self, region: Option<&CodedValue>, area: AreaType) -> PovertyLine {
        if let Some(region) = region
            && let Some(value) = self
                .regions
                .get(&region_key(region))
                .and_then(|lines| lines.get(area))
        {
            return PovertyLine {
                value,
                source: LineSource::Region,
            };
        }
        if let Some(value) = self.national.get(area) {
            return PovertyLine {
                value,
                source: LineSource::National,
            };
        }
        PovertyLine {
            value: area.fallback_line(),
            source: LineSource::Fallback,
        }
    }
}

fn check_line(region: &str, area: AreaType, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidPovertyLine {
            region: region.to_string(),
            area: area.as_str().to_string(),
            value,
        })
    }
}

/// Normalized region key: province code when known, else the upper-cased name.
pub fn region_key(region: &CodedValue) -> String {
    match region {
        CodedValue::Code(code) => code.to_string(),
        CodedValue::Label(name) => match province_code(name) {
            Some(code) => code.to_string(),
            None => name.trim().to_ascii_uppercase(),
        },
    }
}
