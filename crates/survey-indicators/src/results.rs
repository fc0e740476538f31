//! Indicator estimates and their tabular views.

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame, NamedFrom};
use serde::Serialize;
use survey_design::ConfidenceInterval;

use crate::catalog::Indicator;
use crate::error::Result;

/// One estimate for one domain cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorResult {
    pub indicator: Indicator,
    /// Reported name: the indicator name, or a component such as `p90_p10`.
    pub measure: &'static str,
    /// `(domain column, value)` pairs; empty for the overall estimate.
    pub domain: Vec<(String, String)>,
    pub estimate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci: Option<ConfidenceInterval>,
    /// Unweighted number of contributing rows.
    pub sample_size: usize,
}

impl IndicatorResult {
    pub fn domain_value(&self, column: &str) -> Option<&str> {
        self.domain
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorResults {
    by: Vec<String>,
    include_ci: bool,
    results: Vec<IndicatorResult>,
}

impl IndicatorResults {
    pub(crate) fn new(by: Vec<String>, include_ci: bool, results: Vec<IndicatorResult>) -> Self {
        Self {
            by,
            include_ci,
            results,
        }
    }

    pub fn by(&self) -> &[String] {
        &self.by
    }

    pub fn results(&self) -> &[IndicatorResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// First result reported under `measure`.
    pub fn get(&self, measure: &str) -> Option<&IndicatorResult> {
        self.results.iter().find(|r| r.measure == measure)
    }

    pub fn estimate(&self, measure: &str) -> Option<f64> {
        self.get(measure).and_then(|r| r.estimate)
    }

    /// Results grouped by measure, domain cells in computation order.
    pub fn nested(&self) -> BTreeMap<&'static str, Vec<&IndicatorResult>> {
        let mut nested: BTreeMap<&'static str, Vec<&IndicatorResult>> = BTreeMap::new();
        for result in &self.results {
            nested.entry(result.measure).or_default().push(result);
        }
        nested
    }

    /// Flat table `{indicator, [by...], estimate, [ci_low, ci_high]}`.
    pub fn to_table(&self) -> Result<DataFrame> {
        build_table(None, self.results.iter().map(|r| (None, r)), &self.by, self.include_ci)
    }
}

/// Stack per-wave results into one table with a leading `wave` column.
///
/// Domain columns are the union of every wave's `by` columns.
pub fn wave_table(results: &BTreeMap<String, IndicatorResults>) -> Result<DataFrame> {
    let mut by: Vec<String> = Vec::new();
    for wave in results.values() {
        for column in &wave.by {
            if !by.contains(column) {
                by.push(column.clone());
            }
        }
    }
    let include_ci = results.values().any(|r| r.include_ci);
    let rows = results
        .iter()
        .flat_map(|(wave, r)| r.results.iter().map(move |result| (Some(wave.as_str()), result)));
    build_table(Some("wave"), rows, &by, include_ci)
}

fn build_table<'a, I>(
    wave_column: Option<&str>,
    rows: I,
    by: &[String],
    include_ci: bool,
) -> Result<DataFrame>
where
    I: Iterator<Item = (Option<&'a str>, &'a IndicatorResult)>,
{
    let mut waves: Vec<Option<String>> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut domains: Vec<Vec<Option<String>>> = vec![Vec::new(); by.len()];
    let mut estimates: Vec<Option<f64>> = Vec::new();
    let mut lows: Vec<Option<f64>> = Vec::new();
    let mut highs: Vec<Option<f64>> = Vec::new();

    for (wave, result) in rows {
        waves.push(wave.map(str::to_string));
        names.push(result.measure.to_string());
        for (idx, column) in by.iter().enumerate() {
            domains[idx].push(result.domain_value(column).map(str::to_string));
        }
        estimates.push(result.estimate);
        lows.push(result.ci.map(|ci| ci.low));
        highs.push(result.ci.map(|ci| ci.high));
    }

    let mut columns = Vec::with_capacity(by.len() + 5);
    if let Some(wave_column) = wave_column {
        columns.push(Column::new(wave_column.into(), waves));
    }
    columns.push(Column::new("indicator".into(), names));
    for (column, values) in by.iter().zip(domains) {
        columns.push(Column::new(column.as_str().into(), values));
    }
    columns.push(Column::new("estimate".into(), estimates));
    if include_ci {
        columns.push(Column::new("ci_low".into(), lows));
        columns.push(Column::new("ci_high".into(), highs));
    }
    Ok(DataFrame::new(columns)?)
}
