//! Weight diagnostics.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::design::SurveyDesign;
use crate::error::Result;

/// Kish effective sample size `(Σw)² / Σw²`; `None` when every weight is zero.
pub fn kish_effective_sample_size(weights: &[f64]) -> Option<f64> {
    let total: f64 = weights.iter().sum();
    let squares: f64 = weights.iter().map(|w| w * w).sum();
    (squares > 0.0).then(|| total * total / squares)
}

/// Coefficient of variation of the weights (sample standard deviation over
/// the mean); `None` for fewer than two weights or a zero mean.
pub fn weight_cv(weights: &[f64]) -> Option<f64> {
    let n = weights.len();
    if n < 2 {
        return None;
    }
    let mean = weights.iter().sum::<f64>() / n as f64;
    if mean == 0.0 {
        return None;
    }
    let variance = weights.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt() / mean)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightStats {
    pub total_weight: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    pub mean_weight: f64,
    pub effective_sample_size: Option<f64>,
    pub cv_weights: Option<f64>,
    /// Design effect due to unequal weighting, `n / n_eff`.
    pub design_effect: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignSummary {
    pub sample_size: usize,
    pub weight_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strata_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psu_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssu_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_strata: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_psu: Option<usize>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub stats: Option<WeightStats>,
}

impl SurveyDesign {
    /// Describe the design. With `stats`, weight diagnostics over every row
    /// of this design are included.
    pub fn summary(&self, stats: bool) -> Result<DesignSummary> {
        let n_strata = match self.strata_column() {
            Some(_) => Some(self.strata_keys()?.into_iter().collect::<BTreeSet<_>>().len()),
            None => None,
        };
        let n_psu = match self.psu_column() {
            Some(_) => {
                let strata = self.strata_keys()?;
                let psus = self.psu_keys()?;
                Some(strata.into_iter().zip(psus).collect::<BTreeSet<_>>().len())
            }
            None => None,
        };

        Ok(DesignSummary {
            sample_size: self.height(),
            weight_column: self.weight_column().to_string(),
            strata_column: self.strata_column().map(str::to_string),
            psu_column: self.psu_column().map(str::to_string),
            ssu_column: self.ssu_column().map(str::to_string),
            n_strata,
            n_psu,
            stats: stats.then(|| weight_stats(self.weights())),
        })
    }
}

fn weight_stats(weights: &[f64]) -> WeightStats {
    let total: f64 = weights.iter().sum();
    let n = weights.len();
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let effective = kish_effective_sample_size(weights);
    WeightStats {
        total_weight: total,
        min_weight: if n == 0 { 0.0 } else { min },
        max_weight: if n == 0 { 0.0 } else { max },
        mean_weight: if n == 0 { 0.0 } else { total / n as f64 },
        effective_sample_size: effective,
        cv_weights: weight_cv(weights),
        design_effect: effective.filter(|e| *e > 0.0).map(|e| n as f64 / e),
    }
}
