//! Design-based variance for ratio estimators.
//!
//! Every weighted estimate in the indicator engine is a ratio
//! `R = Σ w·y / Σ w·x` (a mean has `x = 1`, a rate has `x` = eligibility).
//! Domain estimates pass `y = x = 0` for rows outside the domain, so the
//! full design structure is kept when the variance is computed.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::design::SurveyDesign;
use crate::error::{DesignError, Result};

/// Lower and upper bound of a confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

impl ConfidenceInterval {
    pub fn around(estimate: f64, standard_error: f64, z: f64) -> Self {
        Self {
            low: estimate - z * standard_error,
            high: estimate + z * standard_error,
        }
    }
}

pub trait VarianceEstimator: Send + Sync {
    /// Variance of `Σ w·numerator / Σ w·denominator` under `design`.
    ///
    /// Returns `Ok(None)` when the weighted denominator is zero.
    fn ratio_variance(
        &self,
        design: &SurveyDesign,
        numerator: &[f64],
        denominator: &[f64],
    ) -> Result<Option<f64>>;

    fn confidence_level(&self) -> f64;

    /// Normal-approximation interval around `estimate`.
    fn interval(
        &self,
        design: &SurveyDesign,
        estimate: f64,
        numerator: &[f64],
        denominator: &[f64],
    ) -> Result<Option<ConfidenceInterval>> {
        let variance = self.ratio_variance(design, numerator, denominator)?;
        Ok(variance
            .filter(|v| v.is_finite())
            .map(|v| ConfidenceInterval::around(estimate, v.max(0.0).sqrt(), z_value(self.confidence_level()))))
    }
}

/// Taylor-linearized, with-replacement ultimate-cluster variance.
///
/// Rows are grouped into PSUs within strata. Without a PSU column every row
/// is its own PSU; without a strata column the sample is one stratum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearizationEstimator {
    pub confidence_level: f64,
}

impl Default for LinearizationEstimator {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
        }
    }
}

impl LinearizationEstimator {
    #[must_use]
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }
}

impl VarianceEstimator for LinearizationEstimator {
    fn ratio_variance(
        &self,
        design: &SurveyDesign,
        numerator: &[f64],
        denominator: &[f64],
    ) -> Result<Option<f64>> {
        let rows = design.height();
        for len in [numerator.len(), denominator.len()] {
            if len != rows {
                return Err(DesignError::MaskLength {
                    expected: rows,
                    actual: len,
                });
            }
        }

        let weights = design.weights();
        let total_y: f64 = weights.iter().zip(numerator).map(|(w, y)| w * y).sum();
        let total_x: f64 = weights.iter().zip(denominator).map(|(w, x)| w * x).sum();
        if total_x == 0.0 {
            return Ok(None);
        }
        let ratio = total_y / total_x;

        let strata = design.strata_keys()?;
        let psus = design.psu_keys()?;

        // stratum -> psu -> summed linearized score
        let mut totals: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
        for idx in 0..rows {
            let score = weights[idx] * (numerator[idx] - ratio * denominator[idx]) / total_x;
            *totals
                .entry(strata[idx].as_str())
                .or_default()
                .entry(psus[idx].as_str())
                .or_insert(0.0) += score;
        }

        let mut variance = 0.0;
        for (stratum, psu_totals) in &totals {
            let n_h = psu_totals.len();
            if n_h < 2 {
                tracing::warn!(stratum = %stratum, "single PSU in stratum contributes no variance");
                continue;
            }
            let mean = psu_totals.values().sum::<f64>() / n_h as f64;
            let spread: f64 = psu_totals.values().map(|z| (z - mean).powi(2)).sum();
            variance += n_h as f64 / (n_h - 1) as f64 * spread;
        }
        Ok(Some(variance))
    }

    fn confidence_level(&self) -> f64 {
        self.confidence_level
    }
}

/// Two-sided standard-normal critical value for a confidence `level`.
///
/// Levels outside `(0, 1)` are clamped to the nearest sensible bound.
pub fn z_value(level: f64) -> f64 {
    let level = level.clamp(1e-9, 1.0 - 1e-12);
    inverse_normal(1.0 - (1.0 - level) / 2.0)
}

// Acklam's rational approximation, relative error below 1.2e-9.
fn inverse_normal(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}
