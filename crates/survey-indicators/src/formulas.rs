//! Weighted estimators over plain slices.
//!
//! These take one value and one weight per unit and know nothing about
//! designs, columns or domains. Every function returns `None` when the
//! relevant weight total is zero or no unit qualifies.

use serde::Serialize;

/// `100 × Σ w·1[eligible ∧ condition] / Σ w·1[eligible]`.
///
/// Null eligibility excludes the row; a null condition on an eligible row
/// counts as not meeting the condition.
pub fn weighted_rate(
    condition: &[Option<bool>],
    eligible: &[Option<bool>],
    weights: &[f64],
) -> Option<f64> {
    let mut hits = 0.0;
    let mut base = 0.0;
    for ((cond, elig), w) in condition.iter().zip(eligible).zip(weights) {
        if *elig == Some(true) {
            base += w;
            if *cond == Some(true) {
                hits += w;
            }
        }
    }
    (base != 0.0).then(|| 100.0 * hits / base)
}

/// `Σ w·x / Σ w` over the non-null values.
pub fn weighted_mean(values: &[Option<f64>], weights: &[f64]) -> Option<f64> {
    let mut total = 0.0;
    let mut weight = 0.0;
    for (value, w) in values.iter().zip(weights) {
        if let Some(value) = value {
            total += w * value;
            weight += w;
        }
    }
    (weight != 0.0).then(|| total / weight)
}

fn sorted_pairs(values: &[f64], weights: &[f64]) -> Vec<(f64, f64)> {
    let mut pairs: Vec<(f64, f64)> = values
        .iter()
        .copied()
        .zip(weights.iter().copied())
        .filter(|(v, w)| v.is_finite() && w.is_finite() && *w > 0.0)
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs
}

/// Gini coefficient from the weighted Lorenz curve.
///
/// Units are sorted by value; the curve plots cumulative weight share
/// against cumulative `w·x` share and the Gini is `1 − 2 × area` by the
/// trapezoid rule, clamped to `[0, 1]`.
pub fn gini(values: &[f64], weights: &[f64]) -> Option<f64> {
    let pairs = sorted_pairs(values, weights);
    let total_weight: f64 = pairs.iter().map(|(_, w)| w).sum();
    let total_value: f64 = pairs.iter().map(|(v, w)| v * w).sum();
    if total_weight == 0.0 || total_value == 0.0 {
        return None;
    }

    let mut area = 0.0;
    let (mut cum_w, mut cum_v) = (0.0, 0.0);
    let (mut prev_x, mut prev_y) = (0.0, 0.0);
    for (v, w) in pairs {
        cum_w += w;
        cum_v += v * w;
        let x = cum_w / total_weight;
        let y = cum_v / total_value;
        area += (x - prev_x) * (y + prev_y) / 2.0;
        prev_x = x;
        prev_y = y;
    }
    Some((1.0 - 2.0 * area).clamp(0.0, 1.0))
}

/// Foster-Greer-Thorbecke index as a fraction of the weighted population.
///
/// A unit is poor when its value is below its own line and contributes
/// `((line − value) / line)^alpha`; `alpha = 0` counts membership.
pub fn fgt(values: &[f64], lines: &[f64], weights: &[f64], alpha: f64) -> Option<f64> {
    let mut total = 0.0;
    let mut poor = 0.0;
    for ((value, line), w) in values.iter().zip(lines).zip(weights) {
        total += w;
        poor += w * fgt_contribution(*value, *line, alpha);
    }
    (total != 0.0).then(|| poor / total)
}

pub(crate) fn fgt_contribution(value: f64, line: f64, alpha: f64) -> f64 {
    if line <= 0.0 || value >= line {
        return 0.0;
    }
    if alpha == 0.0 {
        1.0
    } else {
        ((line - value) / line).powf(alpha)
    }
}

/// Weighted quantile: the smallest value whose cumulative weight share
/// reaches `q`.
pub fn weighted_quantile(values: &[f64], weights: &[f64], q: f64) -> Option<f64> {
    let pairs = sorted_pairs(values, weights);
    let total: f64 = pairs.iter().map(|(_, w)| w).sum();
    if total == 0.0 {
        return None;
    }
    let target = q.clamp(0.0, 1.0) * total;
    let mut cumulative = 0.0;
    for (v, w) in &pairs {
        cumulative += w;
        if cumulative >= target - total * 1e-12 {
            return Some(*v);
        }
    }
    pairs.last().map(|(v, _)| *v)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileRatios {
    pub p10: f64,
    pub p20: f64,
    pub p50: f64,
    pub p80: f64,
    pub p90: f64,
    pub p90_p10: Option<f64>,
    pub p80_p20: Option<f64>,
    pub p90_p50: Option<f64>,
    pub p50_p10: Option<f64>,
}

impl PercentileRatios {
    /// Reported measure names, ratios first.
    pub const MEASURES: [&'static str; 9] = [
        "p90_p10", "p80_p20", "p90_p50", "p50_p10", "p10", "p20", "p50", "p80", "p90",
    ];

    /// Values in [`Self::MEASURES`] order.
    pub fn values(&self) -> [Option<f64>; 9] {
        [
            self.p90_p10,
            self.p80_p20,
            self.p90_p50,
            self.p50_p10,
            Some(self.p10),
            Some(self.p20),
            Some(self.p50),
            Some(self.p80),
            Some(self.p90),
        ]
    }
}

/// Weighted p10/p20/p50/p80/p90 and their ratios. A ratio is `None` when
/// its divisor percentile is not positive.
pub fn percentile_ratios(values: &[f64], weights: &[f64]) -> Option<PercentileRatios> {
    let p10 = weighted_quantile(values, weights, 0.10)?;
    let p20 = weighted_quantile(values, weights, 0.20)?;
    let p50 = weighted_quantile(values, weights, 0.50)?;
    let p80 = weighted_quantile(values, weights, 0.80)?;
    let p90 = weighted_quantile(values, weights, 0.90)?;
    let ratio = |top: f64, bottom: f64| (bottom > 0.0).then(|| top / bottom);
    Some(PercentileRatios {
        p10,
        p20,
        p50,
        p80,
        p90,
        p90_p10: ratio(p90, p10),
        p80_p20: ratio(p80, p20),
        p90_p50: ratio(p90, p50),
        p50_p10: ratio(p50, p10),
    })
}

fn positive_pairs(values: &[f64], weights: &[f64]) -> (Vec<(f64, f64)>, f64, f64) {
    let pairs: Vec<(f64, f64)> = sorted_pairs(values, weights)
        .into_iter()
        .filter(|(v, _)| *v > 0.0)
        .collect();
    let total_weight: f64 = pairs.iter().map(|(_, w)| w).sum();
    let total_value: f64 = pairs.iter().map(|(v, w)| v * w).sum();
    (pairs, total_weight, total_value)
}

/// Theil T index over the positive values.
pub fn theil_index(values: &[f64], weights: &[f64]) -> Option<f64> {
    let (pairs, total_weight, total_value) = positive_pairs(values, weights);
    if total_weight == 0.0 {
        return None;
    }
    let mean = total_value / total_weight;
    let sum: f64 = pairs
        .iter()
        .map(|(v, w)| {
            let share = v / mean;
            w * share * share.ln()
        })
        .sum();
    Some((sum / total_weight).max(0.0))
}

/// Atkinson index with inequality aversion `epsilon ≥ 0`, over the positive
/// values.
pub fn atkinson_index(values: &[f64], weights: &[f64], epsilon: f64) -> Option<f64> {
    if epsilon.is_nan() || epsilon < 0.0 {
        return None;
    }
    let (pairs, total_weight, total_value) = positive_pairs(values, weights);
    if total_weight == 0.0 {
        return None;
    }
    let mean = total_value / total_weight;
    let equally_distributed = if (epsilon - 1.0).abs() < f64::EPSILON {
        let log_mean = pairs.iter().map(|(v, w)| w * v.ln()).sum::<f64>() / total_weight;
        log_mean.exp()
    } else {
        let power = 1.0 - epsilon;
        let moment = pairs.iter().map(|(v, w)| w * (v / mean).powf(power)).sum::<f64>() / total_weight;
        mean * moment.powf(1.0 / power)
    };
    Some((1.0 - equally_distributed / mean).clamp(0.0, 1.0))
}
