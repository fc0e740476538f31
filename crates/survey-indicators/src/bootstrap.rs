//! Bootstrap standard errors for the Gini coefficient.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use survey_design::{ConfidenceInterval, z_value};

use crate::formulas::gini;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    pub replications: usize,
    pub seed: u64,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            replications: 200,
            seed: 42,
        }
    }
}

impl BootstrapOptions {
    #[must_use]
    pub fn with_replications(mut self, replications: usize) -> Self {
        self.replications = replications;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BootstrapEstimate {
    pub estimate: f64,
    pub standard_error: f64,
    /// Percentile interval of the replicate estimates.
    pub interval: ConfidenceInterval,
    /// Replicates that produced an estimate.
    pub replications: usize,
}

impl BootstrapEstimate {
    /// Normal-approximation interval from the bootstrap standard error.
    pub fn normal_interval(&self, level: f64) -> ConfidenceInterval {
        ConfidenceInterval::around(self.estimate, self.standard_error, z_value(level))
    }
}

/// Resample units with replacement and recompute the Gini per replicate.
///
/// Replicate `r` draws from `StdRng::seed_from_u64(seed + r)`, so results
/// depend only on the inputs and the seed. Returns `None` when the point
/// estimate is undefined or fewer than two replicates succeed.
pub fn gini_bootstrap(
    values: &[f64],
    weights: &[f64],
    options: &BootstrapOptions,
    confidence_level: f64,
) -> Option<BootstrapEstimate> {
    let estimate = gini(values, weights)?;
    let n = values.len().min(weights.len());
    if n == 0 {
        return None;
    }

    let mut replicates: Vec<f64> = (0..options.replications)
        .into_par_iter()
        .filter_map(|rep| {
            let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(rep as u64));
            let mut sample_values = Vec::with_capacity(n);
            let mut sample_weights = Vec::with_capacity(n);
            for _ in 0..n {
                let idx = rng.gen_range(0..n);
                sample_values.push(values[idx]);
                sample_weights.push(weights[idx]);
            }
            gini(&sample_values, &sample_weights)
        })
        .collect();

    if replicates.len() < 2 {
        tracing::warn!(
            replications = options.replications,
            succeeded = replicates.len(),
            "too few bootstrap replicates"
        );
        return None;
    }

    let count = replicates.len() as f64;
    let mean = replicates.iter().sum::<f64>() / count;
    let variance = replicates.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / (count - 1.0);

    replicates.sort_by(f64::total_cmp);
    let tail = (1.0 - confidence_level.clamp(0.0, 1.0)) / 2.0;
    let interval = ConfidenceInterval {
        low: percentile(&replicates, tail),
        high: percentile(&replicates, 1.0 - tail),
    };

    Some(BootstrapEstimate {
        estimate,
        standard_error: variance.sqrt(),
        interval,
        replications: replicates.len(),
    })
}

/// Nearest-rank percentile of sorted values.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let last = sorted.len().saturating_sub(1);
    let rank = (p * last as f64).round() as usize;
    sorted[rank.min(last)]
}
