//! Indicator computation over a survey design.
//!
//! Each indicator is first reduced to per-row inputs over the whole design
//! (a numerator/denominator pair for ratio estimators, or a value vector
//! for distributional measures). Domain cells then only select rows, so
//! weights are never renormalized per subgroup and the variance estimator
//! sees the full design with out-of-domain rows contributing zero.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame};
use rayon::prelude::*;
use survey_common::{CaseInsensitiveSet, bool_column, f64_column};
use survey_design::{LinearizationEstimator, SurveyDesign, VarianceEstimator};
use survey_model::{AreaType, CodedValue};

use crate::bootstrap::gini_bootstrap;
use crate::catalog::{Formula, Indicator, MeanSource};
use crate::domain::{DomainCell, domain_cells};
use crate::error::{IndicatorError, Result};
use crate::formulas::{
    PercentileRatios, atkinson_index, fgt_contribution, gini, percentile_ratios, theil_index,
};
use crate::options::{
    CalculationRequest, HOUSEHOLD_SIZE_FALLBACK_COLUMN, IndicatorOptions, VALUE_FALLBACK_COLUMN,
};
use crate::results::{IndicatorResult, IndicatorResults};

/// Per-row inputs of one indicator.
#[derive(Debug, Clone)]
enum Prepared {
    /// `Σ w·numerator / Σ w·denominator`.
    Ratio {
        numerator: Vec<f64>,
        denominator: Vec<f64>,
    },
    /// Welfare values; `None` rows are excluded.
    Distribution { values: Vec<Option<f64>> },
}

/// Compute the requested indicators for every domain cell of `design`.
///
/// # Errors
///
/// A named indicator whose inputs are absent, an unknown domain column, or
/// a Polars failure. Zero-weight cells are not errors: they yield a null
/// estimate and a warning.
pub fn calculate_indicators(
    design: &SurveyDesign,
    request: &CalculationRequest,
    options: &IndicatorOptions,
) -> Result<IndicatorResults> {
    let data = design.data();
    let columns = CaseInsensitiveSet::new(data.get_column_names_owned());

    let mut prepared = Vec::new();
    for indicator in request.selection.indicators() {
        match prepare(indicator, data, &columns, options) {
            Ok(inputs) => prepared.push((indicator, inputs)),
            Err(err) if request.selection.is_all() && err.is_missing_input() => {
                tracing::debug!(indicator = %indicator, reason = %err, "indicator skipped");
            }
            Err(err) => return Err(err),
        }
    }

    let cells = domain_cells(data, &columns, &request.by)?;
    let estimator =
        LinearizationEstimator::default().with_confidence_level(options.confidence_level);

    let tasks: Vec<(usize, usize)> = (0..prepared.len())
        .flat_map(|i| (0..cells.len()).map(move |c| (i, c)))
        .collect();
    let evaluated = tasks
        .par_iter()
        .map(|&(i, c)| {
            let (indicator, inputs) = &prepared[i];
            evaluate(
                design,
                *indicator,
                inputs,
                &cells[c],
                request.include_ci,
                options,
                &estimator,
            )
        })
        .collect::<Result<Vec<Vec<IndicatorResult>>>>()?;

    let results: Vec<IndicatorResult> = evaluated.into_iter().flatten().collect();
    tracing::info!(
        indicators = prepared.len(),
        cells = cells.len(),
        results = results.len(),
        "indicators computed"
    );
    Ok(IndicatorResults::new(
        request.by.clone(),
        request.include_ci,
        results,
    ))
}

/// Compute the same request for several waves.
pub fn calculate_indicators_multi(
    designs: &BTreeMap<String, SurveyDesign>,
    request: &CalculationRequest,
    options: &IndicatorOptions,
) -> Result<BTreeMap<String, IndicatorResults>> {
    designs
        .iter()
        .map(|(wave, design)| {
            tracing::debug!(wave = %wave, rows = design.height(), "computing wave");
            Ok((wave.clone(), calculate_indicators(design, request, options)?))
        })
        .collect()
}

fn require<'a>(
    indicator: Indicator,
    columns: &'a CaseInsensitiveSet,
    name: &str,
) -> Result<&'a str> {
    columns.get(name).ok_or_else(|| IndicatorError::MissingColumn {
        indicator: indicator.name(),
        column: name.to_string(),
    })
}

fn value_column<'a>(
    indicator: Indicator,
    columns: &'a CaseInsensitiveSet,
    options: &IndicatorOptions,
) -> Result<&'a str> {
    columns
        .get(&options.value_column)
        .or_else(|| columns.get(VALUE_FALLBACK_COLUMN))
        .ok_or_else(|| IndicatorError::MissingColumn {
            indicator: indicator.name(),
            column: options.value_column.clone(),
        })
}

fn household_sizes(
    df: &DataFrame,
    columns: &CaseInsensitiveSet,
    options: &IndicatorOptions,
) -> Result<Option<Vec<Option<f64>>>> {
    let column = columns
        .get(&options.household_size_column)
        .or_else(|| columns.get(HOUSEHOLD_SIZE_FALLBACK_COLUMN));
    match column {
        Some(column) => Ok(Some(f64_column(df, column)?)),
        None => Ok(None),
    }
}

/// Welfare values with single-person households removed when requested.
fn welfare_values(
    indicator: Indicator,
    df: &DataFrame,
    columns: &CaseInsensitiveSet,
    options: &IndicatorOptions,
) -> Result<Vec<Option<f64>>> {
    let mut values = f64_column(df, value_column(indicator, columns, options)?)?;
    if options.exclude_single_person {
        match household_sizes(df, columns, options)? {
            Some(sizes) => {
                for (value, size) in values.iter_mut().zip(sizes) {
                    if size == Some(1.0) {
                        *value = None;
                    }
                }
            }
            None => tracing::warn!(
                indicator = %indicator,
                column = %options.household_size_column,
                "no household size column, single-person households kept"
            ),
        }
    }
    Ok(values)
}

fn prepare(
    indicator: Indicator,
    df: &DataFrame,
    columns: &CaseInsensitiveSet,
    options: &IndicatorOptions,
) -> Result<Prepared> {
    match indicator.formula() {
        Formula::Rate {
            condition,
            eligible,
        } => {
            let condition = bool_column(df, require(indicator, columns, condition)?)?;
            let eligible = match eligible {
                Some(name) => bool_column(df, require(indicator, columns, name)?)?,
                None => condition.iter().map(|c| Some(c.is_some())).collect(),
            };
            let (numerator, denominator) = condition
                .iter()
                .zip(&eligible)
                .map(|(cond, elig)| match (elig, cond) {
                    (Some(true), Some(true)) => (100.0, 1.0),
                    (Some(true), _) => (0.0, 1.0),
                    _ => (0.0, 0.0),
                })
                .unzip();
            Ok(Prepared::Ratio {
                numerator,
                denominator,
            })
        }
        Formula::Mean(source) => {
            let values = match source {
                MeanSource::Wage => {
                    let column = require(indicator, columns, &options.wage_column)?;
                    let mut wages = f64_column(df, column)?;
                    if let Some(employed) = columns.get("employed") {
                        for (wage, employed) in wages.iter_mut().zip(bool_column(df, employed)?) {
                            if employed != Some(true) {
                                *wage = None;
                            }
                        }
                    }
                    wages
                }
                MeanSource::Value => welfare_values(indicator, df, columns, options)?,
            };
            let (numerator, denominator) = values
                .iter()
                .map(|value| match value {
                    Some(v) if v.is_finite() => (*v, 1.0),
                    _ => (0.0, 0.0),
                })
                .unzip();
            Ok(Prepared::Ratio {
                numerator,
                denominator,
            })
        }
        Formula::Poverty { alpha } => prepare_poverty(indicator, alpha, df, columns, options),
        Formula::Gini | Formula::Theil | Formula::Atkinson | Formula::Percentiles => {
            Ok(Prepared::Distribution {
                values: welfare_values(indicator, df, columns, options)?,
            })
        }
    }
}

fn coded(df: &DataFrame, column: &str) -> Result<Vec<Option<CodedValue>>> {
    let series = df.column(column)?;
    Ok((0..df.height())
        .map(|idx| CodedValue::from_any(series.get(idx).unwrap_or(AnyValue::Null)))
        .collect())
}

/// Poverty measures are ratio estimators: the numerator carries
/// `100 × m × contribution` and the denominator `m`, where `m` is the
/// household size when person weighting applies and 1 otherwise.
fn prepare_poverty(
    indicator: Indicator,
    alpha: f64,
    df: &DataFrame,
    columns: &CaseInsensitiveSet,
    options: &IndicatorOptions,
) -> Result<Prepared> {
    let table = options
        .poverty_lines
        .as_ref()
        .ok_or(IndicatorError::MissingPovertyLines {
            indicator: indicator.name(),
        })?;
    let values = welfare_values(indicator, df, columns, options)?;
    let regions = coded(df, require(indicator, columns, &options.region_column)?)?;
    let areas = coded(df, require(indicator, columns, &options.area_column)?)?;
    let multipliers = if options.person_weighted_poverty {
        household_sizes(df, columns, options)?
    } else {
        None
    };

    let mut numerator = Vec::with_capacity(df.height());
    let mut denominator = Vec::with_capacity(df.height());
    let mut unclassified = 0usize;
    for row in 0..df.height() {
        let multiplier = match &multipliers {
            Some(sizes) => sizes[row],
            None => Some(1.0),
        };
        let (Some(value), Some(area), Some(m)) = (values[row], areas[row].as_ref(), multiplier)
        else {
            if areas[row].is_none() {
                unclassified += 1;
            }
            numerator.push(0.0);
            denominator.push(0.0);
            continue;
        };
        let line = table.lookup(regions[row].as_ref(), AreaType::from_coded(area));
        numerator.push(100.0 * m * fgt_contribution(value, line.value, alpha));
        denominator.push(m);
    }
    if unclassified > 0 {
        tracing::warn!(
            indicator = %indicator,
            rows = unclassified,
            "rows without an urban/rural classification excluded"
        );
    }
    Ok(Prepared::Ratio {
        numerator,
        denominator,
    })
}

fn evaluate(
    design: &SurveyDesign,
    indicator: Indicator,
    inputs: &Prepared,
    cell: &DomainCell,
    include_ci: bool,
    options: &IndicatorOptions,
    estimator: &LinearizationEstimator,
) -> Result<Vec<IndicatorResult>> {
    let weights = design.weights();
    let result = |measure: &'static str, estimate: Option<f64>, sample_size: usize| {
        IndicatorResult {
            indicator,
            measure,
            domain: cell.values.clone(),
            estimate,
            ci: None,
            sample_size,
        }
    };

    match inputs {
        Prepared::Ratio {
            numerator,
            denominator,
        } => {
            let mut top = 0.0;
            let mut bottom = 0.0;
            let mut sample_size = 0;
            for &row in &cell.rows {
                top += weights[row] * numerator[row];
                bottom += weights[row] * denominator[row];
                if denominator[row] != 0.0 {
                    sample_size += 1;
                }
            }
            if bottom == 0.0 {
                warn_empty(indicator, cell);
                return Ok(vec![result(indicator.name(), None, sample_size)]);
            }
            let estimate = top / bottom;
            let mut out = result(indicator.name(), Some(estimate), sample_size);
            if include_ci {
                let mask = cell.mask(design.height());
                let masked = |values: &[f64]| -> Vec<f64> {
                    values
                        .iter()
                        .zip(&mask)
                        .map(|(v, keep)| if *keep { *v } else { 0.0 })
                        .collect()
                };
                out.ci = estimator.interval(
                    design,
                    estimate,
                    &masked(numerator),
                    &masked(denominator),
                )?;
            }
            Ok(vec![out])
        }
        Prepared::Distribution { values } => {
            let mut cell_values = Vec::with_capacity(cell.rows.len());
            let mut cell_weights = Vec::with_capacity(cell.rows.len());
            for &row in &cell.rows {
                if let Some(value) = values[row] {
                    cell_values.push(value);
                    cell_weights.push(weights[row]);
                }
            }
            let n = cell_values.len();
            let total: f64 = cell_weights.iter().sum();
            if total == 0.0 {
                warn_empty(indicator, cell);
            }

            let out = match indicator.formula() {
                Formula::Gini => {
                    let mut out = result(indicator.name(), gini(&cell_values, &cell_weights), n);
                    if include_ci && let Some(bootstrap) = &options.bootstrap {
                        out.ci = gini_bootstrap(
                            &cell_values,
                            &cell_weights,
                            bootstrap,
                            options.confidence_level,
                        )
                        .map(|b| b.interval);
                    }
                    vec![out]
                }
                Formula::Theil => vec![result(
                    indicator.name(),
                    theil_index(&cell_values, &cell_weights),
                    n,
                )],
                Formula::Atkinson => vec![result(
                    indicator.name(),
                    atkinson_index(&cell_values, &cell_weights, options.atkinson_epsilon),
                    n,
                )],
                _ => {
                    let values = percentile_ratios(&cell_values, &cell_weights)
                        .map_or([None; 9], |ratios| ratios.values());
                    PercentileRatios::MEASURES
                        .into_iter()
                        .zip(values)
                        .map(|(measure, value)| result(measure, value, n))
                        .collect()
                }
            };
            Ok(out)
        }
    }
}

fn warn_empty(indicator: Indicator, cell: &DomainCell) {
    let domain = cell
        .values
        .iter()
        .map(|(column, value)| format!("{column}={value}"))
        .collect::<Vec<_>>()
        .join(",");
    tracing::warn!(indicator = %indicator, domain = %domain, "zero total weight, estimate is null");
}
