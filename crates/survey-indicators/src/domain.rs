//! Domain cells: the cross product of the values of the `by` columns.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{AnyValue, DataFrame};
use survey_common::CaseInsensitiveSet;
use survey_model::CodedValue;

use crate::error::{IndicatorError, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DomainCell {
    /// `(requested column name, rendered value)` per `by` column.
    pub values: Vec<(String, String)>,
    /// Row indices in the cell, ascending.
    pub rows: Vec<usize>,
}

impl DomainCell {
    /// Full-length membership mask.
    pub fn mask(&self, height: usize) -> Vec<bool> {
        let mut mask = vec![false; height];
        for &row in &self.rows {
            mask[row] = true;
        }
        mask
    }
}

/// Every combination of the distinct non-null values of `by`, in sorted
/// order, with the rows that fall in it. Rows with a null in any `by` column
/// belong to no cell. Without `by` there is one cell holding every row.
pub(crate) fn domain_cells(
    df: &DataFrame,
    columns: &CaseInsensitiveSet,
    by: &[String],
) -> Result<Vec<DomainCell>> {
    if by.is_empty() {
        return Ok(vec![DomainCell {
            values: Vec::new(),
            rows: (0..df.height()).collect(),
        }]);
    }

    let mut keys: Vec<Vec<Option<CodedValue>>> = Vec::with_capacity(by.len());
    let mut levels: Vec<Vec<CodedValue>> = Vec::with_capacity(by.len());
    for name in by {
        let actual = columns
            .get(name)
            .ok_or_else(|| IndicatorError::MissingDomainColumn(name.clone()))?;
        let column = df.column(actual)?;
        let values: Vec<Option<CodedValue>> = (0..df.height())
            .map(|idx| CodedValue::from_any(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect();
        let distinct: BTreeSet<CodedValue> = values.iter().flatten().cloned().collect();
        levels.push(distinct.into_iter().collect());
        keys.push(values);
    }

    let mut combos: Vec<Vec<CodedValue>> = vec![Vec::new()];
    for level in &levels {
        combos = combos
            .into_iter()
            .flat_map(|prefix| {
                level.iter().map(move |value| {
                    let mut combo = prefix.clone();
                    combo.push(value.clone());
                    combo
                })
            })
            .collect();
    }

    let index: BTreeMap<&[CodedValue], usize> = combos
        .iter()
        .enumerate()
        .map(|(idx, combo)| (combo.as_slice(), idx))
        .collect();
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); combos.len()];
    let mut excluded = 0usize;
    for row in 0..df.height() {
        let key: Option<Vec<CodedValue>> = keys.iter().map(|column| column[row].clone()).collect();
        match key.as_deref().and_then(|key| index.get(key)) {
            Some(&cell) => rows[cell].push(row),
            None => excluded += 1,
        }
    }
    if excluded > 0 {
        tracing::debug!(rows = excluded, "rows with null domain values excluded");
    }

    Ok(combos
        .iter()
        .zip(rows)
        .map(|(combo, rows)| DomainCell {
            values: by
                .iter()
                .zip(combo)
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
            rows,
        })
        .collect())
}
