use polars::prelude::{AnyValue, BooleanChunked, DataFrame, NewChunkedArray};
use survey_common::{any_to_string, column_values, f64_column, is_numeric_dtype};

use crate::error::{DesignError, Result};

/// Column roles of a sample design. Only the weight is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignSpec {
    pub weight: String,
    pub strata: Option<String>,
    pub psu: Option<String>,
    pub ssu: Option<String>,
}

impl DesignSpec {
    pub fn new(weight: impl Into<String>) -> Self {
        Self {
            weight: weight.into(),
            strata: None,
            psu: None,
            ssu: None,
        }
    }

    #[must_use]
    pub fn with_strata(mut self, column: impl Into<String>) -> Self {
        self.strata = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_psu(mut self, column: impl Into<String>) -> Self {
        self.psu = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_ssu(mut self, column: impl Into<String>) -> Self {
        self.ssu = Some(column.into());
        self
    }
}

/// An immutable dataset bound to its design columns.
///
/// Subsetting returns a new design; the data is never mutated in place.
#[derive(Debug, Clone)]
pub struct SurveyDesign {
    data: DataFrame,
    spec: DesignSpec,
    weights: Vec<f64>,
}

impl SurveyDesign {
    /// Validate the column roles and bind them to `data`.
    ///
    /// # Errors
    ///
    /// The weight column is missing or not numeric, or a named strata,
    /// PSU or SSU column is missing.
    pub fn construct(data: DataFrame, spec: DesignSpec) -> Result<Self> {
        let weight = data
            .column(&spec.weight)
            .map_err(|_| DesignError::MissingColumn {
                role: "weight",
                column: spec.weight.clone(),
            })?;
        if !is_numeric_dtype(weight.dtype()) {
            return Err(DesignError::NonNumericWeight {
                column: spec.weight.clone(),
                dtype: weight.dtype().to_string(),
            });
        }
        for (role, column) in [
            ("strata", &spec.strata),
            ("psu", &spec.psu),
            ("ssu", &spec.ssu),
        ] {
            if let Some(column) = column
                && data.column(column).is_err()
            {
                return Err(DesignError::MissingColumn {
                    role,
                    column: column.clone(),
                });
            }
        }

        let raw = f64_column(&data, &spec.weight)?;
        let nulls = raw.iter().filter(|w| w.is_none()).count();
        if nulls > 0 {
            tracing::warn!(column = %spec.weight, nulls, "null weights treated as zero");
        }
        let weights = raw.into_iter().map(|w| w.unwrap_or(0.0)).collect();

        Ok(Self {
            data,
            spec,
            weights,
        })
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn spec(&self) -> &DesignSpec {
        &self.spec
    }

    pub fn weight_column(&self) -> &str {
        &self.spec.weight
    }

    pub fn strata_column(&self) -> Option<&str> {
        self.spec.strata.as_deref()
    }

    pub fn psu_column(&self) -> Option<&str> {
        self.spec.psu.as_deref()
    }

    pub fn ssu_column(&self) -> Option<&str> {
        self.spec.ssu.as_deref()
    }

    /// Weights with nulls replaced by zero.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    /// Stratum key per row; a single stratum when no strata column is bound.
    pub fn strata_keys(&self) -> Result<Vec<String>> {
        self.keys(self.spec.strata.as_deref())
    }

    /// PSU key per row; every row is its own PSU when no PSU column is bound.
    pub fn psu_keys(&self) -> Result<Vec<String>> {
        match self.spec.psu.as_deref() {
            Some(_) => self.keys(self.spec.psu.as_deref()),
            None => Ok((0..self.height()).map(|idx| idx.to_string()).collect()),
        }
    }

    fn keys(&self, column: Option<&str>) -> Result<Vec<String>> {
        match column {
            Some(column) => Ok(column_values(&self.data, column)?
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect()),
            None => Ok(vec![String::new(); self.height()]),
        }
    }

    /// New design over the rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.height() {
            return Err(DesignError::MaskLength {
                expected: self.height(),
                actual: mask.len(),
            });
        }
        let mask = BooleanChunked::from_slice("keep".into(), mask);
        let data = self.data.filter(&mask)?;
        Self::construct(data, self.spec.clone())
    }

    /// New design over the rows whose `column` renders as `value`.
    pub fn subset(&self, column: &str, value: &str) -> Result<Self> {
        let series = self
            .data
            .column(column)
            .map_err(|_| DesignError::MissingColumn {
                role: "subset",
                column: column.to_string(),
            })?;
        let mask: Vec<bool> = (0..self.height())
            .map(|idx| any_to_string(series.get(idx).unwrap_or(AnyValue::Null)).trim() == value)
            .collect();
        self.filter(&mask)
    }
}

#[cfg(test)]
mod tests {
    use polars::df;

    use super::*;

    #[test]
    fn null_weights_become_zero() {
        let data = df!("w" => [Some(1.5), None, Some(2.0)]).unwrap();
        let design = SurveyDesign::construct(data, DesignSpec::new("w")).unwrap();
        assert_eq!(design.weights(), &[1.5, 0.0, 2.0]);
    }

    #[test]
    fn default_keys() {
        let data = df!("w" => [1.0, 1.0]).unwrap();
        let design = SurveyDesign::construct(data, DesignSpec::new("w")).unwrap();
        assert_eq!(design.strata_keys().unwrap(), vec!["", ""]);
        assert_eq!(design.psu_keys().unwrap(), vec!["0", "1"]);
    }
}
