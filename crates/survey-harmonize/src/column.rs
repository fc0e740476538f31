//! Column extraction and replacement shared by the engine and the derivations.

use polars::prelude::{AnyValue, DataFrame, NamedFrom, PolarsResult, Series};
use survey_model::CodedValue;

pub(crate) fn coded_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<CodedValue>>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(CodedValue::from_any(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

pub(crate) fn put_strings(
    df: &mut DataFrame,
    name: &str,
    values: Vec<Option<String>>,
) -> PolarsResult<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

pub(crate) fn put_bools(df: &mut DataFrame, name: &str, values: Vec<Option<bool>>) -> PolarsResult<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

pub(crate) fn put_f64(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> PolarsResult<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}
