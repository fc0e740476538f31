//! Labor-force indicator derivation.
//!
//! Every derived column is guarded by the presence of its inputs; a missing
//! prerequisite skips that column only. Indicator columns are nullable
//! booleans: a null input yields a null indicator unless the result is
//! already decided (Kleene logic).

use polars::prelude::DataFrame;
use survey_common::{CaseInsensitiveSet, f64_column, kleene_and, kleene_not, kleene_or};
use survey_model::CodedValue;

use crate::column::{coded_column, put_bools, put_f64};
use crate::error::Result;

/// Employment status codes counted as formal employment.
const FORMAL_CODES: &[i64] = &[3, 4];
/// Employment status codes counted as informal employment.
const INFORMAL_CODES: &[i64] = &[1, 2, 5, 6, 7];

/// Labels for the main-job employment status scale, both languages.
const EMPLOYMENT_STATUS_LABELS: &[(&str, i64)] = &[
    ("Berusaha sendiri", 1),
    ("Own account worker", 1),
    ("Berusaha dibantu buruh tidak tetap/buruh tidak dibayar", 2),
    ("Employer assisted by temporary workers", 2),
    ("Berusaha dibantu buruh tetap/buruh dibayar", 3),
    ("Employer assisted by permanent workers", 3),
    ("Buruh/karyawan/pegawai", 4),
    ("Employee", 4),
    ("Pekerja bebas di pertanian", 5),
    ("Casual worker in agriculture", 5),
    ("Pekerja bebas di nonpertanian", 6),
    ("Casual worker not in agriculture", 6),
    ("Pekerja keluarga/tak dibayar", 7),
    ("Unpaid family worker", 7),
];

const EMPLOYED_LABELS: &[&str] = &["Working", "Bekerja"];
const UNEMPLOYED_LABELS: &[&str] = &["Looking for work", "Mencari pekerjaan", "Mencari kerja"];
const IN_SCHOOL_LABELS: &[&str] = &["Masih sekolah", "Still in school"];

/// Accepted names for the "temporarily absent from work" flag.
const ABSENT_COLUMNS: &[&str] = &["temp_not_working", "temporarily_absent"];
/// Accepted names for the "currently seeking work" flag.
const SEEKING_COLUMNS: &[&str] = &["job_seeking", "seeking_work"];

#[derive(Debug, Clone, PartialEq)]
pub struct LaborForceOptions {
    pub min_working_age: f64,
    /// Employed respondents working fewer hours than this are underemployed.
    pub underemployment_hours: f64,
}

impl Default for LaborForceOptions {
    fn default() -> Self {
        Self {
            min_working_age: 15.0,
            underemployment_hours: 35.0,
        }
    }
}

impl LaborForceOptions {
    #[must_use]
    pub fn with_min_working_age(mut self, age: f64) -> Self {
        self.min_working_age = age;
        self
    }

    #[must_use]
    pub fn with_underemployment_hours(mut self, hours: f64) -> Self {
        self.underemployment_hours = hours;
        self
    }
}

/// Derive labor-force indicator columns from a harmonized dataset.
///
/// | Column | Requires |
/// |---|---|
/// | `working_age_population` | `age` |
/// | `employed`, `unemployed` | `main_activity`, else `work_status`, else `worked_1hour` |
/// | `in_labor_force` | employed and unemployed |
/// | `not_in_labor_force` | the above and `working_age_population` |
/// | `underemployed` | employed and `hours_worked` |
/// | `in_school` | `DEM_SKLH`, else `school_participation` |
/// | `formal_employment`, `informal_employment` | `employment_status` |
/// | `total_wage` | `cash_wage` or `in_kind_wage` |
pub fn create_labor_force_indicators(
    df: &DataFrame,
    options: &LaborForceOptions,
) -> Result<DataFrame> {
    let mut out = df.clone();
    let lookup = CaseInsensitiveSet::new(df.get_column_names_owned());

    let working_age = match lookup.get("age") {
        Some(column) => {
            let ages = f64_column(df, column)?;
            let values: Vec<Option<bool>> = ages
                .iter()
                .map(|age| age.map(|a| a >= options.min_working_age))
                .collect();
            put_bools(&mut out, "working_age_population", values.clone())?;
            Some(values)
        }
        None => None,
    };

    let status = if let Some(column) = lookup.get("main_activity") {
        Some(status_from_activity(&coded_column(df, column)?))
    } else if let Some(column) = lookup.get("work_status") {
        Some(status_from_activity(&coded_column(df, column)?))
    } else if let Some(column) = lookup.get("worked_1hour") {
        let worked = coded_column(df, column)?;
        let absent = optional_coded(df, &lookup, ABSENT_COLUMNS)?;
        let seeking = optional_coded(df, &lookup, SEEKING_COLUMNS)?;
        Some(status_from_flags(&worked, absent.as_deref(), seeking.as_deref()))
    } else {
        tracing::debug!("no work status field; employment indicators skipped");
        None
    };

    if let Some((employed, unemployed)) = &status {
        put_bools(&mut out, "employed", employed.clone())?;
        put_bools(&mut out, "unemployed", unemployed.clone())?;
        let in_labor_force: Vec<Option<bool>> = employed
            .iter()
            .zip(unemployed)
            .map(|(e, u)| kleene_or(*e, *u))
            .collect();
        put_bools(&mut out, "in_labor_force", in_labor_force.clone())?;
        if let Some(working_age) = &working_age {
            let not_in: Vec<Option<bool>> = working_age
                .iter()
                .zip(&in_labor_force)
                .map(|(age, lf)| kleene_and(*age, kleene_not(*lf)))
                .collect();
            put_bools(&mut out, "not_in_labor_force", not_in)?;
        }

        if let Some(column) = lookup.get("hours_worked") {
            let hours = f64_column(df, column)?;
            let underemployed: Vec<Option<bool>> = employed
                .iter()
                .zip(&hours)
                .map(|(e, h)| kleene_and(*e, h.map(|h| h < options.underemployment_hours)))
                .collect();
            put_bools(&mut out, "underemployed", underemployed)?;
        }
    }

    let school_column = lookup
        .get("DEM_SKLH")
        .or_else(|| lookup.get("school_participation"));
    if let Some(column) = school_column {
        let values = coded_column(df, column)?
            .iter()
            .map(|cell| cell.as_ref().map(is_in_school))
            .collect();
        put_bools(&mut out, "in_school", values)?;
    }

    if let Some(column) = lookup.get("employment_status") {
        let cells = coded_column(df, column)?;
        let (formal, informal): (Vec<_>, Vec<_>) =
            cells.iter().map(|cell| formality(cell.as_ref())).unzip();
        put_bools(&mut out, "formal_employment", formal)?;
        put_bools(&mut out, "informal_employment", informal)?;
    }

    let cash = lookup.get("cash_wage");
    let in_kind = lookup.get("in_kind_wage");
    if cash.is_some() || in_kind.is_some() {
        let cash = optional_f64(df, cash)?;
        let in_kind = optional_f64(df, in_kind)?;
        let total = (0..df.height())
            .map(|idx| Some(cash[idx].unwrap_or(0.0) + in_kind[idx].unwrap_or(0.0)))
            .collect();
        put_f64(&mut out, "total_wage", total)?;
    }

    Ok(out)
}

type StatusColumns = (Vec<Option<bool>>, Vec<Option<bool>>);

/// Single-field status: code 1 or a working label is employed, code 2 or a
/// looking-for-work label is unemployed.
fn status_from_activity(cells: &[Option<CodedValue>]) -> StatusColumns {
    cells
        .iter()
        .map(|cell| match cell {
            None => (None, None),
            Some(CodedValue::Code(code)) => (Some(*code == 1), Some(*code == 2)),
            Some(value) => (
                Some(EMPLOYED_LABELS.iter().any(|label| value.is_label(label))),
                Some(UNEMPLOYED_LABELS.iter().any(|label| value.is_label(label))),
            ),
        })
        .unzip()
}

/// Status from the "worked at least one hour" question.
///
/// Temporarily absent respondents are employed unless also seeking work;
/// without a seeking field nobody is unemployed.
fn status_from_flags(
    worked: &[Option<CodedValue>],
    absent: Option<&[Option<CodedValue>]>,
    seeking: Option<&[Option<CodedValue>]>,
) -> StatusColumns {
    let flag = |column: Option<&[Option<CodedValue>]>, idx: usize| match column {
        Some(values) => values[idx].as_ref().map(CodedValue::is_affirmative),
        None => Some(false),
    };
    (0..worked.len())
        .map(|idx| {
            let did_work = worked[idx].as_ref().map(CodedValue::is_affirmative);
            let was_absent = flag(absent, idx);
            let is_seeking = flag(seeking, idx);
            let employed = kleene_or(did_work, kleene_and(was_absent, kleene_not(is_seeking)));
            let unemployed = kleene_and(kleene_not(employed), is_seeking);
            (employed, unemployed)
        })
        .unzip()
}

fn is_in_school(value: &CodedValue) -> bool {
    value.is_code(2) || IN_SCHOOL_LABELS.iter().any(|label| value.is_label(label))
}

/// Formal/informal split; unknown codes and unlabeled strings are both false.
fn formality(cell: Option<&CodedValue>) -> (Option<bool>, Option<bool>) {
    let Some(value) = cell else {
        return (None, None);
    };
    let code = match value {
        CodedValue::Code(code) => Some(*code),
        CodedValue::Label(_) => EMPLOYMENT_STATUS_LABELS
            .iter()
            .find(|(label, _)| value.is_label(label))
            .map(|(_, code)| *code),
    };
    match code {
        Some(code) => (
            Some(FORMAL_CODES.contains(&code)),
            Some(INFORMAL_CODES.contains(&code)),
        ),
        None => (Some(false), Some(false)),
    }
}

/// The first of `names` present in the frame.
fn optional_coded(
    df: &DataFrame,
    lookup: &CaseInsensitiveSet,
    names: &[&str],
) -> Result<Option<Vec<Option<CodedValue>>>> {
    match names.iter().find_map(|name| lookup.get(name)) {
        Some(column) => Ok(Some(coded_column(df, column)?)),
        None => Ok(None),
    }
}

fn optional_f64(df: &DataFrame, column: Option<&str>) -> Result<Vec<Option<f64>>> {
    match column {
        Some(column) => Ok(f64_column(df, column)?),
        None => Ok(vec![None; df.height()]),
    }
}
