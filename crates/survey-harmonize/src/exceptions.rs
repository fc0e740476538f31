//! Wave-specific structural exceptions.
//!
//! Some waves do not expose a single combined field for a canonical
//! variable. These rules synthesize the canonical column from several raw
//! fields before generic mapping runs.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use survey_common::CaseInsensitiveSet;
use survey_config::{DeriveKind, DeriveRule};
use survey_model::CodedValue;

use crate::column::{coded_column, put_strings};
use crate::error::Result;
use crate::log::{DerivedColumn, LabelApplication, LabelSource, MappingLog};

pub const WORKING: &str = "Working";
pub const LOOKING_FOR_WORK: &str = "Looking for work";
pub const NOT_WORKING: &str = "Not Working";

/// Exceptions that ship with the engine.
///
/// The August 2024 labor-force questionnaire splits work status into a
/// "worked at least one hour" question, a "temporarily absent" question
/// and a "looking for work" question.
pub fn builtin_exceptions(dataset: &str, wave: &str) -> Vec<DeriveRule> {
    match (dataset, wave) {
        ("sakernas", "2024-08") => vec![DeriveRule {
            kind: DeriveKind::WorkStatusFromFlags,
            target: "work_status".to_string(),
            worked: "B5R1".to_string(),
            seeking: "B5R25".to_string(),
            absent: Some("B5R2".to_string()),
        }],
        _ => Vec::new(),
    }
}

/// Apply each rule whose inputs are present; returns the protected column names.
///
/// A rule is skipped when its target column already exists or a required
/// input is missing. The first rule to claim a target wins.
pub(crate) fn apply_exceptions(
    df: &mut DataFrame,
    rules: &[DeriveRule],
    log: &mut MappingLog,
) -> Result<BTreeSet<String>> {
    let mut protected = BTreeSet::new();
    for rule in rules {
        let lookup = CaseInsensitiveSet::new(df.get_column_names_owned());
        if lookup.contains(&rule.target) {
            tracing::debug!(target_column = %rule.target, "derived column already present");
            continue;
        }
        let (Some(worked), Some(seeking)) = (lookup.get(&rule.worked), lookup.get(&rule.seeking))
        else {
            tracing::debug!(
                target_column = %rule.target,
                worked = %rule.worked,
                seeking = %rule.seeking,
                "structural exception inputs absent"
            );
            continue;
        };
        let absent = rule.absent.as_deref().and_then(|name| lookup.get(name));

        let mut inputs = vec![worked.to_string(), seeking.to_string()];
        let worked_values = coded_column(df, worked)?;
        let seeking_values = coded_column(df, seeking)?;
        let absent_values = match absent {
            Some(name) => {
                inputs.push(name.to_string());
                Some(coded_column(df, name)?)
            }
            None => None,
        };

        let values: Vec<Option<String>> = match rule.kind {
            DeriveKind::WorkStatusFromFlags => (0..df.height())
                .map(|idx| {
                    work_status_from_flags(
                        worked_values[idx].as_ref(),
                        seeking_values[idx].as_ref(),
                        absent_values.as_ref().and_then(|v| v[idx].as_ref()),
                    )
                    .map(str::to_string)
                })
                .collect(),
        };
        let mapped = values.iter().filter(|v| v.is_some()).count();
        put_strings(df, &rule.target, values)?;

        tracing::info!(
            target_column = %rule.target,
            inputs = %inputs.join("+"),
            "derived column from structural exception"
        );
        log.record_labels(
            &rule.target,
            LabelApplication {
                source: LabelSource::Derived,
                mapped,
                already_labeled: 0,
                unmapped: 0,
            },
        );
        log.derived.push(DerivedColumn {
            name: rule.target.clone(),
            inputs,
        });
        protected.insert(rule.target.clone());
    }
    Ok(protected)
}

/// Work status label from yes/no answers.
///
/// Temporarily absent respondents count as working unless they are also
/// looking for work. A missing "worked" answer yields null.
pub fn work_status_from_flags(
    worked: Option<&CodedValue>,
    seeking: Option<&CodedValue>,
    absent: Option<&CodedValue>,
) -> Option<&'static str> {
    let worked = worked?.is_affirmative();
    let seeking = seeking.is_some_and(CodedValue::is_affirmative);
    let absent = absent.is_some_and(CodedValue::is_affirmative);
    if worked || (absent && !seeking) {
        Some(WORKING)
    } else if seeking {
        Some(LOOKING_FOR_WORK)
    } else {
        Some(NOT_WORKING)
    }
}
