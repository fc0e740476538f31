//! Rule-driven harmonization of one wave into the canonical schema.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use survey_common::CaseInsensitiveSet;
use survey_common::logging::redact_value;
use survey_config::{ConfigStore, ResolvedWaveConfig};
use survey_model::{MappingOutcome, ValueLabels};

use crate::column::{coded_column, put_strings};
use crate::error::Result;
use crate::exceptions::{apply_exceptions, builtin_exceptions};
use crate::log::{LabelApplication, LabelSource, MappingLog};
use crate::rules::HarmonizationRuleSet;

/// Per-call harmonization switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarmonizeOptions {
    /// Restrict to these canonical names; `None` maps every rule.
    pub target_variables: Option<Vec<String>>,
    /// Keep raw codes instead of substituting labels.
    pub preserve_labels: bool,
    /// Keep raw column names instead of renaming to canonical names.
    pub preserve_original_names: bool,
}

impl HarmonizeOptions {
    #[must_use]
    pub fn with_target_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_variables = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_preserve_labels(mut self, enable: bool) -> Self {
        self.preserve_labels = enable;
        self
    }

    #[must_use]
    pub fn with_preserve_original_names(mut self, enable: bool) -> Self {
        self.preserve_original_names = enable;
        self
    }
}

/// Harmonization Engine for one dataset type.
#[derive(Debug, Clone)]
pub struct Harmonizer {
    rules: HarmonizationRuleSet,
    config: Option<ConfigStore>,
}

impl Harmonizer {
    pub fn new(dataset: &str, config: Option<&ConfigStore>) -> Self {
        Self {
            rules: HarmonizationRuleSet::build(dataset, config),
            config: config.cloned(),
        }
    }

    /// Load the dataset's rule documents from the default config root.
    pub fn from_default_config(dataset: &str) -> Result<Self> {
        let store = ConfigStore::load(&survey_config::config_root(), dataset)?;
        Ok(Self::new(dataset, Some(&store)))
    }

    /// Switch dataset type; the rule set is rebuilt.
    pub fn set_dataset(&mut self, dataset: &str, config: Option<&ConfigStore>) {
        *self = Self::new(dataset, config);
    }

    pub fn dataset(&self) -> &str {
        self.rules.dataset()
    }

    pub fn rules(&self) -> &HarmonizationRuleSet {
        &self.rules
    }

    /// `(standard_name, raw_name, description)` for every rule covering `wave`.
    pub fn available_variables(&self, wave: &str) -> Vec<(String, String, String)> {
        self.rules
            .iter()
            .filter_map(|rule| {
                rule.raw_name_for(wave).map(|raw| {
                    (
                        rule.standard_name.clone(),
                        raw.to_string(),
                        rule.description.clone(),
                    )
                })
            })
            .collect()
    }

    /// Harmonize `df` as wave `wave`.
    ///
    /// Never adds or removes rows. Variables absent from the rule set or the
    /// data are skipped; codes without a dictionary entry become null.
    ///
    /// # Errors
    ///
    /// Only on Polars failures.
    pub fn harmonize(
        &self,
        df: &DataFrame,
        wave: &str,
        options: &HarmonizeOptions,
    ) -> Result<(DataFrame, MappingLog)> {
        let mut out = df.clone();
        let mut log = MappingLog::default();
        let wave_config = self.config.as_ref().and_then(|store| store.wave(wave));

        let mut exceptions = wave_config
            .map(|config| config.derived.clone())
            .unwrap_or_default();
        exceptions.extend(builtin_exceptions(self.dataset(), wave));
        let protected = apply_exceptions(&mut out, &exceptions, &mut log)?;

        let lookup = CaseInsensitiveSet::new(df.get_column_names_owned());
        let targets: Vec<String> = match &options.target_variables {
            Some(names) => names.clone(),
            None => self.rules.iter().map(|r| r.standard_name.clone()).collect(),
        };

        for target in &targets {
            let Some(rule) = self.rules.get(target) else {
                tracing::debug!(variable = %target, "no rule for variable");
                continue;
            };
            let Some(raw_name) = rule.raw_name_for(wave) else {
                tracing::debug!(variable = %target, wave, "variable not in wave");
                continue;
            };
            let Some(actual) = lookup.get(raw_name) else {
                tracing::debug!(variable = %target, raw = %raw_name, "raw column absent");
                continue;
            };
            if protected.contains(actual) || out.column(actual).is_err() {
                continue;
            }

            let mut column = actual.to_string();
            if !options.preserve_original_names && actual != rule.standard_name {
                if out.column(&rule.standard_name).is_ok() {
                    tracing::warn!(
                        raw = %actual,
                        variable = %rule.standard_name,
                        "canonical name already occupied; keeping raw name"
                    );
                } else {
                    out.rename(actual, rule.standard_name.as_str().into())?;
                    log.renames
                        .insert(actual.to_string(), rule.standard_name.clone());
                    column = rule.standard_name.clone();
                }
            }

            if !options.preserve_labels
                && !protected.contains(&column)
                && let Some(labels) = rule.labels_for(wave)
            {
                let application = apply_labels(&mut out, &column, labels, LabelSource::RuleTable)?;
                log.record_labels(&column, application);
            }
        }

        if !options.preserve_labels
            && let Some(config) = wave_config
        {
            sweep_config_labels(&mut out, config, &protected, &mut log)?;
        }

        tracing::info!(
            dataset = self.dataset(),
            wave,
            renamed = log.renames.len(),
            labeled = log.labels.len(),
            derived = log.derived.len(),
            "harmonized dataset"
        );
        Ok((out, log))
    }
}

/// Re-apply dictionaries from the wave's config to columns the rule table
/// did not touch: wave overrides first, then base fields.
fn sweep_config_labels(
    df: &mut DataFrame,
    config: &ResolvedWaveConfig,
    protected: &BTreeSet<String>,
    log: &mut MappingLog,
) -> Result<()> {
    let sources = config
        .overrides()
        .map(|field| (field, LabelSource::WaveOverride))
        .chain(config.base_fields().map(|field| (field, LabelSource::BaseConfig)));

    for (field, source) in sources {
        let Some(labels) = &field.value_labels else {
            continue;
        };
        let lookup = CaseInsensitiveSet::new(df.get_column_names_owned());
        let Some(column) = lookup.get(&field.raw_name).map(str::to_string) else {
            continue;
        };
        if log.is_labeled(&column) || protected.contains(&column) {
            continue;
        }
        let application = apply_labels(df, &column, labels, source)?;
        log.record_labels(&column, application);
    }
    Ok(())
}

fn apply_labels(
    df: &mut DataFrame,
    column: &str,
    labels: &ValueLabels,
    source: LabelSource,
) -> Result<LabelApplication> {
    let cells = coded_column(df, column)?;
    let mut application = LabelApplication {
        source,
        mapped: 0,
        already_labeled: 0,
        unmapped: 0,
    };
    let mut values = Vec::with_capacity(cells.len());
    for cell in &cells {
        let outcome = labels.apply(cell.as_ref());
        match &outcome {
            MappingOutcome::Mapped(_) => application.mapped += 1,
            MappingOutcome::AlreadyLabeled(_) => application.already_labeled += 1,
            MappingOutcome::Unmapped(raw) => {
                application.unmapped += 1;
                tracing::trace!(
                    column,
                    value = %redact_value(&raw.to_string()),
                    "unmapped code"
                );
            }
            MappingOutcome::Missing => {}
        }
        values.push(outcome.value().map(str::to_string));
    }
    if application.unmapped > 0 {
        tracing::warn!(
            column,
            unmapped = application.unmapped,
            "codes without a label set to null"
        );
    }
    put_strings(df, column, values)?;
    Ok(application)
}
