//! The named indicator catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    LaborForceParticipationRate,
    EmploymentRate,
    UnemploymentRate,
    UnderemploymentRate,
    InformalEmploymentRate,
    SchoolParticipationRate,
    AverageWage,
    PerCapitaExpenditure,
    Gini,
    TheilIndex,
    AtkinsonIndex,
    PercentileRatios,
    PovertyHeadcount,
    PovertyGap,
    PovertySeverity,
}

/// How an indicator is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Formula {
    /// Percentage of eligible rows meeting `condition`. Without an eligibility
    /// column every row with a non-null condition is eligible.
    Rate {
        condition: &'static str,
        eligible: Option<&'static str>,
    },
    Mean(MeanSource),
    Poverty { alpha: f64 },
    Gini,
    Theil,
    Atkinson,
    Percentiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MeanSource {
    /// Wage column, restricted to employed rows when an `employed` column exists.
    Wage,
    /// Welfare value column (per-capita expenditure).
    Value,
}

impl Indicator {
    pub const ALL: [Self; 15] = [
        Self::LaborForceParticipationRate,
        Self::EmploymentRate,
        Self::UnemploymentRate,
        Self::UnderemploymentRate,
        Self::InformalEmploymentRate,
        Self::SchoolParticipationRate,
        Self::AverageWage,
        Self::PerCapitaExpenditure,
        Self::Gini,
        Self::TheilIndex,
        Self::AtkinsonIndex,
        Self::PercentileRatios,
        Self::PovertyHeadcount,
        Self::PovertyGap,
        Self::PovertySeverity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::LaborForceParticipationRate => "labor_force_participation_rate",
            Self::EmploymentRate => "employment_rate",
            Self::UnemploymentRate => "unemployment_rate",
            Self::UnderemploymentRate => "underemployment_rate",
            Self::InformalEmploymentRate => "informal_employment_rate",
            Self::SchoolParticipationRate => "school_participation_rate",
            Self::AverageWage => "average_wage",
            Self::PerCapitaExpenditure => "per_capita_expenditure",
            Self::Gini => "gini",
            Self::TheilIndex => "theil_index",
            Self::AtkinsonIndex => "atkinson_index",
            Self::PercentileRatios => "percentile_ratios",
            Self::PovertyHeadcount => "poverty_headcount",
            Self::PovertyGap => "poverty_gap",
            Self::PovertySeverity => "poverty_severity",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::LaborForceParticipationRate => "Labor force as % of working-age population",
            Self::EmploymentRate => "Employed as % of the labor force",
            Self::UnemploymentRate => "Open unemployment as % of the labor force",
            Self::UnderemploymentRate => "Employed working under the hours threshold, % of employed",
            Self::InformalEmploymentRate => "Informal workers as % of employed",
            Self::SchoolParticipationRate => "Currently in school, % of respondents",
            Self::AverageWage => "Mean total wage of employed workers",
            Self::PerCapitaExpenditure => "Mean monthly per-capita expenditure",
            Self::Gini => "Gini coefficient of per-capita expenditure",
            Self::TheilIndex => "Theil T index of per-capita expenditure",
            Self::AtkinsonIndex => "Atkinson index of per-capita expenditure",
            Self::PercentileRatios => "Weighted percentiles and their ratios",
            Self::PovertyHeadcount => "P0, % of population below the poverty line",
            Self::PovertyGap => "P1, mean normalized poverty gap (x100)",
            Self::PovertySeverity => "P2, mean squared normalized poverty gap (x100)",
        }
    }

    pub(crate) fn formula(self) -> Formula {
        match self {
            Self::LaborForceParticipationRate => Formula::Rate {
                condition: "in_labor_force",
                eligible: Some("working_age_population"),
            },
            Self::EmploymentRate => Formula::Rate {
                condition: "employed",
                eligible: Some("in_labor_force"),
            },
            Self::UnemploymentRate => Formula::Rate {
                condition: "unemployed",
                eligible: Some("in_labor_force"),
            },
            Self::UnderemploymentRate => Formula::Rate {
                condition: "underemployed",
                eligible: Some("employed"),
            },
            Self::InformalEmploymentRate => Formula::Rate {
                condition: "informal_employment",
                eligible: Some("employed"),
            },
            Self::SchoolParticipationRate => Formula::Rate {
                condition: "in_school",
                eligible: None,
            },
            Self::AverageWage => Formula::Mean(MeanSource::Wage),
            Self::PerCapitaExpenditure => Formula::Mean(MeanSource::Value),
            Self::Gini => Formula::Gini,
            Self::TheilIndex => Formula::Theil,
            Self::AtkinsonIndex => Formula::Atkinson,
            Self::PercentileRatios => Formula::Percentiles,
            Self::PovertyHeadcount => Formula::Poverty { alpha: 0.0 },
            Self::PovertyGap => Formula::Poverty { alpha: 1.0 },
            Self::PovertySeverity => Formula::Poverty { alpha: 2.0 },
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Indicator {
    type Err = IndicatorError;

    /// Accepts catalog names and the `p0`/`p1`/`p2` poverty shorthands.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let alias = match key.as_str() {
            "p0" => Some(Self::PovertyHeadcount),
            "p1" => Some(Self::PovertyGap),
            "p2" => Some(Self::PovertySeverity),
            _ => None,
        };
        alias
            .or_else(|| Self::ALL.into_iter().find(|ind| ind.name() == key))
            .ok_or_else(|| IndicatorError::UnknownIndicator(s.trim().to_string()))
    }
}

/// Which indicators a calculation covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndicatorSelection {
    /// The whole catalog; entries whose inputs are absent are skipped.
    #[default]
    All,
    /// Exactly these; absent inputs are an error.
    Named(Vec<Indicator>),
}

impl IndicatorSelection {
    pub fn indicators(&self) -> Vec<Indicator> {
        match self {
            Self::All => Indicator::ALL.to_vec(),
            Self::Named(named) => {
                let mut out: Vec<Indicator> = Vec::with_capacity(named.len());
                for indicator in named {
                    if !out.contains(indicator) {
                        out.push(*indicator);
                    }
                }
                out
            }
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<Vec<Indicator>> for IndicatorSelection {
    fn from(named: Vec<Indicator>) -> Self {
        Self::Named(named)
    }
}

impl From<Indicator> for IndicatorSelection {
    fn from(indicator: Indicator) -> Self {
        Self::Named(vec![indicator])
    }
}

impl FromStr for IndicatorSelection {
    type Err = IndicatorError;

    /// `"all"` or a comma-separated list of names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let named = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Indicator>, _>>()?;
        Ok(Self::Named(named))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for indicator in Indicator::ALL {
            assert_eq!(indicator.name().parse::<Indicator>().unwrap(), indicator);
        }
    }

    #[test]
    fn selection_parsing() {
        assert_eq!("ALL".parse::<IndicatorSelection>().unwrap(), IndicatorSelection::All);
        assert_eq!(
            "p0, gini".parse::<IndicatorSelection>().unwrap(),
            IndicatorSelection::Named(vec![Indicator::PovertyHeadcount, Indicator::Gini])
        );
        let err = "gini,hdi".parse::<IndicatorSelection>().unwrap_err();
        assert_eq!(err.to_string(), "unknown indicator: hdi");
    }

    #[test]
    fn named_selection_drops_duplicates() {
        let selection = IndicatorSelection::Named(vec![Indicator::Gini, Indicator::Gini]);
        assert_eq!(selection.indicators(), vec![Indicator::Gini]);
    }
}
