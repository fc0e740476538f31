use survey_model::PovertyLineTable;

use crate::bootstrap::BootstrapOptions;
use crate::catalog::IndicatorSelection;

/// Per-capita value column used when the configured one is absent.
pub const VALUE_FALLBACK_COLUMN: &str = "KAPITA";

/// Household-size column used when the configured one is absent.
pub const HOUSEHOLD_SIZE_FALLBACK_COLUMN: &str = "R301";

/// Column roles and parameters for indicator computation.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOptions {
    /// Welfare value for means, inequality and poverty measures.
    pub value_column: String,
    pub wage_column: String,
    pub region_column: String,
    pub area_column: String,
    pub household_size_column: String,
    /// Drop single-person households from welfare measures.
    pub exclude_single_person: bool,
    /// Multiply weights by household size for poverty measures.
    pub person_weighted_poverty: bool,
    pub poverty_lines: Option<PovertyLineTable>,
    pub atkinson_epsilon: f64,
    pub confidence_level: f64,
    /// Bootstrap settings for Gini intervals; `None` leaves them empty.
    pub bootstrap: Option<BootstrapOptions>,
}

impl Default for IndicatorOptions {
    fn default() -> Self {
        Self {
            value_column: "per_capita_expenditure".to_string(),
            wage_column: "total_wage".to_string(),
            region_column: "province_code".to_string(),
            area_column: "urban_rural".to_string(),
            household_size_column: "household_size".to_string(),
            exclude_single_person: false,
            person_weighted_poverty: true,
            poverty_lines: None,
            atkinson_epsilon: 0.5,
            confidence_level: 0.95,
            bootstrap: None,
        }
    }
}

impl IndicatorOptions {
    #[must_use]
    pub fn with_value_column(mut self, column: impl Into<String>) -> Self {
        self.value_column = column.into();
        self
    }

    #[must_use]
    pub fn with_wage_column(mut self, column: impl Into<String>) -> Self {
        self.wage_column = column.into();
        self
    }

    #[must_use]
    pub fn with_region_column(mut self, column: impl Into<String>) -> Self {
        self.region_column = column.into();
        self
    }

    #[must_use]
    pub fn with_area_column(mut self, column: impl Into<String>) -> Self {
        self.area_column = column.into();
        self
    }

    #[must_use]
    pub fn with_household_size_column(mut self, column: impl Into<String>) -> Self {
        self.household_size_column = column.into();
        self
    }

    #[must_use]
    pub fn with_exclude_single_person(mut self, exclude: bool) -> Self {
        self.exclude_single_person = exclude;
        self
    }

    #[must_use]
    pub fn with_person_weighted_poverty(mut self, person_weighted: bool) -> Self {
        self.person_weighted_poverty = person_weighted;
        self
    }

    #[must_use]
    pub fn with_poverty_lines(mut self, table: PovertyLineTable) -> Self {
        self.poverty_lines = Some(table);
        self
    }

    #[must_use]
    pub fn with_atkinson_epsilon(mut self, epsilon: f64) -> Self {
        self.atkinson_epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: BootstrapOptions) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }
}

/// What to compute: indicators, domain columns and whether to attach intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationRequest {
    pub selection: IndicatorSelection,
    pub by: Vec<String>,
    pub include_ci: bool,
}

impl Default for CalculationRequest {
    fn default() -> Self {
        Self::new(IndicatorSelection::All)
    }
}

impl CalculationRequest {
    pub fn new(selection: impl Into<IndicatorSelection>) -> Self {
        Self {
            selection: selection.into(),
            by: Vec::new(),
            include_ci: true,
        }
    }

    #[must_use]
    pub fn with_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_ci(mut self, include_ci: bool) -> Self {
        self.include_ci = include_ci;
        self
    }
}
