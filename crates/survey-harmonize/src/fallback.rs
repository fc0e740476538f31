//! Built-in rule tables used when no configured rule claims a canonical name.

use std::collections::BTreeMap;

use survey_model::{ALL_WAVES, ValueLabels, VariableMapping};

const SAKERNAS_ANNUAL: &[&str] = &["2021", "2022", "2023", "2024", "2025"];
/// August 2024 keeps the annual field names; work status is derived separately.
const SAKERNAS_AUGUST_2024: &str = "2024-08";
const SUSENAS_MARCH: &[&str] = &["2022-03", "2023-03", "2024-03"];

/// Fallback rules for a dataset type; empty for unknown types.
pub fn fallback_rules(dataset: &str) -> BTreeMap<String, VariableMapping> {
    let rules = match dataset {
        "sakernas" => sakernas_rules(),
        "susenas" => susenas_rules(),
        _ => Vec::new(),
    };
    rules
        .into_iter()
        .map(|rule| (rule.standard_name.clone(), rule))
        .collect()
}

fn across(mut rule: VariableMapping, waves: &[&str], raw_name: &str) -> VariableMapping {
    for wave in waves {
        rule = rule.with_wave(*wave, raw_name);
    }
    rule
}

fn labels(entries: &[(&str, &str)]) -> ValueLabels {
    entries.iter().copied().collect()
}

fn sakernas_rules() -> Vec<VariableMapping> {
    vec![
        across(
            VariableMapping::new("province_code", "Province code (2-digit)"),
            &SAKERNAS_ANNUAL[..4],
            "PROV",
        )
        .with_wave(SAKERNAS_AUGUST_2024, "PROV")
        .with_wave("2025", "kode_prov")
        .with_wave("2025-02", "KODE_PROV"),
        across(
            VariableMapping::new("urban_rural", "Urban/Rural classification"),
            SAKERNAS_ANNUAL,
            "B1R5",
        )
        .with_wave(SAKERNAS_AUGUST_2024, "B1R5")
        .with_values(ALL_WAVES, labels(&[("1", "Urban"), ("2", "Rural")])),
        across(
            VariableMapping::new("age", "Age in completed years"),
            &SAKERNAS_ANNUAL[..4],
            "B4K5",
        )
        .with_wave(SAKERNAS_AUGUST_2024, "B4K5")
        .with_wave("2025", "dem_age")
        .with_wave("2025-02", "DEM_AGE"),
        across(VariableMapping::new("gender", "Gender"), &SAKERNAS_ANNUAL[..4], "B4K4")
            .with_wave(SAKERNAS_AUGUST_2024, "B4K4")
            .with_wave("2025", "dem_sex")
            .with_wave("2025-02", "DEM_SEX")
            .with_values(ALL_WAVES, labels(&[("1", "Male"), ("2", "Female")])),
        across(
            VariableMapping::new("education_level", "Highest education level completed"),
            &SAKERNAS_ANNUAL[..4],
            "B4K8",
        )
        .with_wave(SAKERNAS_AUGUST_2024, "B4K8")
        .with_values(
            ALL_WAVES,
            labels(&[
                ("1", "No Education"),
                ("2", "Elementary (not completed)"),
                ("3", "Elementary"),
                ("4", "Junior High"),
                ("5", "Senior High"),
                ("6", "Academy/Diploma"),
                ("7", "University"),
            ]),
        ),
        across(
            VariableMapping::new("work_status", "Work status in reference week"),
            SAKERNAS_ANNUAL,
            "B5R1",
        )
        .with_wave("2025-02", "JENISKEGIA")
        .with_values(ALL_WAVES, labels(&[("1", "Working"), ("2", "Not Working")]))
        .with_values(
            "2025-02",
            labels(&[
                ("1", "Working"),
                ("2", "Looking for work"),
                ("3", "Not Working"),
                ("4", "Not Working"),
                ("5", "Not Working"),
                ("6", "Not Working"),
            ]),
        ),
        across(
            VariableMapping::new("hours_worked", "Total hours worked in reference week"),
            SAKERNAS_ANNUAL,
            "B5R28",
        )
        .with_wave(SAKERNAS_AUGUST_2024, "B5R28")
        .with_wave("2025-02", "WKT_JML_U"),
        across(
            VariableMapping::new("survey_weight", "Survey sampling weight"),
            SAKERNAS_ANNUAL,
            "WEIGHT",
        )
        .with_wave(SAKERNAS_AUGUST_2024, "WEIGHT"),
    ]
}

fn susenas_rules() -> Vec<VariableMapping> {
    vec![
        across(
            VariableMapping::new("province_code", "Province code (2-digit)"),
            SUSENAS_MARCH,
            "R101",
        ),
        across(
            VariableMapping::new("urban_rural", "Urban/Rural classification"),
            SUSENAS_MARCH,
            "R105",
        )
        .with_values(ALL_WAVES, labels(&[("1", "Urban"), ("2", "Rural")])),
        across(
            VariableMapping::new("household_size", "Number of household members"),
            SUSENAS_MARCH,
            "R301",
        ),
        across(
            VariableMapping::new("survey_weight", "Household sampling weight"),
            SUSENAS_MARCH,
            "WERT",
        ),
        across(
            VariableMapping::new(
                "per_capita_expenditure",
                "Monthly per-capita household expenditure",
            ),
            SUSENAS_MARCH,
            "KAPITA",
        ),
        across(VariableMapping::new("strata", "Sampling stratum"), SUSENAS_MARCH, "STRATA"),
        across(VariableMapping::new("psu", "Primary sampling unit"), SUSENAS_MARCH, "PSU"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sakernas_table_covers_core_variables() {
        let rules = fallback_rules("sakernas");
        assert_eq!(rules["age"].raw_name_for("2023"), Some("B4K5"));
        assert_eq!(rules["age"].raw_name_for("2025-02"), Some("DEM_AGE"));
        assert_eq!(rules["province_code"].raw_name_for("2025"), Some("kode_prov"));
        assert!(rules["education_level"].raw_name_for("2025-02").is_none());
        assert_eq!(rules["gender"].raw_name_for("2024-08"), Some("B4K4"));
        assert_eq!(rules["hours_worked"].raw_name_for("2024-08"), Some("B5R28"));
        assert!(rules["work_status"].raw_name_for("2024-08").is_none());
        let work = rules["work_status"].labels_for("2025-02").unwrap();
        assert_eq!(work.code_for_label("Looking for work"), Some(2));
    }

    #[test]
    fn susenas_and_unknown_types() {
        let rules = fallback_rules("susenas");
        assert_eq!(rules["per_capita_expenditure"].raw_name_for("2024-03"), Some("KAPITA"));
        assert_eq!(rules.len(), 7);
        assert!(fallback_rules("podes").is_empty());
    }
}
