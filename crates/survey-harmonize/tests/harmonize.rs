//! Tests for the harmonization engine.

use polars::df;
use polars::prelude::{DataFrame, DataType};
use survey_common::{column_values, f64_column};
use survey_config::{BaseDocument, ConfigStore, WaveDocument};
use survey_harmonize::{HarmonizeOptions, Harmonizer, LabelSource};

fn render(map: &std::collections::BTreeMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{k} -> {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn february_2025() -> DataFrame {
    df!(
        "KODE_PROV" => [31i64, 32, 33],
        "DEM_AGE" => [25i64, 40, 16],
        "DEM_SEX" => [1i64, 2, 1],
        "JENISKEGIA" => [1i64, 2, 3],
        "WKT_JML_U" => [40.0f64, 0.0, 0.0],
        "EXTRA" => ["a", "b", "c"],
    )
    .unwrap()
}

fn store() -> ConfigStore {
    let base: BaseDocument = toml::from_str(
        r#"
        dataset = "sakernas"

        [codelists.urban_rural]
        1 = "Perkotaan"
        2 = "Perdesaan"

        [fields.KLASIFIKAS]
        canon_name = "urban_rural"
        codelist = "urban_rural"
        "#,
    )
    .unwrap();
    let wave: WaveDocument = toml::from_str(
        r#"
        dataset = "sakernas"
        wave = "2025-02"

        [overrides.DEM_SKLH]
        canon_name = "school_participation"
        label = "School participation"
        value_labels = { 1 = "Tidak/belum pernah sekolah", 2 = "Masih sekolah", 3 = "Tidak sekolah lagi" }
        "#,
    )
    .unwrap();
    let derived: WaveDocument = toml::from_str(
        r#"
        dataset = "sakernas"
        wave = "2023-08"

        [[derive]]
        kind = "work_status_from_flags"
        worked = "WORKED"
        seeking = "SEEKING"
        "#,
    )
    .unwrap();
    ConfigStore::from_documents(base, vec![wave, derived]).unwrap()
}

#[test]
fn renames_and_labels_with_fallback_rules() {
    let harmonizer = Harmonizer::new("sakernas", None);
    let (out, log) = harmonizer
        .harmonize(&february_2025(), "2025-02", &HarmonizeOptions::default())
        .unwrap();

    assert_eq!(out.height(), 3);
    assert!(out.column("EXTRA").is_ok());
    assert_eq!(f64_column(&out, "age").unwrap(), vec![Some(25.0), Some(40.0), Some(16.0)]);
    assert_eq!(
        column_values(&out, "work_status").unwrap(),
        vec![
            Some("Working".to_string()),
            Some("Looking for work".to_string()),
            Some("Not Working".to_string()),
        ]
    );
    insta::assert_snapshot!(render(&log.to_flat_map()), @r"
    DEM_AGE -> age
    DEM_SEX -> gender
    JENISKEGIA -> work_status
    KODE_PROV -> province_code
    WKT_JML_U -> hours_worked
    gender_labels -> applied
    work_status_labels -> applied
    ");
}

#[test]
fn unmapped_codes_become_null_and_are_counted() {
    let frame = df!("DEM_SEX" => [Some(1i64), Some(9), None]).unwrap();
    let harmonizer = Harmonizer::new("sakernas", None);
    let (out, log) = harmonizer
        .harmonize(&frame, "2025-02", &HarmonizeOptions::default())
        .unwrap();

    assert_eq!(
        column_values(&out, "gender").unwrap(),
        vec![Some("Male".to_string()), None, None]
    );
    assert_eq!(log.unmapped().get("gender"), Some(&1));
    assert_eq!(log.labels["gender"].mapped, 1);
}

#[test]
fn column_matching_is_case_insensitive() {
    let frame = df!("dem_age" => [30i64], "Dem_Sex" => [2i64]).unwrap();
    let harmonizer = Harmonizer::new("sakernas", None);
    let (out, log) = harmonizer
        .harmonize(&frame, "2025-02", &HarmonizeOptions::default())
        .unwrap();
    assert_eq!(log.renames["dem_age"], "age");
    assert_eq!(log.renames["Dem_Sex"], "gender");
    assert_eq!(column_values(&out, "gender").unwrap(), vec![Some("Female".to_string())]);
}

#[test]
fn first_casing_wins_for_duplicate_columns() {
    let frame = df!("DEM_AGE" => [30i64], "dem_age" => [99i64]).unwrap();
    let harmonizer = Harmonizer::new("sakernas", None);
    let (out, log) = harmonizer
        .harmonize(&frame, "2025-02", &HarmonizeOptions::default())
        .unwrap();
    assert_eq!(log.renames["DEM_AGE"], "age");
    assert_eq!(f64_column(&out, "age").unwrap(), vec![Some(30.0)]);
    assert!(out.column("dem_age").is_ok());
}

#[test]
fn preserve_switches() {
    let harmonizer = Harmonizer::new("sakernas", None);

    let options = HarmonizeOptions::default().with_preserve_original_names(true);
    let (out, log) = harmonizer.harmonize(&february_2025(), "2025-02", &options).unwrap();
    assert!(log.renames.is_empty());
    assert_eq!(
        column_values(&out, "DEM_SEX").unwrap()[0].as_deref(),
        Some("Male")
    );

    let options = HarmonizeOptions::default().with_preserve_labels(true);
    let (out, log) = harmonizer.harmonize(&february_2025(), "2025-02", &options).unwrap();
    assert!(log.labels.is_empty());
    assert_eq!(out.column("gender").unwrap().dtype(), &DataType::Int64);
}

#[test]
fn target_variables_restrict_mapping() {
    let harmonizer = Harmonizer::new("sakernas", None);
    let options = HarmonizeOptions::default().with_target_variables(["age", "not_a_variable"]);
    let (out, log) = harmonizer.harmonize(&february_2025(), "2025-02", &options).unwrap();
    assert_eq!(log.renames.len(), 1);
    assert!(out.column("DEM_SEX").is_ok());
}

#[test]
fn occupied_canonical_name_blocks_rename() {
    let frame = df!("age" => [1i64], "DEM_AGE" => [30i64]).unwrap();
    let harmonizer = Harmonizer::new("sakernas", None);
    let (out, log) = harmonizer
        .harmonize(&frame, "2025-02", &HarmonizeOptions::default())
        .unwrap();
    assert!(log.renames.is_empty());
    assert_eq!(f64_column(&out, "age").unwrap(), vec![Some(1.0)]);
    assert!(out.column("DEM_AGE").is_ok());
}

#[test]
fn config_sweep_labels_fields_outside_rule_table() {
    let frame = df!(
        "DEM_AGE" => [30i64, 12],
        "DEM_SKLH" => [3i64, 2],
        "KLASIFIKAS" => [1i64, 2],
    )
    .unwrap();
    let store = store();
    let harmonizer = Harmonizer::new("sakernas", Some(&store));
    let options = HarmonizeOptions::default().with_target_variables(["age"]);
    let (out, log) = harmonizer.harmonize(&frame, "2025-02", &options).unwrap();

    assert_eq!(log.labels["DEM_SKLH"].source, LabelSource::WaveOverride);
    assert_eq!(log.labels["KLASIFIKAS"].source, LabelSource::BaseConfig);
    assert_eq!(
        column_values(&out, "KLASIFIKAS").unwrap(),
        vec![Some("Perkotaan".to_string()), Some("Perdesaan".to_string())]
    );
    insta::assert_snapshot!(render(&log.to_flat_map()), @r"
    DEM_AGE -> age
    DEM_SKLH_labels -> applied_from_wave
    KLASIFIKAS_labels -> applied_from_base
    ");
}

#[test]
fn configured_rules_rename_override_fields() {
    let frame = df!("DEM_SKLH" => [2i64]).unwrap();
    let store = store();
    let harmonizer = Harmonizer::new("sakernas", Some(&store));
    let (out, log) = harmonizer
        .harmonize(&frame, "2025-02", &HarmonizeOptions::default())
        .unwrap();
    assert_eq!(log.renames["DEM_SKLH"], "school_participation");
    assert_eq!(log.labels["school_participation"].source, LabelSource::RuleTable);
    assert_eq!(
        column_values(&out, "school_participation").unwrap(),
        vec![Some("Masih sekolah".to_string())]
    );
}

#[test]
fn builtin_structural_exception_for_august_2024() {
    let frame = df!(
        "B5R1" => [1i64, 2, 2],
        "B5R25" => [2i64, 1, 2],
        "B5R2" => [2i64, 2, 2],
    )
    .unwrap();
    let harmonizer = Harmonizer::new("sakernas", None);
    let (out, log) = harmonizer
        .harmonize(&frame, "2024-08", &HarmonizeOptions::default())
        .unwrap();

    assert_eq!(
        column_values(&out, "work_status").unwrap(),
        vec![
            Some("Working".to_string()),
            Some("Looking for work".to_string()),
            Some("Not Working".to_string()),
        ]
    );
    assert_eq!(log.derived[0].name, "work_status");
    assert_eq!(log.labels["work_status"].source, LabelSource::Derived);
    assert_eq!(out.height(), 3);
}

#[test]
fn configured_structural_exception() {
    let frame = df!("WORKED" => ["Tidak", "Ya"], "SEEKING" => ["Ya", "Tidak"]).unwrap();
    let store = store();
    let harmonizer = Harmonizer::new("sakernas", Some(&store));
    let (out, log) = harmonizer
        .harmonize(&frame, "2023-08", &HarmonizeOptions::default())
        .unwrap();
    assert_eq!(
        column_values(&out, "work_status").unwrap(),
        vec![Some("Looking for work".to_string()), Some("Working".to_string())]
    );
    assert_eq!(log.to_flat_map()["work_status_derived"], "WORKED+SEEKING");
}

#[test]
fn second_pass_leaves_labels_unchanged() {
    let frame = df!(
        "DEM_SEX" => [1i64, 2],
        "JENISKEGIA" => [1i64, 2],
        "KLASIFIKAS" => [2i64, 1],
    )
    .unwrap();
    let store = store();
    let harmonizer = Harmonizer::new("sakernas", Some(&store));
    let options = HarmonizeOptions::default();
    let (first, _) = harmonizer.harmonize(&frame, "2025-02", &options).unwrap();
    let (second, log) = harmonizer.harmonize(&first, "2025-02", &options).unwrap();

    assert!(first.equals_missing(&second));
    assert!(log.renames.is_empty());
    assert_eq!(log.labels["KLASIFIKAS"].already_labeled, 2);
}

#[test]
fn validation_report() {
    let harmonizer = Harmonizer::new("sakernas", None);
    let original = february_2025();
    let (out, _) = harmonizer
        .harmonize(&original, "2025-02", &HarmonizeOptions::default())
        .unwrap();

    let report = harmonizer.validate_harmonization(&original, &out, "2025-02");
    assert!(report.validation_passed);
    assert_eq!(report.variables_mapped.len(), 5);
    assert_eq!(report.value_mappings_applied, vec!["gender", "work_status"]);

    let dropped = out.drop("age").unwrap();
    let report = harmonizer.validate_harmonization(&original, &dropped, "2025-02");
    assert!(!report.validation_passed);
    assert_eq!(report.missing_variables, vec!["age"]);

    let truncated = out.head(Some(1));
    let report = harmonizer.validate_harmonization(&original, &truncated, "2025-02");
    assert!(!report.validation_passed);
    assert!(report.error.is_some());
}

#[test]
fn lists_available_variables() {
    let harmonizer = Harmonizer::new("sakernas", None);
    let available = harmonizer.available_variables("2025-02");
    assert!(available.contains(&(
        "age".to_string(),
        "DEM_AGE".to_string(),
        "Age in completed years".to_string()
    )));
    assert!(available.iter().all(|(name, _, _)| name != "urban_rural"));
}
