//! Tests for survey design construction, diagnostics and variance.

use polars::df;
use proptest::prelude::*;
use survey_design::{
    DesignError, DesignSpec, LinearizationEstimator, SurveyDesign, VarianceEstimator,
    kish_effective_sample_size,
};

fn clustered() -> SurveyDesign {
    let data = df!(
        "weight" => [1.0f64, 1.0, 2.0, 2.0, 1.0, 3.0],
        "strata" => ["A", "A", "A", "B", "B", "B"],
        "psu" => ["1", "1", "2", "1", "2", "3"],
        "province" => [31i64, 31, 32, 32, 33, 33],
    )
    .unwrap();
    SurveyDesign::construct(
        data,
        DesignSpec::new("weight").with_strata("strata").with_psu("psu"),
    )
    .unwrap()
}

#[test]
fn equal_weights_keep_full_effective_sample_size() {
    let data = df!("w" => [1.0f64; 5]).unwrap();
    let design = SurveyDesign::construct(data, DesignSpec::new("w")).unwrap();
    let summary = design.summary(true).unwrap();
    let stats = summary.stats.unwrap();

    assert_eq!(summary.sample_size, 5);
    assert!((stats.effective_sample_size.unwrap() - 5.0).abs() < 1e-12);
    assert_eq!(stats.cv_weights, Some(0.0));
    assert!((stats.design_effect.unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn missing_weight_is_a_configuration_error() {
    let data = df!("x" => [1.0f64]).unwrap();
    let err = SurveyDesign::construct(data, DesignSpec::new("WEIGHT")).unwrap_err();
    assert!(matches!(err, DesignError::MissingColumn { role: "weight", .. }));
    assert_eq!(err.to_string(), "weight column not found: WEIGHT");
}

#[test]
fn string_weight_is_rejected() {
    let data = df!("w" => ["1", "2"]).unwrap();
    let err = SurveyDesign::construct(data, DesignSpec::new("w")).unwrap_err();
    assert!(matches!(err, DesignError::NonNumericWeight { .. }));
}

#[test]
fn missing_strata_column_is_rejected() {
    let data = df!("w" => [1.0f64]).unwrap();
    let err =
        SurveyDesign::construct(data, DesignSpec::new("w").with_strata("STRATA")).unwrap_err();
    assert!(matches!(err, DesignError::MissingColumn { role: "strata", .. }));
}

#[test]
fn summary_counts_strata_and_psus() {
    let summary = clustered().summary(false).unwrap();
    assert_eq!(summary.n_strata, Some(2));
    assert_eq!(summary.n_psu, Some(5));
    assert!(summary.stats.is_none());

    insta::assert_json_snapshot!(summary, @r#"
    {
      "sample_size": 6,
      "weight_column": "weight",
      "strata_column": "strata",
      "psu_column": "psu",
      "n_strata": 2,
      "n_psu": 5
    }
    "#);
}

#[test]
fn subsetting_returns_a_new_design() {
    let design = clustered();
    let subset = design.subset("province", "33").unwrap();
    assert_eq!(subset.height(), 2);
    assert_eq!(subset.weights(), &[1.0, 3.0]);
    assert_eq!(design.height(), 6);

    let filtered = design.filter(&[true, false, true, false, true, false]).unwrap();
    assert_eq!(filtered.weights(), &[1.0, 2.0, 1.0]);

    let err = design.filter(&[true]).unwrap_err();
    assert!(matches!(err, DesignError::MaskLength { expected: 6, actual: 1 }));
}

#[test]
fn linearized_mean_variance_matches_simple_random_sampling() {
    let values = [2.0, 4.0, 6.0, 8.0];
    let data = df!("w" => [1.0f64; 4]).unwrap();
    let design = SurveyDesign::construct(data, DesignSpec::new("w")).unwrap();
    let variance = LinearizationEstimator::default()
        .ratio_variance(&design, &values, &[1.0; 4])
        .unwrap()
        .unwrap();
    // s^2 / n with s^2 = 20 / 3
    assert!((variance - 20.0 / 3.0 / 4.0).abs() < 1e-12);

    let ci = LinearizationEstimator::default()
        .interval(&design, 5.0, &values, &[1.0; 4])
        .unwrap()
        .unwrap();
    assert!(ci.low < 5.0 && ci.high > 5.0);
    assert!(((ci.low + ci.high) / 2.0 - 5.0).abs() < 1e-12);
}

#[test]
fn zero_denominator_has_no_variance() {
    let data = df!("w" => [1.0f64, 1.0]).unwrap();
    let design = SurveyDesign::construct(data, DesignSpec::new("w")).unwrap();
    let variance = LinearizationEstimator::default()
        .ratio_variance(&design, &[1.0, 1.0], &[0.0, 0.0])
        .unwrap();
    assert_eq!(variance, None);
}

#[test]
fn singleton_strata_contribute_nothing() {
    let data = df!(
        "w" => [1.0f64, 1.0],
        "strata" => ["A", "B"],
    )
    .unwrap();
    let design =
        SurveyDesign::construct(data, DesignSpec::new("w").with_strata("strata")).unwrap();
    let variance = LinearizationEstimator::default()
        .ratio_variance(&design, &[1.0, 5.0], &[1.0, 1.0])
        .unwrap();
    assert_eq!(variance, Some(0.0));
}

proptest! {
    #[test]
    fn kish_is_bounded_by_sample_size(weights in prop::collection::vec(0.01f64..1_000.0, 1..60)) {
        let n_eff = kish_effective_sample_size(&weights).unwrap();
        prop_assert!(n_eff >= 1.0 - 1e-9);
        prop_assert!(n_eff <= weights.len() as f64 + 1e-9);
    }
}
