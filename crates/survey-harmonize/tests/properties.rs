//! Property tests: row counts, determinism and idempotence of harmonization.

use polars::prelude::{Column, DataFrame};
use proptest::prelude::*;
use survey_harmonize::{HarmonizeOptions, Harmonizer, LaborForceOptions, create_labor_force_indicators};

fn frame(rows: &[(Option<i64>, Option<i64>, Option<i64>, Option<i64>)]) -> DataFrame {
    DataFrame::new(vec![
        Column::new("DEM_AGE".into(), rows.iter().map(|r| r.0).collect::<Vec<_>>()),
        Column::new("DEM_SEX".into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
        Column::new("JENISKEGIA".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
        Column::new("B1R5".into(), rows.iter().map(|r| r.3).collect::<Vec<_>>()),
    ])
    .unwrap()
}

fn rows() -> impl Strategy<Value = Vec<(Option<i64>, Option<i64>, Option<i64>, Option<i64>)>> {
    prop::collection::vec(
        (
            prop::option::of(0i64..90),
            prop::option::of(0i64..4),
            prop::option::of(0i64..8),
            prop::option::of(0i64..4),
        ),
        0..40,
    )
}

proptest! {
    #[test]
    fn harmonize_preserves_row_count(rows in rows(), wave in prop::sample::select(vec!["2023", "2025-02", "1999"])) {
        let df = frame(&rows);
        let harmonizer = Harmonizer::new("sakernas", None);
        let (out, _) = harmonizer.harmonize(&df, wave, &HarmonizeOptions::default()).unwrap();
        prop_assert_eq!(out.height(), df.height());

        let derived = create_labor_force_indicators(&out, &LaborForceOptions::default()).unwrap();
        prop_assert_eq!(derived.height(), df.height());
    }

    #[test]
    fn harmonize_is_deterministic(rows in rows()) {
        let df = frame(&rows);
        let harmonizer = Harmonizer::new("sakernas", None);
        let options = HarmonizeOptions::default();
        let (first, first_log) = harmonizer.harmonize(&df, "2025-02", &options).unwrap();
        let (second, second_log) = harmonizer.harmonize(&df, "2025-02", &options).unwrap();
        prop_assert!(first.equals_missing(&second));
        prop_assert_eq!(first_log, second_log);
    }

    #[test]
    fn relabeling_is_idempotent(rows in rows()) {
        let df = frame(&rows);
        let harmonizer = Harmonizer::new("sakernas", None);
        let options = HarmonizeOptions::default();
        let (once, _) = harmonizer.harmonize(&df, "2023", &options).unwrap();
        let (twice, _) = harmonizer.harmonize(&once, "2023", &options).unwrap();
        prop_assert!(once.equals_missing(&twice));
    }
}
