mod common;

use assert_approx_eq::assert_approx_eq;

use common::{tmp_dir, write_non_ts, write_target, write_train_partition, write_ts};
use tsfeat::frame::{column_names, float_values, has_column, require_column, string_values};
use tsfeat::merge::{PartitionKind, PartitionMerger};
use tsfeat::regression::OrdinaryLeastSquares;
use tsfeat::window::mean;

fn merger() -> PartitionMerger<OrdinaryLeastSquares> {
    PartitionMerger::new(OrdinaryLeastSquares::new())
}

#[test]
fn merged_columns_follow_join_order() {
    let root = tmp_dir("merge_columns");
    let dir = write_train_partition(&root, "20130201", 0..20);

    let merged = merger().merge(&dir, PartitionKind::Train).expect("merge");
    assert_eq!(
        column_names(&merged).join(","),
        "id,f0,f1,flag,y,ts_price_std,ts_price_mean_0_5,ts_price_mean_0_20,date"
    );
    assert_eq!(merged.height(), 20);
    assert!(string_values(&merged, "date")
        .unwrap()
        .iter()
        .all(|d| d == "20130201"));
}

#[test]
fn inner_join_drops_identifiers_missing_from_time_series() {
    let root = tmp_dir("merge_inner");
    let dir = root.join("20130201");
    write_non_ts(&dir, "20130201", 0..100);
    write_target(&dir, "20130201", 0..100);
    write_ts(&dir, "ts_price", "20130201", 10..90, 25);

    let merged = merger().merge(&dir, PartitionKind::Train).expect("merge");
    assert_eq!(merged.height(), 80);
    let ids = string_values(&merged, "id").unwrap();
    assert_eq!(ids.first().map(String::as_str), Some("10"));
    assert_eq!(ids.last().map(String::as_str), Some("89"));
}

#[test]
fn features_are_neutralized_against_flag() {
    let root = tmp_dir("merge_neutral");
    let dir = write_train_partition(&root, "20130201", 0..40);

    let merged = merger().merge(&dir, PartitionKind::Train).expect("merge");
    let flag = float_values(&merged, "flag").unwrap();
    assert!(flag.iter().all(|v| (0.0..=1.0).contains(v)));

    for name in ["f0", "f1"] {
        let col = float_values(&merged, name).unwrap();
        let (mc, mf) = (mean(&col), mean(&flag));
        let cov: f64 = col.iter().zip(&flag).map(|(c, f)| (c - mc) * (f - mf)).sum();
        assert_approx_eq!(cov, 0.0, 1e-9);
    }

    // The target is joined raw, not transformed.
    assert_approx_eq!(float_values(&merged, "y").unwrap()[3], 0.3, 1e-12);
}

#[test]
fn last_time_series_table_supplies_the_date() {
    let root = tmp_dir("merge_date");
    let dir = root.join("20130201");
    write_non_ts(&dir, "20130201", 0..10);
    write_target(&dir, "20130201", 0..10);
    write_ts(&dir, "ts_a", "from_a", 0..10, 8);
    write_ts(&dir, "ts_b", "from_b", 0..10, 8);

    let merged = merger().merge(&dir, PartitionKind::Train).expect("merge");
    assert!(has_column(&merged, "ts_a_std"));
    assert!(has_column(&merged, "ts_b_mean_0_20"));
    assert!(string_values(&merged, "date")
        .unwrap()
        .iter()
        .all(|d| d == "from_b"));
}

#[test]
fn partition_without_time_series_has_no_date() {
    let root = tmp_dir("merge_no_ts");
    let dir = root.join("20130201");
    write_non_ts(&dir, "20130201", 0..10);
    write_target(&dir, "20130201", 0..10);

    let merged = merger().merge(&dir, PartitionKind::Train).expect("merge");
    assert_eq!(merged.height(), 10);
    let err = require_column(&merged, "date").unwrap_err();
    assert_eq!(err.to_string(), "missing column: date");
}

#[test]
fn test_partition_has_no_target() {
    let root = tmp_dir("merge_test_kind");
    let dir = root.join("20130301");
    write_non_ts(&dir, "20130301", 0..10);
    write_ts(&dir, "ts_price", "20130301", 0..10, 25);

    let merged = merger().merge(&dir, PartitionKind::Test).expect("merge");
    assert!(!has_column(&merged, "y"));
    assert_eq!(merged.height(), 10);

    // Train merge of the same directory needs y.csv.
    let err = merger().merge(&dir, PartitionKind::Train).unwrap_err();
    assert!(format!("{err:#}").contains("y.csv"));
}

#[test]
fn clipping_is_a_no_op_without_outliers() {
    let root = tmp_dir("merge_clip_plain");
    let dir = write_train_partition(&root, "20130201", 0..30);

    let plain = merger().merge(&dir, PartitionKind::Train).expect("merge");
    let clipped = merger()
        .with_clip_extreme_values(true)
        .merge(&dir, PartitionKind::Train)
        .expect("merge clipped");

    // Synthetic columns stay within three standard deviations.
    assert!(plain.equals_missing(&clipped));
}

#[test]
fn clipping_tames_an_outlier_before_normalizing() {
    let root = tmp_dir("merge_clip_outlier");
    let dir = write_train_partition(&root, "20130201", 0..30);
    let mut non_ts = String::from("id,date,f0,f1,flag\n");
    for i in 0..30 {
        let f0 = if i == 7 { 1000.0 } else { (i % 5) as f64 };
        non_ts.push_str(&format!("{i},20130201,{f0},{},{}\n", i % 3, i % 4));
    }
    std::fs::write(dir.join("non_ts.csv"), non_ts).unwrap();

    let plain = merger().merge(&dir, PartitionKind::Train).expect("merge");
    let clipped = merger()
        .with_clip_extreme_values(true)
        .merge(&dir, PartitionKind::Train)
        .expect("merge clipped");

    let (raw, tamed) = (
        float_values(&plain, "f0").unwrap(),
        float_values(&clipped, "f0").unwrap(),
    );
    assert_ne!(raw, tamed);
    // Columns without outliers are untouched.
    assert_eq!(
        float_values(&plain, "f1").unwrap(),
        float_values(&clipped, "f1").unwrap()
    );
}
