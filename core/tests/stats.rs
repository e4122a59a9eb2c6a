//! Startup statistics: overview, histogram, by-type and daily groups.

mod common;

use common::{csv_from_rows, fixture_engine, record};
use ledgerscope_core::{
    engine::DataEngine,
    loader,
    snapshot::CachedStatistics,
    stats::{amount_bin, step_range_label, TransactionStats, AMOUNT_BIN_LABELS, NO_TYPE},
    types::TransactionType,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn overview_over_the_fixture() {
    let engine = fixture_engine(false);
    let o = engine.overview();
    assert_eq!(o.total_transactions, 10);
    assert_eq!(o.fraud_rate, 0.3);
    assert!(close(o.avg_amount, 37967.183), "avg {}", o.avg_amount);
    assert_eq!(o.most_common_type, "PAYMENT");
}

#[test]
fn most_common_type_tie_goes_to_first_seen() {
    let rows = vec![
        record(0, TransactionType::Transfer, 10.0, false, false),
        record(1, TransactionType::CashIn, 10.0, false, false),
        record(2, TransactionType::CashIn, 10.0, false, false),
        record(3, TransactionType::Transfer, 10.0, false, false),
    ];
    let stats = TransactionStats::compute(&rows);
    assert_eq!(stats.overview.most_common_type, "TRANSFER");
}

#[test]
fn empty_table_has_zeroed_statistics() {
    let stats = CachedStatistics::compute(&[]);
    assert_eq!(stats.overview.total_transactions, 0);
    assert_eq!(stats.overview.fraud_rate, 0.0);
    assert_eq!(stats.overview.avg_amount, 0.0);
    assert_eq!(stats.overview.most_common_type, NO_TYPE);
    assert_eq!(stats.amount_distribution.counts, vec![0; 8]);
    assert!(stats.by_type.is_empty());
    assert!(stats.daily.is_empty());
    assert_eq!(stats.fraud_summary.precision, 0.0);
    assert_eq!(stats.fraud_summary.recall, 0.0);
    assert!(stats.fraud_by_type.is_empty());
}

#[test]
fn histogram_bins_are_half_open() {
    let engine = fixture_engine(false);
    let dist = engine.amount_distribution();
    assert_eq!(dist.bins, AMOUNT_BIN_LABELS.to_vec());
    assert_eq!(dist.counts, vec![0, 3, 1, 1, 2, 1, 0, 2]);
    assert_eq!(dist.counts.iter().sum::<u64>(), 10);

    assert_eq!(amount_bin(0.0), 0);
    assert_eq!(amount_bin(99.99), 0);
    assert_eq!(amount_bin(100.0), 1);
    assert_eq!(amount_bin(499.99), 1);
    assert_eq!(amount_bin(500.0), 2);
    assert_eq!(amount_bin(99_999.99), 6);
    assert_eq!(amount_bin(100_000.0), 7);
    assert_eq!(amount_bin(9e12), 7);
}

#[test]
fn by_type_groups_in_type_order() {
    let engine = fixture_engine(false);
    let by_type = engine.stats_by_type();
    let types: Vec<TransactionType> = by_type.iter().map(|t| t.txn_type).collect();
    assert_eq!(types, TransactionType::ALL.to_vec());

    let counts: Vec<u64> = by_type.iter().map(|t| t.count).collect();
    assert_eq!(counts, vec![1, 2, 1, 4, 2]);
    assert_eq!(by_type.iter().map(|t| t.count).sum::<u64>(), 10);

    let payment = &by_type[3];
    assert!(close(payment.total_amount, 23472.06));
    assert!(close(payment.avg_amount, 5868.015));
    let transfer = &by_type[4];
    assert!(close(transfer.total_amount, 250181.0));
    assert!(close(transfer.avg_amount, 125090.5));
}

#[test]
fn daily_groups_by_day_index() {
    let engine = fixture_engine(false);
    let daily = engine.daily_stats();
    let labels: Vec<&str> = daily.iter().map(|d| d.step_range.as_str()).collect();
    assert_eq!(labels, vec!["1-24", "25-48", "49-72"]);

    let counts: Vec<u64> = daily.iter().map(|d| d.transaction_count).collect();
    assert_eq!(counts, vec![7, 2, 1]);

    assert!(close(daily[1].total_amount, 350000.0));
    assert!(close(daily[1].avg_amount, 175000.0));
    assert!(close(daily[2].total_amount, 100.0));
}

#[test]
fn step_range_labels() {
    assert_eq!(step_range_label(0), "1-24");
    assert_eq!(step_range_label(1), "25-48");
    assert_eq!(step_range_label(29), "697-720");
}

#[test]
fn last_day_of_the_step_range_gets_a_saturated_label() {
    assert_eq!(
        step_range_label(u64::MAX / 24),
        "18446744073709551601-18446744073709551615"
    );

    let csv = csv_from_rows(&[
        "1,PAYMENT,10,C1,10,0,M1,0,0,0,0",
        "18446744073709551610,PAYMENT,10,C2,10,0,M2,0,0,0,0",
    ]);
    let records = loader::load_from_reader(csv.as_bytes(), "huge-step").unwrap();
    let engine = DataEngine::from_records(records, false);
    let labels: Vec<&str> = engine
        .daily_stats()
        .iter()
        .map(|d| d.step_range.as_str())
        .collect();
    assert_eq!(labels, vec!["1-24", "18446744073709551601-18446744073709551615"]);
}

#[test]
fn cached_statistics_serialize_with_wire_names() {
    let engine = fixture_engine(false);
    let json: serde_json::Value =
        serde_json::from_str(&engine.cached_statistics().to_json().unwrap()).unwrap();
    assert_eq!(json["overview"]["most_common_type"], "PAYMENT");
    assert_eq!(json["by_type"][0]["type"], "CASH_IN");
    assert_eq!(json["fraud_by_type"][4]["type"], "TRANSFER");
    assert_eq!(json["amount_distribution"]["bins"][7], "100k+");
}
