//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use ledgerscope_core::{
    engine::DataEngine,
    loader,
    record::{transaction_id, TransactionRecord},
    types::TransactionType,
};

pub const HEADER: &str = "step,type,amount,nameOrig,oldbalanceOrg,newbalanceOrig,nameDest,oldbalanceDest,newbalanceDest,isFraud,isFlaggedFraud";

/// Ten rows covering every type, three days, repeat senders and both flags.
pub const FIXTURE_ROWS: [&str; 10] = [
    "1,PAYMENT,9839.64,C100,170136.0,160296.36,M200,0.0,0.0,0,0",
    "1,PAYMENT,1864.28,C101,21249.0,19384.72,M201,0.0,0.0,0,0",
    "1,TRANSFER,181.0,C102,181.0,0.0,C300,0.0,0.0,1,0",
    "1,CASH_OUT,181.0,C103,181.0,0.0,C301,21182.0,0.0,1,0",
    "2,PAYMENT,11668.14,C100,41554.0,29885.86,M202,0.0,0.0,0,0",
    "2,DEBIT,5337.77,C104,41720.0,36382.23,C302,41898.0,40348.79,0,0",
    "5,CASH_IN,500.0,C101,100.0,600.0,C303,1000.0,500.0,0,0",
    "25,TRANSFER,250000.0,C105,250000.0,0.0,C304,0.0,250000.0,1,1",
    "26,CASH_OUT,100000.0,C100,120000.0,20000.0,C305,5000.0,105000.0,0,1",
    "49,PAYMENT,100.0,C106,1000.0,900.0,M203,0.0,0.0,0,0",
];

pub fn csv_from_rows(rows: &[&str]) -> String {
    let mut out = String::from(HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}

pub fn fixture_csv() -> String {
    csv_from_rows(&FIXTURE_ROWS)
}

/// Route engine logs through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fixture_records() -> Vec<TransactionRecord> {
    init_logging();
    loader::load_from_reader(fixture_csv().as_bytes(), "fixture").expect("fixture loads")
}

pub fn fixture_engine(test_mode: bool) -> DataEngine {
    DataEngine::from_records(fixture_records(), test_mode)
}

/// A hand-built record; balances are consistent, customer is `C{row}`.
pub fn record(
    row: usize,
    txn_type: TransactionType,
    amount: f64,
    is_fraud: bool,
    is_flagged_fraud: bool,
) -> TransactionRecord {
    TransactionRecord {
        id: transaction_id(row),
        step: 1,
        txn_type,
        amount,
        origin_customer: format!("C{row}"),
        origin_balance_before: amount,
        origin_balance_after: 0.0,
        dest_customer: format!("M{row}"),
        dest_balance_before: 0.0,
        dest_balance_after: 0.0,
        is_fraud,
        is_flagged_fraud,
    }
}

pub fn ids(rows: &[TransactionRecord]) -> Vec<&str> {
    rows.iter().map(|r| r.id.as_str()).collect()
}
