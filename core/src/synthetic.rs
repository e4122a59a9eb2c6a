//! Synthetic transfer datasets in the upstream column layout.
//!
//! Used for demo data and for tests that need more rows than a hand-written
//! fixture. Output is fully determined by `SyntheticConfig`.

use crate::{
    loader::REQUIRED_COLUMNS,
    record::{transaction_id, TransactionRecord},
    rng::DatasetRng,
    types::{round_to, Step, TransactionType},
};
use std::io::Write;

/// Amount above which the upstream system sets `isFlaggedFraud`.
const FLAG_AMOUNT_THRESHOLD: f64 = 200_000.0;

/// Relative frequency of each type, in `TransactionType::ALL` order.
const TYPE_WEIGHTS: [f64; 5] = [0.22, 0.35, 0.01, 0.34, 0.08];

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub rows: usize,
    /// Size of the sending-customer pool.
    pub customers: u64,
    /// Number of distinct steps the rows are spread over.
    pub steps: Step,
    /// Chance that an eligible (CASH_OUT / TRANSFER) row is fraud.
    pub fraud_rate: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            rows: 1_000,
            customers: 200,
            steps: 72,
            fraud_rate: 0.05,
        }
    }
}

/// Generate `config.rows` records, ids already assigned.
pub fn generate(config: &SyntheticConfig) -> Vec<TransactionRecord> {
    let mut rng = DatasetRng::new(config.seed);
    let customers = config.customers.max(1);
    let counterparties = customers.saturating_mul(5);
    let steps = config.steps.max(1);
    let rows = config.rows.max(1);

    (0..config.rows)
        .map(|i| {
            let step = 1 + (i as u128 * steps as u128 / rows as u128) as Step;
            let txn_type = TransactionType::ALL[rng.weighted_index(&TYPE_WEIGHTS)];
            let origin = account_name('C', 1_000_000_000, rng.next_u64_below(customers));
            let to_merchant = txn_type == TransactionType::Payment;
            let dest = if to_merchant {
                account_name('M', 1_000_000_000, rng.next_u64_below(counterparties))
            } else {
                account_name('C', 2_000_000_000, rng.next_u64_below(counterparties))
            };

            let origin_before = round_to(rng.pareto(100.0, 1.2).min(5_000_000.0), 2);
            let is_fraud = txn_type.is_cash_exit() && rng.chance(config.fraud_rate);
            let amount = if is_fraud {
                // Fraud drains the account.
                origin_before
            } else {
                round_to(rng.pareto(20.0, 1.1).min(10_000_000.0), 2)
            };
            let origin_after = match txn_type {
                TransactionType::CashIn => round_to(origin_before + amount, 2),
                _ => round_to((origin_before - amount).max(0.0), 2),
            };

            let (dest_before, dest_after) = if to_merchant {
                (0.0, 0.0)
            } else {
                let before = round_to(rng.pareto(500.0, 1.3).min(20_000_000.0), 2);
                (before, round_to(before + amount, 2))
            };

            TransactionRecord {
                id: transaction_id(i),
                step,
                txn_type,
                amount,
                origin_customer: origin,
                origin_balance_before: origin_before,
                origin_balance_after: origin_after,
                dest_customer: dest,
                dest_balance_before: dest_before,
                dest_balance_after: dest_after,
                is_fraud,
                is_flagged_fraud: is_fraud
                    && txn_type == TransactionType::Transfer
                    && amount > FLAG_AMOUNT_THRESHOLD,
            }
        })
        .collect()
}

fn account_name(prefix: char, base: u64, offset: u64) -> String {
    format!("{prefix}{}", base.saturating_add(offset))
}

/// Write records in the upstream layout (no `id` column).
pub fn write_csv<W: Write>(records: &[TransactionRecord], writer: W) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(REQUIRED_COLUMNS)?;
    for r in records {
        out.write_record([
            r.step.to_string(),
            r.txn_type.to_string(),
            r.amount.to_string(),
            r.origin_customer.clone(),
            r.origin_balance_before.to_string(),
            r.origin_balance_after.to_string(),
            r.dest_customer.clone(),
            r.dest_balance_before.to_string(),
            r.dest_balance_after.to_string(),
            u8::from(r.is_fraud).to_string(),
            u8::from(r.is_flagged_fraud).to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}
