//! Startup statistics: overview, amount histogram, by-type and daily
//! groups, all filled by one scan of the table.

use crate::{
    grouping::{GroupedTotals, RunningTotals},
    record::TransactionRecord,
    types::{TransactionType, STEPS_PER_DAY},
};
use serde::Serialize;

// ── Constants ────────────────────────────────────────────────────────────────

/// Lower edges of the amount bins. The last bin is unbounded above.
pub const AMOUNT_BIN_EDGES: [f64; 8] = [
    0.0, 100.0, 500.0, 1_000.0, 5_000.0, 10_000.0, 50_000.0, 100_000.0,
];

pub const AMOUNT_BIN_LABELS: [&str; 8] = [
    "0-100", "100-500", "500-1k", "1k-5k", "5k-10k", "10k-50k", "50k-100k", "100k+",
];

/// Reported as the most common type when the table is empty.
pub const NO_TYPE: &str = "N/A";

// ── Views ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsOverview {
    pub total_transactions: u64,
    pub fraud_rate: f64,
    pub avg_amount: f64,
    pub most_common_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountDistribution {
    pub bins: Vec<String>,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeStats {
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub count: u64,
    pub avg_amount: f64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    pub step_range: String,
    pub transaction_count: u64,
    pub avg_amount: f64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionStats {
    pub overview: StatsOverview,
    pub amount_distribution: AmountDistribution,
    pub by_type: Vec<TypeStats>,
    pub daily: Vec<DailyStats>,
}

// ── Computation ──────────────────────────────────────────────────────────────

impl TransactionStats {
    pub fn compute(rows: &[TransactionRecord]) -> Self {
        let mut all = RunningTotals::default();
        let mut frauds = 0u64;
        let mut histogram = [0u64; AMOUNT_BIN_EDGES.len()];
        let mut by_type: GroupedTotals<TransactionType> = GroupedTotals::new();
        let mut by_day: GroupedTotals<u64> = GroupedTotals::new();
        let mut type_first_seen: Vec<TransactionType> = Vec::new();

        for r in rows {
            all.add(r.amount);
            frauds += u64::from(r.is_fraud);
            histogram[amount_bin(r.amount)] += 1;
            if by_type.get(&r.txn_type).is_none() {
                type_first_seen.push(r.txn_type);
            }
            by_type.add(r.txn_type, r.amount);
            by_day.add(r.step / STEPS_PER_DAY, r.amount);
        }

        let overview = StatsOverview {
            total_transactions: all.count,
            fraud_rate: if all.count == 0 { 0.0 } else { frauds as f64 / all.count as f64 },
            avg_amount: all.mean(),
            most_common_type: most_common_type(&type_first_seen, &by_type),
        };

        let amount_distribution = AmountDistribution {
            bins: AMOUNT_BIN_LABELS.iter().map(|l| l.to_string()).collect(),
            counts: histogram.to_vec(),
        };

        let by_type = by_type
            .iter()
            .map(|(t, totals)| TypeStats {
                txn_type: *t,
                count: totals.count,
                avg_amount: totals.mean(),
                total_amount: totals.sum,
            })
            .collect();

        let daily = by_day
            .iter()
            .map(|(day, totals)| DailyStats {
                step_range: step_range_label(*day),
                transaction_count: totals.count,
                avg_amount: totals.mean(),
                total_amount: totals.sum,
            })
            .collect();

        log::debug!("Computed transaction statistics over {} rows", all.count);

        Self {
            overview,
            amount_distribution,
            by_type,
            daily,
        }
    }
}

/// Index of the half-open bin `[edge_i, edge_{i+1})` holding `amount`.
pub fn amount_bin(amount: f64) -> usize {
    AMOUNT_BIN_EDGES[1..]
        .iter()
        .take_while(|&&edge| amount >= edge)
        .count()
}

/// `"{day*24+1}-{(day+1)*24}"`. The upper end saturates at `u64::MAX`
/// for the last partial day of the step range.
pub fn step_range_label(day: u64) -> String {
    let first = day.saturating_mul(STEPS_PER_DAY).saturating_add(1);
    let last = day.saturating_add(1).saturating_mul(STEPS_PER_DAY);
    format!("{first}-{last}")
}

/// Highest count wins; on a tie the type seen first in the scan wins.
fn most_common_type(
    first_seen: &[TransactionType],
    by_type: &GroupedTotals<TransactionType>,
) -> String {
    let mut best: Option<(TransactionType, u64)> = None;
    for t in first_seen {
        let count = by_type.get(t).map_or(0, |g| g.count);
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((*t, count));
        }
    }
    best.map_or_else(|| NO_TYPE.to_string(), |(t, _)| t.to_string())
}
