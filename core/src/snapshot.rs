//! Cached statistics: every startup aggregate in one immutable value.
//!
//! Computed once, right after load, and never recomputed for the life of
//! the process. Test-mode deletes are not reflected here.

use crate::{
    fraud::{FraudByType, FraudStats, FraudSummary},
    record::TransactionRecord,
    stats::{AmountDistribution, DailyStats, StatsOverview, TransactionStats, TypeStats},
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedStatistics {
    pub overview: StatsOverview,
    pub amount_distribution: AmountDistribution,
    pub by_type: Vec<TypeStats>,
    pub daily: Vec<DailyStats>,
    pub fraud_summary: FraudSummary,
    pub fraud_by_type: Vec<FraudByType>,
}

impl CachedStatistics {
    pub fn compute(rows: &[TransactionRecord]) -> Self {
        log::info!("Precomputing statistics...");
        let TransactionStats {
            overview,
            amount_distribution,
            by_type,
            daily,
        } = TransactionStats::compute(rows);
        let FraudStats {
            fraud_summary,
            fraud_by_type,
        } = FraudStats::compute(rows);
        log::info!("Statistics precomputed and cached");
        Self {
            overview,
            amount_distribution,
            by_type,
            daily,
            fraud_summary,
            fraud_by_type,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
