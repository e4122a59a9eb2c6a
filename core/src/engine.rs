//! The data engine: one immutable snapshot built at startup.
//!
//! STARTUP ORDER (fixed):
//!   1. Loader validates the source and assigns ids
//!   2. Store wraps the table and builds its indices
//!   3. Customer timeline is derived from the table
//!   4. Statistics and fraud aggregates are computed and cached
//!
//! RULES:
//!   - Nothing is reachable before step 4 completes.
//!   - After startup every operation is a read, except `delete`.
//!   - `delete` needs test mode and touches only the store's live indices.
//!     The timeline and cached statistics keep describing the loaded table.

use crate::{
    config::EngineConfig,
    error::{EngineError, EngineResult, LoadError},
    fraud::{self, FraudByType, FraudPrediction, FraudSummary, PredictionRequest},
    loader,
    record::TransactionRecord,
    snapshot::CachedStatistics,
    stats::{AmountDistribution, DailyStats, StatsOverview, TypeStats},
    store::{
        CustomerProfile, Pagination, SearchCriteria, TopCustomer, TransactionFilter,
        TransactionStore,
    },
    timeline::{CustomerTimeline, TimelineEntry},
    types::{CustomerId, TransactionType},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime: String,
    pub dataset_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineMetadata {
    pub version: String,
    pub last_update: DateTime<Utc>,
    pub test_mode: bool,
    pub total_transactions: usize,
}

pub struct DataEngine {
    store: TransactionStore,
    timeline: CustomerTimeline,
    stats: CachedStatistics,
    test_mode: bool,
    started_at: DateTime<Utc>,
    loaded_at: DateTime<Utc>,
}

impl DataEngine {
    /// Load the dataset named by `config` and build the full snapshot.
    /// A `LoadError` here is fatal to startup.
    pub fn load(config: &EngineConfig) -> Result<Self, LoadError> {
        let started_at = Utc::now();
        log::info!(
            "Starting data engine (test mode: {})",
            if config.test_mode { "enabled" } else { "disabled" }
        );
        let records = loader::load(config.dataset_path())?;
        let mut engine = Self::from_records(records, config.test_mode);
        engine.started_at = started_at;
        Ok(engine)
    }

    /// Build the snapshot from already validated records.
    pub fn from_records(records: Vec<TransactionRecord>, test_mode: bool) -> Self {
        let loaded_at = Utc::now();
        let timeline = CustomerTimeline::build(&records);
        let stats = CachedStatistics::compute(&records);
        let store = TransactionStore::new(records);
        if store.is_empty() {
            log::warn!("Data engine ready with an empty dataset");
        } else {
            log::info!("Data engine ready: {} transactions", store.len());
        }
        Self {
            store,
            timeline,
            stats,
            test_mode,
            started_at: loaded_at,
            loaded_at,
        }
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn timeline(&self) -> &CustomerTimeline {
        &self.timeline
    }

    // ── Transactions ──────────────────────────────────────────────

    pub fn list_transactions(
        &self,
        page: Pagination,
        filter: &TransactionFilter,
    ) -> EngineResult<(Vec<TransactionRecord>, usize)> {
        self.store.list_transactions(page, filter)
    }

    pub fn get_transaction(&self, id: &str) -> EngineResult<TransactionRecord> {
        self.store.get_by_id(id)
    }

    /// Validate `criteria` and return every matching row in table order.
    pub fn search(&self, criteria: &SearchCriteria) -> EngineResult<Vec<TransactionRecord>> {
        let filter = criteria.to_filter()?;
        let rows = self.store.search(&filter);
        log::debug!("search {:?} matched {} rows", criteria, rows.len());
        Ok(rows)
    }

    pub fn unique_types(&self) -> BTreeSet<TransactionType> {
        self.store.unique_types()
    }

    pub fn recent(&self, n: usize) -> Vec<TransactionRecord> {
        self.store.recent(n)
    }

    pub fn transactions_by_customer(
        &self,
        customer_id: &str,
        as_origin: bool,
    ) -> Vec<TransactionRecord> {
        self.store.transactions_by_customer(customer_id, as_origin)
    }

    /// Remove a transaction. Test mode only; checked before the lookup.
    pub fn delete(&self, id: &str) -> EngineResult<()> {
        if !self.test_mode {
            log::warn!("Rejected delete of {id}: not in test mode");
            return Err(EngineError::DeleteForbidden);
        }
        self.store.delete(id)?;
        log::info!("Transaction {id} deleted");
        Ok(())
    }

    // ── Customers ─────────────────────────────────────────────────

    pub fn list_customers(&self, page: Pagination) -> EngineResult<(Vec<CustomerId>, usize)> {
        self.store.list_customers(page)
    }

    pub fn customer_stats(&self, customer_id: &str) -> EngineResult<CustomerProfile> {
        self.store.customer_stats(customer_id)
    }

    pub fn top_customers(&self, n: usize) -> Vec<TopCustomer> {
        self.store.top_customers(n)
    }

    pub fn timeline_for(&self, customer_id: &str) -> &[TimelineEntry] {
        self.timeline.timeline_for(customer_id)
    }

    // ── Statistics ────────────────────────────────────────────────

    pub fn cached_statistics(&self) -> &CachedStatistics {
        &self.stats
    }

    pub fn overview(&self) -> &StatsOverview {
        &self.stats.overview
    }

    pub fn amount_distribution(&self) -> &AmountDistribution {
        &self.stats.amount_distribution
    }

    pub fn stats_by_type(&self) -> &[TypeStats] {
        &self.stats.by_type
    }

    pub fn daily_stats(&self) -> &[DailyStats] {
        &self.stats.daily
    }

    // ── Fraud ─────────────────────────────────────────────────────

    pub fn fraud_summary(&self) -> &FraudSummary {
        &self.stats.fraud_summary
    }

    pub fn fraud_by_type(&self) -> &[FraudByType] {
        &self.stats.fraud_by_type
    }

    pub fn predict(&self, request: &PredictionRequest) -> EngineResult<FraudPrediction> {
        request.validate()?;
        Ok(fraud::predict(request, &self.timeline))
    }

    // ── System ────────────────────────────────────────────────────

    pub fn health(&self) -> HealthStatus {
        let elapsed = (Utc::now() - self.started_at).num_seconds().max(0) as u64;
        HealthStatus {
            status: "ok".into(),
            uptime: format_uptime(elapsed),
            dataset_loaded: true,
        }
    }

    pub fn metadata(&self) -> EngineMetadata {
        EngineMetadata {
            version: ENGINE_VERSION.into(),
            last_update: self.loaded_at,
            test_mode: self.test_mode,
            total_transactions: self.store.len(),
        }
    }
}

/// `"{h}h {m}min"`, `"{m}min {s}s"` or `"{s}s"`.
pub fn format_uptime(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}min")
    } else if minutes > 0 {
        format!("{minutes}min {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
