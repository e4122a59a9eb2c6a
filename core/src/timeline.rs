//! Per-customer, step-ordered index of outgoing transactions.
//!
//! Built once after load. Rows removed later by a test-mode delete stay in
//! the index; only the rapid-activity fraud rule reads it.

use crate::{
    record::TransactionRecord,
    types::{CustomerId, RowRef, Step},
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub step: Step,
    pub row: RowRef,
}

#[derive(Debug, Default)]
pub struct CustomerTimeline {
    by_customer: HashMap<CustomerId, Vec<TimelineEntry>>,
}

impl CustomerTimeline {
    pub fn build(rows: &[TransactionRecord]) -> Self {
        let mut by_customer: HashMap<CustomerId, Vec<TimelineEntry>> = HashMap::new();
        for (row, r) in rows.iter().enumerate() {
            by_customer
                .entry(r.origin_customer.clone())
                .or_default()
                .push(TimelineEntry { step: r.step, row });
        }
        // sort_by_key is stable: equal steps keep table order.
        for entries in by_customer.values_mut() {
            entries.sort_by_key(|e| e.step);
        }
        log::info!("Built timeline for {} customers", by_customer.len());
        Self { by_customer }
    }

    /// Entries for `customer_id`, empty if the customer never sent anything.
    pub fn timeline_for(&self, customer_id: &str) -> &[TimelineEntry] {
        self.by_customer
            .get(customer_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn customer_count(&self) -> usize {
        self.by_customer.len()
    }
}
