use super::{Pagination, TransactionStore};
use crate::{
    error::{EngineError, EngineResult},
    grouping::RunningTotals,
    types::{round_to, CustomerId},
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Sender-side view of one customer, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub transactions_count: u64,
    pub avg_amount: f64,
    pub fraudulent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCustomer {
    pub id: CustomerId,
    pub transactions_count: u64,
    pub total_amount: f64,
    pub avg_amount: f64,
}

impl TransactionStore {
    // ── Customers ─────────────────────────────────────────────────

    /// Distinct senders in first-seen order, paginated like transactions.
    pub fn list_customers(&self, page: Pagination) -> EngineResult<(Vec<CustomerId>, usize)> {
        page.validate()?;
        let customers: Vec<&str> = self.with_live_rows(|rows| {
            let mut seen = HashSet::new();
            rows.map(|r| r.origin_customer.as_str())
                .filter(|c| seen.insert(*c))
                .collect()
        });
        let total = customers.len();
        let ids = customers[page.window(total)]
            .iter()
            .map(|c| c.to_string())
            .collect();
        Ok((ids, total))
    }

    pub fn customer_stats(&self, customer_id: &str) -> EngineResult<CustomerProfile> {
        let (totals, fraudulent) = self.with_live_rows(|rows| {
            let mut totals = RunningTotals::default();
            let mut fraudulent = false;
            for r in rows.filter(|r| r.origin_customer == customer_id) {
                totals.add(r.amount);
                fraudulent |= r.is_fraud;
            }
            (totals, fraudulent)
        });
        if totals.count == 0 {
            return Err(EngineError::CustomerNotFound { id: customer_id.to_string() });
        }
        Ok(CustomerProfile {
            id: customer_id.to_string(),
            transactions_count: totals.count,
            avg_amount: round_to(totals.mean(), 2),
            fraudulent,
        })
    }

    /// Senders ranked by total amount sent, largest first. Ties keep
    /// first-seen order.
    pub fn top_customers(&self, n: usize) -> Vec<TopCustomer> {
        let mut ranked: Vec<(&str, RunningTotals)> = self.with_live_rows(|rows| {
            let mut slots: HashMap<&str, usize> = HashMap::new();
            let mut ranked: Vec<(&str, RunningTotals)> = Vec::new();
            for r in rows {
                let slot = *slots.entry(r.origin_customer.as_str()).or_insert_with(|| {
                    ranked.push((r.origin_customer.as_str(), RunningTotals::default()));
                    ranked.len() - 1
                });
                ranked[slot].1.add(r.amount);
            }
            ranked
        });
        // Stable sort: equal totals stay in first-seen order.
        ranked.sort_by(|a, b| b.1.sum.total_cmp(&a.1.sum));
        ranked
            .into_iter()
            .take(n)
            .map(|(id, totals)| TopCustomer {
                id: id.to_string(),
                transactions_count: totals.count,
                total_amount: round_to(totals.sum, 2),
                avg_amount: round_to(totals.mean(), 2),
            })
            .collect()
    }
}
