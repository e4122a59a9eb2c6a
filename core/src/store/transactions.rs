use super::{Pagination, TransactionFilter, TransactionStore};
use crate::{
    error::{EngineError, EngineResult},
    record::TransactionRecord,
    types::TransactionType,
};
use std::collections::BTreeSet;

impl TransactionStore {
    // ── Listing ───────────────────────────────────────────────────

    /// One page of the filtered rows plus the total number that matched.
    pub fn list_transactions(
        &self,
        page: Pagination,
        filter: &TransactionFilter,
    ) -> EngineResult<(Vec<TransactionRecord>, usize)> {
        page.validate()?;
        let matching: Vec<&TransactionRecord> =
            self.with_live_rows(|rows| rows.filter(|r| filter.matches(r)).collect());
        let total = matching.len();
        let rows = matching[page.window(total)]
            .iter()
            .map(|r| (*r).clone())
            .collect();
        Ok((rows, total))
    }

    pub fn get_by_id(&self, id: &str) -> EngineResult<TransactionRecord> {
        let live = self.live.read();
        live.by_id
            .get(id)
            .map(|&i| self.rows[i].clone())
            .ok_or_else(|| EngineError::TransactionNotFound { id: id.to_string() })
    }

    /// Every live row matching `filter`, in table order. Not paginated.
    pub fn search(&self, filter: &TransactionFilter) -> Vec<TransactionRecord> {
        self.with_live_rows(|rows| rows.filter(|r| filter.matches(r)).cloned().collect())
    }

    pub fn unique_types(&self) -> BTreeSet<TransactionType> {
        self.with_live_rows(|rows| rows.map(|r| r.txn_type).collect())
    }

    /// The `n` live rows with the highest table position, in table order.
    pub fn recent(&self, n: usize) -> Vec<TransactionRecord> {
        let live = self.live.read();
        let start = live.order.len().saturating_sub(n);
        live.order[start..]
            .iter()
            .map(|&i| self.rows[i].clone())
            .collect()
    }

    /// Rows sent (`as_origin`) or received by `customer_id`.
    pub fn transactions_by_customer(
        &self,
        customer_id: &str,
        as_origin: bool,
    ) -> Vec<TransactionRecord> {
        self.with_live_rows(|rows| {
            rows.filter(|r| {
                if as_origin {
                    r.origin_customer == customer_id
                } else {
                    r.dest_customer == customer_id
                }
            })
            .cloned()
            .collect()
        })
    }

    // ── Mutation ──────────────────────────────────────────────────

    /// Remove a row from both live indices. Irreversible.
    /// A failed lookup leaves both indices untouched.
    pub fn delete(&self, id: &str) -> EngineResult<()> {
        let mut live = self.live.write();
        let row = live
            .by_id
            .remove(id)
            .ok_or_else(|| EngineError::TransactionNotFound { id: id.to_string() })?;
        if let Ok(pos) = live.order.binary_search(&row) {
            live.order.remove(pos);
        }
        log::debug!("Deleted transaction {id} (row {row})");
        Ok(())
    }
}
