//! In-memory transaction store.
//!
//! RULE: the row table is immutable after load. Only the two live indices
//! (primary key and order-preserving sequence) change, and only through
//! `delete`. Readers share the lock; `delete` is the single writer.
//!
//! Row references (`RowRef`) index into the immutable table and stay valid
//! for the life of the process, including after a row is deleted.

mod customers;
mod filter;
mod transactions;

pub use customers::{CustomerProfile, TopCustomer};
pub use filter::{Pagination, SearchCriteria, TransactionFilter};

use crate::{
    record::TransactionRecord,
    types::{RowRef, TxnId},
};
use parking_lot::RwLock;
use std::collections::HashMap;

pub struct TransactionStore {
    rows: Vec<TransactionRecord>,
    live: RwLock<LiveIndex>,
}

/// Rows still visible to queries.
struct LiveIndex {
    by_id: HashMap<TxnId, RowRef>,
    /// Ascending row references, i.e. table order.
    order: Vec<RowRef>,
}

impl TransactionStore {
    /// Wrap a validated table and build both indices eagerly.
    pub fn new(rows: Vec<TransactionRecord>) -> Self {
        let by_id = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        let order = (0..rows.len()).collect();
        log::info!("Initialized store with {} transactions", rows.len());
        Self {
            rows,
            live: RwLock::new(LiveIndex { by_id, order }),
        }
    }

    /// Number of live rows.
    pub fn len(&self) -> usize {
        self.live.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` over the live rows in table order, holding the read lock.
    fn with_live_rows<'s, T>(
        &'s self,
        f: impl FnOnce(&mut dyn Iterator<Item = &'s TransactionRecord>) -> T,
    ) -> T {
        let live = self.live.read();
        let mut iter = live.order.iter().map(|&i| &self.rows[i]);
        f(&mut iter)
    }
}
