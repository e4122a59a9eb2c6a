//! Single-pass grouping: running totals keyed by group, filled while the
//! table is scanned once. No intermediate copies of the table are made.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningTotals {
    pub count: u64,
    pub sum: f64,
}

impl RunningTotals {
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Arithmetic mean, 0.0 for an empty group.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Group key -> running totals, iterated in ascending key order.
#[derive(Debug, Clone)]
pub struct GroupedTotals<K: Ord> {
    groups: BTreeMap<K, RunningTotals>,
}

impl<K: Ord> Default for GroupedTotals<K> {
    fn default() -> Self {
        Self { groups: BTreeMap::new() }
    }
}

impl<K: Ord> GroupedTotals<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K, value: f64) {
        self.groups.entry(key).or_default().add(value);
    }

    pub fn get(&self, key: &K) -> Option<&RunningTotals> {
        self.groups.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &RunningTotals)> {
        self.groups.iter()
    }
}
