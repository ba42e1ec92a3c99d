//! The multiset of selected stamps.

use crate::model::{Amount, Catalog};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Maps a denomination id to how many of that stamp have been selected.
///
/// Every id present has a count of at least one. Taking the last stamp of a denomination removes
/// the id entirely, so there are never zero-count entries.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    counts: BTreeMap<String, u64>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one stamp of `id`. Ids that are not in the catalog are accepted; they simply have no
    /// value when the total is computed.
    pub fn add(&mut self, id: &str) {
        self.add_n(id, 1);
    }

    /// Adds `n` stamps of `id` at once. The count saturates at `u64::MAX`; adding zero does
    /// nothing.
    pub fn add_n(&mut self, id: &str, n: u64) {
        if n == 0 {
            return;
        }
        let count = self.counts.entry(id.to_string()).or_insert(0);
        *count = count.saturating_add(n);
        trace!("add {n} x {id} -> {count}");
    }

    /// Takes one stamp of `id` away. Removing an id that is not present does nothing.
    pub fn remove(&mut self, id: &str) {
        let Some(count) = self.counts.get_mut(id) else {
            return;
        };
        if *count <= 1 {
            self.counts.remove(id);
            trace!("remove {id} -> 0");
        } else {
            *count -= 1;
            trace!("remove {id} -> {count}");
        }
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// The count for `id`, zero when absent.
    pub fn count(&self, id: &str) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// The number of distinct denominations selected.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(id, count)| (id.as_str(), *count))
    }

    /// Sum of face value times count over all entries, looked up in `catalog`. Entries whose id
    /// is not in the catalog contribute nothing.
    pub fn total_value(&self, catalog: &Catalog) -> Amount {
        self.iter()
            .filter_map(|(id, count)| catalog.get(id).map(|d| d.value * count))
            .sum()
    }
}
