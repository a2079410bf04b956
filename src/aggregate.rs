//! Per-selector and per-(selector, event-type) call statistics.
//!
//! Each key owns at most one live row; rows are created on first observation
//! and updated in place. The ranking is an index over the rows, kept sorted
//! for the active sort key on every update. Ties rank by update order, and
//! re-selecting the active sort key reverses the current order in place
//! instead of re-deriving it.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Column a ranking is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Calls,
    TotalMillis,
    AverageMillis,
}

impl SortKey {
    /// Textual keys sort ascending by default, numeric keys descending.
    fn default_direction(self) -> SortDirection {
        match self {
            SortKey::Name => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Snapshot of one ranked row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub name: String,
    pub calls: u64,
    pub total_millis: u64,
    pub average_millis: u64,
}

/// Key of a ranked table row.
pub trait TableKey: Clone + Eq + std::hash::Hash {
    fn label(&self) -> String;
}

/// Selector aggregates are keyed by selector text alone.
impl TableKey for String {
    fn label(&self) -> String {
        self.clone()
    }
}

/// Handler aggregates are keyed by (selector, event type).
impl TableKey for (String, String) {
    fn label(&self) -> String {
        format!("{} ({})", self.0, self.1)
    }
}

struct Slot<K> {
    key: K,
    label: String,
    calls: u64,
    total_millis: u64,
    average_millis: u64,
}

/// One aggregate table plus its ranking.
pub struct RankedTable<K: TableKey> {
    slots: Vec<Slot<K>>,
    /// Ranking: indices into `slots`, sorted for the active sort key.
    order: Vec<usize>,
    index: HashMap<K, usize>,
    sort_key: SortKey,
    direction: SortDirection,
}

impl<K: TableKey> Default for RankedTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TableKey> RankedTable<K> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
            index: HashMap::new(),
            sort_key: SortKey::TotalMillis,
            direction: SortDirection::Descending,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Fold one observed call into the row for `key` and reposition it.
    pub fn record(&mut self, key: K, duration_ms: u64) {
        let idx = match self.index.get(&key) {
            Some(&idx) => {
                // Pull the row out of the ranking before re-inserting it.
                if let Some(pos) = self.order.iter().position(|&i| i == idx) {
                    self.order.remove(pos);
                }
                idx
            }
            None => {
                let idx = self.slots.len();
                self.slots.push(Slot {
                    label: key.label(),
                    key: key.clone(),
                    calls: 0,
                    total_millis: 0,
                    average_millis: 0,
                });
                self.index.insert(key, idx);
                idx
            }
        };

        let slot = &mut self.slots[idx];
        slot.calls += 1;
        slot.total_millis += duration_ms;
        slot.average_millis = (slot.total_millis as f64 / slot.calls as f64).round() as u64;

        // Insert before the first row this one strictly outranks; equals are
        // passed over, which keeps ties in update order.
        let pos = self
            .order
            .iter()
            .position(|&other| self.ranks_before(idx, other))
            .unwrap_or(self.order.len());
        self.order.insert(pos, idx);
    }

    /// Change the sort key, or reverse the current order if `key` is already
    /// active.
    pub fn sort_by(&mut self, key: SortKey) {
        if key == self.sort_key {
            self.order.reverse();
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
            return;
        }

        self.sort_key = key;
        self.direction = key.default_direction();
        let slots = &self.slots;
        let sort_key = self.sort_key;
        let direction = self.direction;
        // Stable: ties keep their current relative order.
        self.order
            .sort_by(|&a, &b| Self::compare(&slots[a], &slots[b], sort_key, direction));
    }

    /// First `n` rows of the ranking, capped to available rows.
    pub fn top(&self, n: usize) -> Vec<AggregateRow> {
        self.order
            .iter()
            .take(n)
            .map(|&idx| {
                let slot = &self.slots[idx];
                AggregateRow {
                    name: slot.label.clone(),
                    calls: slot.calls,
                    total_millis: slot.total_millis,
                    average_millis: slot.average_millis,
                }
            })
            .collect()
    }

    fn ranks_before(&self, a: usize, b: usize) -> bool {
        Self::compare(
            &self.slots[a],
            &self.slots[b],
            self.sort_key,
            self.direction,
        ) == Ordering::Less
    }

    fn compare(a: &Slot<K>, b: &Slot<K>, key: SortKey, direction: SortDirection) -> Ordering {
        let base = match key {
            SortKey::Name => a.label.cmp(&b.label),
            SortKey::Calls => a.calls.cmp(&b.calls),
            SortKey::TotalMillis => a.total_millis.cmp(&b.total_millis),
            SortKey::AverageMillis => a.average_millis.cmp(&b.average_millis),
        };
        match direction {
            SortDirection::Ascending => base,
            SortDirection::Descending => base.reverse(),
        }
    }
}

/// Owns both aggregate tables.
#[derive(Default)]
pub struct Aggregator {
    selectors: RankedTable<String>,
    handlers: RankedTable<(String, String)>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_selector(&mut self, selector: &str, duration_ms: u64) {
        self.selectors.record(selector.to_string(), duration_ms);
    }

    pub fn record_binding(&mut self, selector: &str, event_type: &str, duration_ms: u64) {
        self.handlers
            .record((selector.to_string(), event_type.to_string()), duration_ms);
    }

    pub fn top_selectors(&self, n: usize) -> Vec<AggregateRow> {
        self.selectors.top(n)
    }

    pub fn top_handlers(&self, n: usize) -> Vec<AggregateRow> {
        self.handlers.top(n)
    }

    pub fn sort_selectors_by(&mut self, key: SortKey) {
        self.selectors.sort_by(key);
    }

    pub fn sort_handlers_by(&mut self, key: SortKey) {
        self.handlers.sort_by(key);
    }
}
