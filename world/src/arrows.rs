//! Aggregated transfer channels and the batches travelling along them.

use std::collections::{hash_map::Entry, HashMap};

use neon_conquest_core::{ArrowSnapshot, BatchSnapshot, CellId};

/// Slack absorbing rounding in travel-time differences, so that batches
/// exactly one tolerance apart never merge.
const MERGE_EPSILON: f64 = 1e-9;

/// Ordered cell pair that identifies an arrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ArrowKey {
    pub(crate) source: CellId,
    pub(crate) target: CellId,
}

#[derive(Clone, Debug)]
struct Batch {
    count: u32,
    remaining: f64,
    total: f64,
    /// Launch order across every arrow; a merged batch keeps its original slot.
    sequence: u64,
}

/// Every batch in transit between one source and one target.
#[derive(Clone, Debug)]
pub(crate) struct Arrow {
    key: ArrowKey,
    batches: Vec<Batch>,
    source_power: u32,
}

impl Arrow {
    fn new(key: ArrowKey, source_force: u32) -> Self {
        Self {
            key,
            batches: Vec::new(),
            source_power: source_force,
        }
    }

    /// Appends a batch or folds it into the newest one when their arrival
    /// times are within `tolerance` seconds. Returns whether it merged.
    fn add_batch(&mut self, count: u32, travel_time: f64, tolerance: f64, sequence: u64) -> bool {
        self.source_power = self.source_power.saturating_add(count);

        if let Some(last) = self.batches.last_mut() {
            if (last.remaining - travel_time).abs() < tolerance - MERGE_EPSILON {
                last.count = last.count.saturating_add(count);
                return true;
            }
        }

        self.batches.push(Batch {
            count,
            remaining: travel_time,
            total: travel_time,
            sequence,
        });
        false
    }

    pub(crate) fn snapshot(&self) -> ArrowSnapshot {
        ArrowSnapshot {
            source: self.key.source,
            target: self.key.target,
            batches: self
                .batches
                .iter()
                .map(|batch| BatchSnapshot {
                    count: batch.count,
                    remaining: batch.remaining,
                    total: batch.total,
                })
                .collect(),
            source_power: self.source_power,
        }
    }
}

/// Batch that reached its target during an animation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Arrival {
    pub(crate) key: ArrowKey,
    pub(crate) count: u32,
    sequence: u64,
}

/// Arrows keyed by their ordered cell pair, remembered in creation order.
#[derive(Debug, Default)]
pub(crate) struct ArrowRegistry {
    arrows: HashMap<ArrowKey, Arrow>,
    order: Vec<ArrowKey>,
    next_sequence: u64,
}

impl ArrowRegistry {
    /// Deposits a batch on the arrow for `key`, creating the arrow on first use.
    ///
    /// `source_force` seeds the display weight of a newly created arrow.
    pub(crate) fn launch(
        &mut self,
        key: ArrowKey,
        source_force: u32,
        count: u32,
        travel_time: f64,
        tolerance: f64,
    ) -> bool {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);

        let arrow = match self.arrows.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.order.push(key);
                entry.insert(Arrow::new(key, source_force))
            }
        };
        arrow.add_batch(count, travel_time, tolerance, sequence)
    }

    /// Advances every batch by `dt` seconds and detaches the ones that arrived.
    ///
    /// Arrivals are returned oldest launch first.
    pub(crate) fn advance(&mut self, dt: f64) -> Vec<Arrival> {
        let mut arrivals = Vec::new();
        for key in &self.order {
            let Some(arrow) = self.arrows.get_mut(key) else {
                continue;
            };
            for batch in &mut arrow.batches {
                batch.remaining -= dt;
            }
            arrow.batches.retain(|batch| {
                if batch.remaining <= 0.0 {
                    arrivals.push(Arrival {
                        key: *key,
                        count: batch.count,
                        sequence: batch.sequence,
                    });
                    false
                } else {
                    true
                }
            });
        }
        arrivals.sort_by_key(|arrival| arrival.sequence);
        arrivals
    }

    /// Lowers the display weight of an arrow after one of its batches resolved.
    pub(crate) fn settle(&mut self, key: ArrowKey, count: u32) {
        if let Some(arrow) = self.arrows.get_mut(&key) {
            arrow.source_power = arrow.source_power.saturating_sub(count);
        }
    }

    /// Removes every arrow without batches and returns their keys in creation order.
    pub(crate) fn retire_empty(&mut self) -> Vec<ArrowKey> {
        let mut retired = Vec::new();
        let arrows = &mut self.arrows;
        self.order.retain(|key| {
            let empty = arrows.get(key).map_or(true, |arrow| arrow.batches.is_empty());
            if empty {
                let _ = arrows.remove(key);
                retired.push(*key);
            }
            !empty
        });
        retired
    }

    pub(crate) fn get(&self, key: ArrowKey) -> Option<&Arrow> {
        self.arrows.get(&key)
    }

    /// Iterates arrows in creation order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arrow> {
        self.order.iter().filter_map(|key| self.arrows.get(key))
    }

    pub(crate) fn clear(&mut self) {
        self.arrows.clear();
        self.order.clear();
    }
}
