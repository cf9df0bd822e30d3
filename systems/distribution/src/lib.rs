#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure planner that splits reserved force across several targets.
//!
//! The world reserves every source's garrison before consulting the planner,
//! so the plan only has to decide which source feeds which target. Targets
//! receive an as-even-as-possible share of the combined reserve and sources
//! are drained greedily in command order.

use neon_conquest_core::{CellId, DistributionSummary};

/// Units assigned to a single (source, target) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    /// Cell supplying the units.
    pub source: CellId,
    /// Cell receiving the units.
    pub target: CellId,
    /// Units moved along the pair, always positive.
    pub count: u32,
}

/// Complete assignment of a reserve to a set of targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionPlan {
    total: u64,
    needs: Vec<(CellId, u64)>,
    allocations: Vec<Allocation>,
}

impl DistributionPlan {
    /// Combined reserve of every source.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Share assigned to each target, in target order.
    #[must_use]
    pub fn needs(&self) -> &[(CellId, u64)] {
        &self.needs
    }

    /// Allocations in the order they were drawn.
    #[must_use]
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// Aggregates the allocations into per-source totals.
    ///
    /// Sources appear in the order they first contributed.
    #[must_use]
    pub fn summary(&self) -> DistributionSummary {
        let mut per_source: Vec<(CellId, u32)> = Vec::new();
        for allocation in &self.allocations {
            match per_source
                .iter_mut()
                .find(|(source, _)| *source == allocation.source)
            {
                Some((_, sent)) => *sent = sent.saturating_add(allocation.count),
                None => per_source.push((allocation.source, allocation.count)),
            }
        }
        DistributionSummary {
            total_sent: self.total,
            per_source,
        }
    }
}

/// Splits `total` across `targets` so that shares differ by at most one unit.
///
/// The first `total % targets.len()` targets receive the extra unit.
#[must_use]
pub fn target_needs(total: u64, targets: &[CellId]) -> Vec<(CellId, u64)> {
    let Ok(count) = u64::try_from(targets.len()) else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }

    let base = total / count;
    let remainder = total % count;
    targets
        .iter()
        .zip(0u64..)
        .map(|(target, index)| (*target, base + u64::from(index < remainder)))
        .collect()
}

/// Plans how the reserved force of `sources` is spread across `targets`.
///
/// Returns `None` when there is nothing to move or nowhere to move it. The
/// returned allocations always sum to the combined reserve.
#[must_use]
pub fn plan(sources: &[(CellId, u32)], targets: &[CellId]) -> Option<DistributionPlan> {
    if targets.is_empty() {
        return None;
    }

    let total: u64 = sources.iter().map(|(_, force)| u64::from(*force)).sum();
    if total == 0 {
        return None;
    }

    let needs = target_needs(total, targets);
    let mut remaining: Vec<(CellId, u32)> = sources.to_vec();
    let mut cursor = 0;
    let mut allocations = Vec::new();

    for &(target, need) in &needs {
        let mut need = need;
        while need > 0 && cursor < remaining.len() {
            let (source, available) = &mut remaining[cursor];
            if *available == 0 {
                cursor += 1;
                continue;
            }

            let give = u32::try_from(need.min(u64::from(*available))).unwrap_or(*available);
            *available -= give;
            need -= u64::from(give);
            allocations.push(Allocation {
                source: *source,
                target,
                count: give,
            });

            if *available == 0 {
                cursor += 1;
            }
        }
        debug_assert_eq!(need, 0, "reserve exhausted before every share was met");
    }

    Some(DistributionPlan {
        total,
        needs,
        allocations,
    })
}
