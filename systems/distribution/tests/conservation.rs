use proptest::prelude::*;

use neon_conquest_core::CellId;
use neon_conquest_system_distribution::{plan, target_needs};

fn sources_strategy() -> impl Strategy<Value = Vec<(CellId, u32)>> {
    prop::collection::vec(0u32..500, 1..8).prop_map(|forces| {
        forces
            .into_iter()
            .zip(0u32..)
            .map(|(force, id)| (CellId::new(id), force))
            .collect()
    })
}

fn targets_strategy() -> impl Strategy<Value = Vec<CellId>> {
    (1u32..10).prop_map(|count| (100..100 + count).map(CellId::new).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Every reserved unit is assigned to exactly one pair.
    #[test]
    fn allocations_sum_to_total(sources in sources_strategy(), targets in targets_strategy()) {
        let total: u64 = sources.iter().map(|(_, force)| u64::from(*force)).sum();
        match plan(&sources, &targets) {
            None => prop_assert_eq!(total, 0),
            Some(plan) => {
                let allocated: u64 = plan
                    .allocations()
                    .iter()
                    .map(|allocation| u64::from(allocation.count))
                    .sum();
                prop_assert_eq!(allocated, total);
                prop_assert_eq!(plan.summary().total_sent, total);

                let summarized: u64 = plan
                    .summary()
                    .per_source
                    .iter()
                    .map(|(_, sent)| u64::from(*sent))
                    .sum();
                prop_assert_eq!(summarized, total);
            }
        }
    }

    /// No source gives more than it reserved and no allocation is empty.
    #[test]
    fn sources_are_never_overdrawn(sources in sources_strategy(), targets in targets_strategy()) {
        if let Some(plan) = plan(&sources, &targets) {
            for allocation in plan.allocations() {
                prop_assert!(allocation.count > 0);
            }
            for (source, reserve) in &sources {
                let drawn: u64 = plan
                    .allocations()
                    .iter()
                    .filter(|allocation| allocation.source == *source)
                    .map(|allocation| u64::from(allocation.count))
                    .sum();
                prop_assert_eq!(drawn, u64::from(*reserve));
            }
        }
    }

    /// Shares sum to the total and differ by at most one unit.
    #[test]
    fn needs_are_balanced(total in 0u64..100_000, targets in targets_strategy()) {
        let needs = target_needs(total, &targets);
        prop_assert_eq!(needs.len(), targets.len());
        prop_assert_eq!(needs.iter().map(|(_, need)| *need).sum::<u64>(), total);

        let max = needs.iter().map(|(_, need)| *need).max().unwrap_or(0);
        let min = needs.iter().map(|(_, need)| *need).min().unwrap_or(0);
        prop_assert!(max - min <= 1);
    }

    /// Each target receives exactly its computed share.
    #[test]
    fn targets_receive_their_share(sources in sources_strategy(), targets in targets_strategy()) {
        if let Some(plan) = plan(&sources, &targets) {
            for (target, need) in plan.needs() {
                let received: u64 = plan
                    .allocations()
                    .iter()
                    .filter(|allocation| allocation.target == *target)
                    .map(|allocation| u64::from(allocation.count))
                    .sum();
                prop_assert_eq!(received, *need);
            }
        }
    }
}
