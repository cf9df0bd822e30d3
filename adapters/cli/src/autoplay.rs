//! Scripted opponents that play the player's side during headless runs.

use std::time::Duration;

use clap::ValueEnum;
use neon_conquest_core::{CellSnapshot, CellView, Owner};
use neon_conquest_system_selection::Intent;

/// How the autoplayer chooses its orders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Strategy {
    /// Never issues orders.
    Idle,
    /// Throws every owned garrison at the weakest hostile cell it can take.
    Greedy,
    /// Spreads the garrisons over every empty hostile cell, then turns greedy.
    Spread,
}

/// Emits selection intents at a fixed decision cadence.
#[derive(Debug)]
pub(crate) struct Autoplay {
    strategy: Strategy,
    period: Duration,
    next_decision: Duration,
}

impl Autoplay {
    pub(crate) const fn new(strategy: Strategy, period: Duration) -> Self {
        Self {
            strategy,
            period,
            next_decision: Duration::ZERO,
        }
    }

    pub(crate) fn decide(
        &mut self,
        now: Duration,
        cells: &CellView,
        player: Owner,
    ) -> Vec<Intent> {
        if now < self.next_decision {
            return Vec::new();
        }
        self.next_decision = now + self.period;

        match self.strategy {
            Strategy::Idle => Vec::new(),
            Strategy::Greedy => greedy(cells, player),
            Strategy::Spread => {
                let empty: Vec<&CellSnapshot> = cells
                    .iter()
                    .filter(|cell| cell.owner != player && cell.force == 0)
                    .collect();
                let reserve = owned_force(cells, player);
                if empty.len() < 2 || reserve < u64::try_from(empty.len()).unwrap_or(u64::MAX) {
                    return greedy(cells, player);
                }

                let mut intents = vec![Intent::SelectAllOwned];
                intents.extend(empty.iter().map(|cell| Intent::ToggleTarget(cell.id)));
                intents.push(Intent::CommitDistribution);
                intents
            }
        }
    }
}

fn owned_force(cells: &CellView, player: Owner) -> u64 {
    cells
        .iter()
        .filter(|cell| cell.owner == player)
        .map(|cell| u64::from(cell.force))
        .sum()
}

fn greedy(cells: &CellView, player: Owner) -> Vec<Intent> {
    let Some(weakest) = cells
        .iter()
        .filter(|cell| cell.owner != player)
        .min_by_key(|cell| (cell.force, cell.id))
    else {
        return Vec::new();
    };

    if owned_force(cells, player) <= u64::from(weakest.force) {
        return Vec::new();
    }
    vec![
        Intent::SelectAllOwned,
        Intent::CommitAttack { target: weakest.id },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_conquest_core::{CellId, CellPosition};

    fn cell(id: u32, owner: Owner, force: u32) -> CellSnapshot {
        CellSnapshot {
            id: CellId::new(id),
            position: CellPosition::new(0, 0),
            radius: 10,
            force,
            owner,
            regenerating: true,
        }
    }

    fn board() -> CellView {
        CellView::from_snapshots(vec![
            cell(0, Owner::Red, 6),
            cell(1, Owner::Blue, 9),
            cell(2, Owner::Neutral, 0),
            cell(3, Owner::Neutral, 0),
        ])
    }

    #[test]
    fn greedy_attacks_weakest_hostile_cell() {
        let mut autoplay = Autoplay::new(Strategy::Greedy, Duration::from_secs(1));
        assert_eq!(
            autoplay.decide(Duration::ZERO, &board(), Owner::Red),
            vec![
                Intent::SelectAllOwned,
                Intent::CommitAttack {
                    target: CellId::new(2)
                },
            ]
        );
    }

    #[test]
    fn greedy_waits_when_outnumbered() {
        let cells =
            CellView::from_snapshots(vec![cell(0, Owner::Red, 4), cell(1, Owner::Blue, 4)]);
        let mut autoplay = Autoplay::new(Strategy::Greedy, Duration::ZERO);
        assert!(autoplay.decide(Duration::ZERO, &cells, Owner::Red).is_empty());
    }

    #[test]
    fn decisions_follow_the_period() {
        let mut autoplay = Autoplay::new(Strategy::Greedy, Duration::from_secs(2));
        assert!(!autoplay.decide(Duration::ZERO, &board(), Owner::Red).is_empty());
        assert!(autoplay
            .decide(Duration::from_secs(1), &board(), Owner::Red)
            .is_empty());
        assert!(!autoplay
            .decide(Duration::from_secs(2), &board(), Owner::Red)
            .is_empty());
    }

    #[test]
    fn spread_targets_every_empty_cell() {
        let mut autoplay = Autoplay::new(Strategy::Spread, Duration::from_secs(1));
        assert_eq!(
            autoplay.decide(Duration::ZERO, &board(), Owner::Red),
            vec![
                Intent::SelectAllOwned,
                Intent::ToggleTarget(CellId::new(2)),
                Intent::ToggleTarget(CellId::new(3)),
                Intent::CommitDistribution,
            ]
        );
    }

    #[test]
    fn idle_never_orders() {
        let mut autoplay = Autoplay::new(Strategy::Idle, Duration::ZERO);
        assert!(autoplay.decide(Duration::ZERO, &board(), Owner::Red).is_empty());
    }
}
