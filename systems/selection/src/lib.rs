#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure selection system that turns player intents into transfer commands.

use neon_conquest_core::{ArrivalOutcome, CellId, CellPosition, CellView, Command, Event, Owner};

/// Player gesture distilled from adapter-provided input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Replaces the source selection with a single owned cell.
    Select(CellId),
    /// Replaces the source selection with every owned cell inside a rectangle.
    BoxSelect {
        /// One corner of the rectangle.
        corner: CellPosition,
        /// The corner diagonally opposite to `corner`.
        opposite: CellPosition,
    },
    /// Selects every owned cell as a source.
    SelectAllOwned,
    /// Adds the cell to the distribution targets, or removes it if present.
    ToggleTarget(CellId),
    /// Drops both the source and target selections.
    Clear,
    /// Sends the full garrison of every selected source to `target`.
    CommitAttack {
        /// Hostile or neutral cell under attack.
        target: CellId,
    },
    /// Spreads the selected sources' garrisons across the marked targets.
    CommitDistribution,
    /// Sends half of `source` toward `target` without touching the selection.
    Drag {
        /// Owned cell supplying the units.
        source: CellId,
        /// Cell receiving the units.
        target: CellId,
    },
}

/// Selection state shared between input handling and command emission.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    sources: Vec<CellId>,
    targets: Vec<CellId>,
}

impl Selection {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Currently selected source cells in selection order.
    #[must_use]
    pub fn sources(&self) -> &[CellId] {
        &self.sources
    }

    /// Currently marked distribution targets in marking order.
    #[must_use]
    pub fn targets(&self) -> &[CellId] {
        &self.targets
    }

    /// Reports whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.targets.is_empty()
    }

    /// Consumes world events and player intents to emit transfer commands.
    ///
    /// Intents referring to unknown cells, or that would produce a command
    /// the world is bound to reject, are ignored.
    pub fn handle(
        &mut self,
        events: &[Event],
        intents: &[Intent],
        cells: &CellView,
        player: Owner,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::ScenarioLoaded { .. } | Event::SessionEnded { .. } => self.clear(),
                Event::BatchArrived {
                    target,
                    outcome: ArrivalOutcome::Captured { previous },
                    ..
                } if *previous == player => self.sources.retain(|source| source != target),
                _ => {}
            }
        }

        for intent in intents {
            self.apply(*intent, cells, player, out);
        }
    }

    fn apply(&mut self, intent: Intent, cells: &CellView, player: Owner, out: &mut Vec<Command>) {
        let owned = |id: CellId| cells.get(id).is_some_and(|cell| cell.owner == player);

        match intent {
            Intent::Select(cell) => {
                if owned(cell) {
                    self.sources = vec![cell];
                    self.targets.retain(|target| *target != cell);
                }
            }
            Intent::BoxSelect { corner, opposite } => {
                self.sources = cells
                    .iter()
                    .filter(|cell| cell.owner == player)
                    .filter(|cell| cell.position.within(corner, opposite))
                    .map(|cell| cell.id)
                    .collect();
                self.drop_selected_targets();
            }
            Intent::SelectAllOwned => {
                self.sources = cells.owned_by(player);
                self.drop_selected_targets();
            }
            Intent::ToggleTarget(cell) => {
                if cells.get(cell).is_none() || self.sources.contains(&cell) {
                    return;
                }
                if let Some(index) = self.targets.iter().position(|target| *target == cell) {
                    let _ = self.targets.remove(index);
                } else {
                    self.targets.push(cell);
                }
            }
            Intent::Clear => self.clear(),
            Intent::CommitAttack { target } => {
                let hostile = cells.get(target).is_some_and(|cell| cell.owner != player);
                if self.sources.is_empty() || !hostile {
                    return;
                }
                out.push(Command::SendAll {
                    sources: std::mem::take(&mut self.sources),
                    target,
                });
                self.targets.clear();
            }
            Intent::CommitDistribution => {
                if self.sources.is_empty() || self.targets.is_empty() {
                    return;
                }
                out.push(Command::Distribute {
                    sources: std::mem::take(&mut self.sources),
                    targets: std::mem::take(&mut self.targets),
                });
            }
            Intent::Drag { source, target } => {
                if source != target && owned(source) && cells.get(target).is_some() {
                    out.push(Command::SendHalf { source, target });
                }
            }
        }
    }

    fn drop_selected_targets(&mut self) {
        let sources = &self.sources;
        self.targets.retain(|target| !sources.contains(target));
    }

    fn clear(&mut self) {
        self.sources.clear();
        self.targets.clear();
    }
}
