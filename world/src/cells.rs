//! Authoritative cell storage, passive growth and arrival resolution.

use neon_conquest_core::{ArrivalOutcome, CellId, CellPosition, CellSnapshot, CellSpec, Owner};

/// Stronghold stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    pub(crate) id: CellId,
    pub(crate) position: CellPosition,
    pub(crate) radius: u32,
    pub(crate) force: u32,
    pub(crate) owner: Owner,
    pub(crate) regenerating: bool,
}

impl Cell {
    fn from_spec(id: CellId, spec: &CellSpec) -> Self {
        Self {
            id,
            position: spec.position,
            radius: spec.radius,
            force: spec.force,
            owner: spec.owner,
            regenerating: true,
        }
    }

    /// Applies one growth tick, reporting whether the cell grew.
    fn grow(&mut self) -> bool {
        if self.owner == Owner::Neutral || !self.regenerating {
            return false;
        }
        self.force = self.force.saturating_add(1);
        true
    }

    /// Resolves a batch sent by `attacker` against this cell.
    ///
    /// Hostile batches larger than the garrison capture the cell and the
    /// overflow becomes the new garrison, so force never goes negative.
    pub(crate) fn receive(&mut self, attacker: Owner, count: u32) -> ArrivalOutcome {
        if attacker == self.owner {
            self.force = self.force.saturating_add(count);
            return ArrivalOutcome::Reinforced;
        }

        if count <= self.force {
            self.force -= count;
            return ArrivalOutcome::Repelled;
        }

        let previous = self.owner;
        self.force = count - self.force;
        self.owner = attacker;
        ArrivalOutcome::Captured { previous }
    }

    pub(crate) fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            id: self.id,
            position: self.position,
            radius: self.radius,
            force: self.force,
            owner: self.owner,
            regenerating: self.regenerating,
        }
    }
}

/// Dense registry of cells indexed by identifier.
#[derive(Debug, Default)]
pub(crate) struct CellRegistry {
    cells: Vec<Cell>,
}

impl CellRegistry {
    /// Builds a registry from specs, allocating identifiers in order.
    pub(crate) fn from_specs(specs: &[CellSpec]) -> Self {
        let cells = specs
            .iter()
            .zip(0u32..)
            .map(|(spec, index)| Cell::from_spec(CellId::new(index), spec))
            .collect();
        Self { cells }
    }

    pub(crate) fn get(&self, id: CellId) -> Option<&Cell> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.cells.get(index))
    }

    pub(crate) fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.cells.get_mut(index))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    /// Applies a growth tick to every cell and returns how many grew.
    pub(crate) fn grow_all(&mut self) -> u32 {
        self.cells
            .iter_mut()
            .map(|cell| u32::from(cell.grow()))
            .sum()
    }

    /// Reports whether `owner` controls every cell of a non-empty layout.
    pub(crate) fn all_owned_by(&self, owner: Owner) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(|cell| cell.owner == owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cell(owner: Owner, force: u32) -> Cell {
        Cell::from_spec(CellId::new(0), &CellSpec::new(0, 0, 10, owner, force))
    }

    #[test]
    fn owned_regenerating_cells_grow_by_one() {
        let mut red = cell(Owner::Red, 10);
        assert!(red.grow());
        assert_eq!(red.force, 11);
    }

    #[test]
    fn neutral_cells_never_grow() {
        let mut neutral = cell(Owner::Neutral, 3);
        for _ in 0..5 {
            assert!(!neutral.grow());
        }
        assert_eq!(neutral.force, 3);
    }

    #[test]
    fn disabled_regeneration_halts_growth() {
        let mut blue = cell(Owner::Blue, 4);
        blue.regenerating = false;
        assert!(!blue.grow());
        assert_eq!(blue.force, 4);
    }

    #[test]
    fn overwhelming_batch_captures_with_overflow() {
        let mut target = cell(Owner::Blue, 5);
        let outcome = target.receive(Owner::Red, 8);
        assert_eq!(
            outcome,
            ArrivalOutcome::Captured {
                previous: Owner::Blue
            }
        );
        assert_eq!(target.owner, Owner::Red);
        assert_eq!(target.force, 3);
    }

    #[test]
    fn smaller_batch_is_repelled() {
        let mut target = cell(Owner::Blue, 5);
        assert_eq!(target.receive(Owner::Red, 3), ArrivalOutcome::Repelled);
        assert_eq!(target.owner, Owner::Blue);
        assert_eq!(target.force, 2);
    }

    #[test]
    fn exact_batch_empties_without_capture() {
        let mut target = cell(Owner::Neutral, 4);
        assert_eq!(target.receive(Owner::Red, 4), ArrivalOutcome::Repelled);
        assert_eq!(target.owner, Owner::Neutral);
        assert_eq!(target.force, 0);
    }

    #[test]
    fn friendly_batch_reinforces() {
        let mut target = cell(Owner::Red, 2);
        assert_eq!(target.receive(Owner::Red, 6), ArrivalOutcome::Reinforced);
        assert_eq!(target.force, 8);
    }

    #[test]
    fn empty_layout_is_never_fully_owned() {
        let registry = CellRegistry::default();
        assert!(!registry.all_owned_by(Owner::Red));
    }

    proptest! {
        #[test]
        fn hostile_arrivals_conserve_the_difference(garrison in 0u32..500, count in 1u32..500) {
            let mut target = cell(Owner::Blue, garrison);
            let outcome = target.receive(Owner::Red, count);

            if count > garrison {
                prop_assert_eq!(outcome, ArrivalOutcome::Captured { previous: Owner::Blue });
                prop_assert_eq!(target.owner, Owner::Red);
                prop_assert_eq!(target.force, count - garrison);
            } else {
                prop_assert_eq!(outcome, ArrivalOutcome::Repelled);
                prop_assert_eq!(target.owner, Owner::Blue);
                prop_assert_eq!(target.force, garrison - count);
            }
        }
    }
}
