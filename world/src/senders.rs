//! Timed transfer producers and the schedule that drives them.

use std::{collections::BTreeMap, time::Duration};

use neon_conquest_core::{CellId, Reservation, SenderId, SenderSnapshot, SenderStop};

use crate::cells::Cell;

/// Producer that emits one unit per spawn interval toward its target.
#[derive(Clone, Debug)]
pub(crate) struct Sender {
    pub(crate) source: CellId,
    pub(crate) target: CellId,
    pub(crate) remaining: u32,
    pub(crate) reservation: Reservation,
}

impl Sender {
    pub(crate) const fn new(
        source: CellId,
        target: CellId,
        count: u32,
        reservation: Reservation,
    ) -> Self {
        Self {
            source,
            target,
            remaining: count,
            reservation,
        }
    }

    /// Draws a single unit for the next batch.
    ///
    /// Incremental senders debit the source and stop once it is empty;
    /// pre-consumed senders only count down their reserved pool.
    pub(crate) fn draw(&mut self, source: &mut Cell) -> Result<(), SenderStop> {
        if self.remaining == 0 {
            return Err(SenderStop::Exhausted);
        }

        if self.reservation == Reservation::Incremental {
            if source.force == 0 {
                return Err(SenderStop::SourceDepleted);
            }
            source.force -= 1;
        }

        self.remaining -= 1;
        Ok(())
    }
}

/// Priority-ordered schedule of every active sender.
///
/// Entries are keyed by their next spawn time and identifier, so senders due
/// at the same instant fire in creation order.
#[derive(Debug, Default)]
pub(crate) struct SenderSchedule {
    entries: BTreeMap<(Duration, SenderId), Sender>,
    next_id: u32,
}

impl SenderSchedule {
    /// Registers a sender whose first spawn happens at `first_due`.
    pub(crate) fn schedule(&mut self, first_due: Duration, sender: Sender) -> SenderId {
        let id = SenderId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let _ = self.entries.insert((first_due, id), sender);
        id
    }

    /// Puts a sender back after it spawned.
    pub(crate) fn reschedule(&mut self, due: Duration, id: SenderId, sender: Sender) {
        let _ = self.entries.insert((due, id), sender);
    }

    /// Time of the earliest pending spawn.
    pub(crate) fn next_due(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Removes and returns the earliest pending spawn.
    pub(crate) fn pop_next(&mut self) -> Option<(Duration, SenderId, Sender)> {
        self.entries
            .pop_first()
            .map(|((due, id), sender)| (due, id, sender))
    }

    /// Stops every sender, returning their identifiers in creation order.
    pub(crate) fn drain(&mut self) -> Vec<SenderId> {
        let mut ids: Vec<SenderId> = std::mem::take(&mut self.entries)
            .into_keys()
            .map(|(_, id)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn snapshots(&self) -> Vec<SenderSnapshot> {
        let mut snapshots: Vec<SenderSnapshot> = self
            .entries
            .iter()
            .map(|((due, id), sender)| SenderSnapshot {
                id: *id,
                source: sender.source,
                target: sender.target,
                remaining: sender.remaining,
                reservation: sender.reservation,
                next_spawn: *due,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }
}
