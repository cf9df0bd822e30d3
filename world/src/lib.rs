#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Neon Conquest.
//!
//! The world owns every cell, arrow and sender. Adapters mutate it only by
//! submitting [`Command`] values to [`apply`] and observe it only through the
//! read-only [`query`] functions, so all simulation state has a single writer.

use std::time::Duration;

use neon_conquest_core::{
    ArrivalOutcome, CellId, CellSpec, Command, CommandRejection, Config, Event, Reservation,
    SenderId, SenderStop, SessionOutcome,
};
use neon_conquest_system_distribution as distribution;
use tracing::{debug, info, trace, warn};

mod arrows;
mod cells;
mod clock;
mod pulses;
mod scenario;
mod senders;
mod session;

use arrows::{ArrowKey, ArrowRegistry};
use cells::CellRegistry;
use clock::{Timeline, Timer};
use pulses::Pulses;
use senders::{Sender, SenderSchedule};
use session::Session;

pub use scenario::default_layout;

/// Longest span of simulated time a single [`Command::Tick`] may cover.
///
/// Larger deltas are clamped so one tick never fires an unbounded number of
/// timers.
pub const MAX_TICK: Duration = Duration::from_secs(60);

/// Represents the authoritative Neon Conquest world state.
#[derive(Debug)]
pub struct World {
    config: Config,
    cells: CellRegistry,
    arrows: ArrowRegistry,
    senders: SenderSchedule,
    pulses: Pulses,
    timeline: Timeline,
    session: Session,
}

impl World {
    /// Creates a world running the default layout with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(Config::default(), &default_layout())
    }

    /// Creates a world running the provided layout.
    ///
    /// An invalid configuration falls back to the defaults.
    #[must_use]
    pub fn with_layout(config: Config, cells: &[CellSpec]) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(error) => {
                warn!(%error, "rejecting configuration, using defaults");
                Config::default()
            }
        };

        let mut timeline = Timeline::default();
        timeline.start(&config);
        Self {
            cells: CellRegistry::from_specs(cells),
            arrows: ArrowRegistry::default(),
            senders: SenderSchedule::default(),
            pulses: Pulses::default(),
            session: Session::start(timeline.now()),
            timeline,
            config,
        }
    }

    fn load(&mut self, specs: &[CellSpec], out_events: &mut Vec<Event>) {
        self.stop_senders(out_events);
        self.cells = CellRegistry::from_specs(specs);
        self.arrows.clear();
        self.pulses.clear();
        self.session = Session::start(self.timeline.now());
        self.timeline.start(&self.config);

        let cells = u32::try_from(self.cells.len()).unwrap_or(u32::MAX);
        info!(cells, "scenario loaded");
        out_events.push(Event::ScenarioLoaded { cells });
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let horizon = self
            .timeline
            .now()
            .checked_add(dt)
            .unwrap_or(Duration::MAX);

        while let Some((at, timer)) = self.timeline.next(horizon, self.senders.next_due()) {
            self.timeline.fire(at, timer, &self.config);
            match timer {
                Timer::Growth => self.grow(out_events),
                Timer::Spawn => self.spawn_next(out_events),
                Timer::Animation => self.animate(out_events),
            }
        }

        self.timeline.settle(horizon);
    }

    fn grow(&mut self, out_events: &mut Vec<Event>) {
        let grown = self.cells.grow_all();
        trace!(grown, "growth tick");
        out_events.push(Event::GrowthTicked { grown });
    }

    fn spawn_next(&mut self, out_events: &mut Vec<Event>) {
        let Some((due, id, mut sender)) = self.senders.pop_next() else {
            return;
        };

        let Some(target_position) = self.cells.get(sender.target).map(|cell| cell.position)
        else {
            finish_sender(id, SenderStop::Exhausted, out_events);
            return;
        };
        let Some(source) = self.cells.get_mut(sender.source) else {
            finish_sender(id, SenderStop::Exhausted, out_events);
            return;
        };

        let source_force = source.force;
        if let Err(reason) = sender.draw(source) {
            finish_sender(id, reason, out_events);
            return;
        }

        let travel_time = source.position.distance(target_position) / self.config.transfer_speed;
        let key = ArrowKey {
            source: sender.source,
            target: sender.target,
        };
        let merged = self.arrows.launch(
            key,
            source_force,
            1,
            travel_time,
            self.config.merge_tolerance,
        );
        self.session.record_unit_sent();
        out_events.push(Event::BatchLaunched {
            sender: id,
            source: sender.source,
            target: sender.target,
            merged,
        });

        match due.checked_add(self.config.spawn_interval()) {
            Some(next) if sender.remaining > 0 => self.senders.reschedule(next, id, sender),
            _ => finish_sender(id, SenderStop::Exhausted, out_events),
        }
    }

    fn animate(&mut self, out_events: &mut Vec<Event>) {
        let dt = self.config.animation_step().as_secs_f64();

        for arrival in self.arrows.advance(dt) {
            let ArrowKey { source, target } = arrival.key;
            let Some(attacker) = self.cells.get(source).map(|cell| cell.owner) else {
                continue;
            };
            let Some(cell) = self.cells.get_mut(target) else {
                continue;
            };

            let outcome = cell.receive(attacker, arrival.count);
            if let ArrivalOutcome::Captured { previous } = outcome {
                debug!(
                    cell = target.get(),
                    ?previous,
                    owner = ?attacker,
                    garrison = cell.force,
                    "cell captured"
                );
            }
            self.arrows.settle(arrival.key, arrival.count);
            out_events.push(Event::BatchArrived {
                source,
                target,
                count: arrival.count,
                outcome,
            });
        }

        for key in self.arrows.retire_empty() {
            out_events.push(Event::ArrowRetired {
                source: key.source,
                target: key.target,
            });
        }

        self.pulses.advance(dt, &self.config);

        if self.cells.all_owned_by(self.config.player) {
            self.end_session(SessionOutcome::Victory, out_events);
        }
    }

    fn end_session(&mut self, outcome: SessionOutcome, out_events: &mut Vec<Event>) {
        let Some(elapsed) = self.session.end(outcome, self.timeline.now()) else {
            return;
        };

        self.timeline.stop();
        self.stop_senders(out_events);

        let units_sent = self.session.units_sent();
        info!(?outcome, ?elapsed, units_sent, "session ended");
        out_events.push(Event::SessionEnded {
            outcome,
            elapsed,
            units_sent,
        });
    }

    fn resume_session(&mut self, out_events: &mut Vec<Event>) {
        if self.session.is_running() {
            reject(CommandRejection::AlreadyRunning, out_events);
            return;
        }
        if !self.session.resume() {
            reject(CommandRejection::NotResumable, out_events);
            return;
        }

        self.timeline.start(&self.config);
        info!("session resumed");
        out_events.push(Event::SessionResumed);
    }

    fn stop_senders(&mut self, out_events: &mut Vec<Event>) {
        for id in self.senders.drain() {
            finish_sender(id, SenderStop::SessionEnded, out_events);
        }
    }

    fn queue_transfer(
        &mut self,
        source: CellId,
        target: CellId,
        count: u32,
        reservation: Reservation,
        out_events: &mut Vec<Event>,
    ) -> SenderId {
        let first_spawn = self.timeline.now() + self.config.spawn_interval();
        let sender = self.senders.schedule(
            first_spawn,
            Sender::new(source, target, count, reservation),
        );
        debug!(
            sender = sender.get(),
            source = source.get(),
            target = target.get(),
            count,
            ?reservation,
            "transfer queued"
        );
        out_events.push(Event::TransferQueued {
            sender,
            source,
            target,
            count,
            reservation,
        });
        sender
    }

    fn send_half(&mut self, source: CellId, target: CellId, out_events: &mut Vec<Event>) {
        let Some(origin) = self.cells.get(source) else {
            reject(CommandRejection::UnknownCell(source), out_events);
            return;
        };
        if self.cells.get(target).is_none() {
            reject(CommandRejection::UnknownCell(target), out_events);
            return;
        }
        if source == target {
            reject(CommandRejection::TargetIsSource, out_events);
            return;
        }
        if origin.owner != self.config.player {
            reject(CommandRejection::SourceNotOwned, out_events);
            return;
        }
        if origin.force <= 1 {
            reject(CommandRejection::InsufficientForce, out_events);
            return;
        }

        let count = (origin.force / 2).max(1);
        let _ = self.queue_transfer(source, target, count, Reservation::Incremental, out_events);
    }

    fn send_all(&mut self, sources: &[CellId], target: CellId, out_events: &mut Vec<Event>) {
        if sources.is_empty() {
            reject(CommandRejection::NoSources, out_events);
            return;
        }
        let Some(destination) = self.cells.get(target) else {
            reject(CommandRejection::UnknownCell(target), out_events);
            return;
        };
        if destination.owner == self.config.player {
            reject(CommandRejection::TargetOwnedByPlayer, out_events);
            return;
        }
        if let Some(unknown) = self.first_unknown(sources) {
            reject(CommandRejection::UnknownCell(unknown), out_events);
            return;
        }

        let committed = self.reserve(&unique(sources));
        if committed.is_empty() {
            reject(CommandRejection::NothingToSend, out_events);
            return;
        }

        for (source, count) in committed {
            let _ = self.queue_transfer(source, target, count, Reservation::PreConsumed, out_events);
        }
    }

    fn distribute(&mut self, sources: &[CellId], targets: &[CellId], out_events: &mut Vec<Event>) {
        if sources.is_empty() {
            reject(CommandRejection::NoSources, out_events);
            return;
        }
        if targets.is_empty() {
            reject(CommandRejection::NoTargets, out_events);
            return;
        }
        if let Some(unknown) = self
            .first_unknown(sources)
            .or_else(|| self.first_unknown(targets))
        {
            reject(CommandRejection::UnknownCell(unknown), out_events);
            return;
        }

        let sources = unique(sources);
        let targets = unique(targets);
        if targets.iter().any(|target| sources.contains(target)) {
            reject(CommandRejection::TargetIsSource, out_events);
            return;
        }

        let available: Vec<(CellId, u32)> = sources
            .iter()
            .filter_map(|id| self.cells.get(*id))
            .filter(|cell| cell.owner == self.config.player)
            .map(|cell| (cell.id, cell.force))
            .collect();
        let Some(plan) = distribution::plan(&available, &targets) else {
            reject(CommandRejection::NothingToSend, out_events);
            return;
        };

        let _ = self.reserve(&sources);
        for allocation in plan.allocations() {
            let _ = self.queue_transfer(
                allocation.source,
                allocation.target,
                allocation.count,
                Reservation::PreConsumed,
                out_events,
            );
        }

        for target in &targets {
            if let Some(cell) = self.cells.get(*target) {
                self.pulses.emit(cell.position, &self.config);
            }
        }

        let summary = plan.summary();
        info!(
            total = summary.total_sent,
            sources = summary.per_source.len(),
            targets = targets.len(),
            "distribution committed"
        );
        out_events.push(Event::DistributionCommitted { summary });
    }

    /// Empties every player-owned source with force and returns what was taken.
    fn reserve(&mut self, sources: &[CellId]) -> Vec<(CellId, u32)> {
        let player = self.config.player;
        let mut reserved = Vec::new();
        for id in sources {
            let Some(cell) = self.cells.get_mut(*id) else {
                continue;
            };
            if cell.owner != player || cell.force == 0 {
                continue;
            }
            reserved.push((cell.id, std::mem::take(&mut cell.force)));
        }
        reserved
    }

    fn first_unknown(&self, ids: &[CellId]) -> Option<CellId> {
        ids.iter().copied().find(|id| self.cells.get(*id).is_none())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Configure { config } => {
            if let Err(error) = config.validate() {
                warn!(%error, "configuration rejected");
                reject(CommandRejection::InvalidConfig, out_events);
                return;
            }
            world.config = config;
            if world.session.is_running() {
                world.timeline.start(&world.config);
            }
            out_events.push(Event::Configured);
        }
        Command::LoadScenario { cells } => world.load(&cells, out_events),
        Command::Tick { dt } => {
            let dt = if dt > MAX_TICK {
                warn!(?dt, limit = ?MAX_TICK, "clamping oversized tick");
                MAX_TICK
            } else {
                dt
            };
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt, out_events);
        }
        Command::SetRegenerating { cell, regenerating } => match world.cells.get_mut(cell) {
            Some(cell) => cell.regenerating = regenerating,
            None => reject(CommandRejection::UnknownCell(cell), out_events),
        },
        Command::ResumeSession => world.resume_session(out_events),
        _ if !world.session.is_running() => reject(CommandRejection::SessionEnded, out_events),
        Command::SendHalf { source, target } => world.send_half(source, target, out_events),
        Command::SendAll { sources, target } => world.send_all(&sources, target, out_events),
        Command::Distribute { sources, targets } => {
            world.distribute(&sources, &targets, out_events);
        }
        Command::EndSession => world.end_session(SessionOutcome::Abandoned, out_events),
    }
}

fn finish_sender(sender: SenderId, reason: SenderStop, out_events: &mut Vec<Event>) {
    trace!(sender = sender.get(), ?reason, "sender finished");
    out_events.push(Event::SenderFinished { sender, reason });
}

fn reject(reason: CommandRejection, out_events: &mut Vec<Event>) {
    debug!(?reason, "command ignored");
    out_events.push(Event::CommandIgnored { reason });
}

fn unique(ids: &[CellId]) -> Vec<CellId> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use neon_conquest_core::{
        ArrowSnapshot, ArrowView, CellId, CellSnapshot, CellView, Config, PulseSnapshot,
        SenderSnapshot, SessionSnapshot,
    };

    use super::{ArrowKey, World};

    /// Parameters currently driving the simulation.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Simulated time since the world was created.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.timeline.now()
    }

    /// Captures a read-only view of every cell.
    #[must_use]
    pub fn cells(world: &World) -> CellView {
        CellView::from_snapshots(world.cells.iter().map(|cell| cell.snapshot()).collect())
    }

    /// Captures the state of a single cell.
    #[must_use]
    pub fn cell(world: &World, id: CellId) -> Option<CellSnapshot> {
        world.cells.get(id).map(|cell| cell.snapshot())
    }

    /// Captures every arrow and its batches in creation order.
    #[must_use]
    pub fn arrows(world: &World) -> ArrowView {
        ArrowView::from_snapshots(world.arrows.iter().map(|arrow| arrow.snapshot()).collect())
    }

    /// Captures the arrow for an ordered cell pair, if one exists.
    #[must_use]
    pub fn arrow(world: &World, source: CellId, target: CellId) -> Option<ArrowSnapshot> {
        world
            .arrows
            .get(ArrowKey { source, target })
            .map(|arrow| arrow.snapshot())
    }

    /// Total units in transit along every arrow.
    #[must_use]
    pub fn in_flight(world: &World) -> u32 {
        arrows(world).in_flight()
    }

    /// Captures every active sender in creation order.
    #[must_use]
    pub fn sender_view(world: &World) -> Vec<SenderSnapshot> {
        world.senders.snapshots()
    }

    /// Number of senders still producing batches.
    #[must_use]
    pub fn active_senders(world: &World) -> usize {
        world.senders.len()
    }

    /// Captures every live pulse cue.
    #[must_use]
    pub fn pulses(world: &World) -> Vec<PulseSnapshot> {
        world.pulses.snapshots()
    }

    /// Summarises the session lifecycle.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        world.session.snapshot(world.timeline.now())
    }
}
