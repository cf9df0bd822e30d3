#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Neon Conquest engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Adapters read the world exclusively through immutable snapshots
//! such as [`CellView`] and [`ArrowView`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod config;

pub use config::{
    Config, ConfigError, DEFAULT_ANIMATION_STEP_MS, DEFAULT_GROWTH_PERIOD_MS,
    DEFAULT_MERGE_TOLERANCE, DEFAULT_PULSE_GROWTH, DEFAULT_PULSE_INITIAL_RADIUS,
    DEFAULT_PULSE_LIFETIME, DEFAULT_SPAWN_INTERVAL_MS, DEFAULT_TRANSFER_SPEED,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs new simulation parameters.
    Configure {
        /// Parameters to install once validated.
        config: Config,
    },
    /// Replaces the cell layout and restarts the session.
    LoadScenario {
        /// Cells composing the new layout, in identifier order.
        cells: Vec<CellSpec>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Sends half of the source's force toward the target, one unit at a time.
    SendHalf {
        /// Cell supplying the force.
        source: CellId,
        /// Cell receiving the force.
        target: CellId,
    },
    /// Commits the entire force of every source toward a single hostile target.
    SendAll {
        /// Cells supplying the force, in command order.
        sources: Vec<CellId>,
        /// Cell receiving the force.
        target: CellId,
    },
    /// Splits the combined force of the sources evenly across the targets.
    Distribute {
        /// Cells supplying the force, in command order.
        sources: Vec<CellId>,
        /// Cells receiving the force, in command order.
        targets: Vec<CellId>,
    },
    /// Enables or disables passive growth on a cell.
    SetRegenerating {
        /// Cell whose growth flag changes.
        cell: CellId,
        /// Whether the cell should grow on each growth tick.
        regenerating: bool,
    },
    /// Abandons the running session.
    EndSession,
    /// Reverts an abandoned session back into the running state.
    ResumeSession,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that new simulation parameters are active.
    Configured,
    /// Confirms that a new cell layout replaced the previous one.
    ScenarioLoaded {
        /// Number of cells in the new layout.
        cells: u32,
    },
    /// Reports that a growth tick was applied.
    GrowthTicked {
        /// Number of cells that gained force.
        grown: u32,
    },
    /// Confirms that a sender was scheduled.
    TransferQueued {
        /// Identifier allocated to the sender.
        sender: SenderId,
        /// Cell supplying the force.
        source: CellId,
        /// Cell receiving the force.
        target: CellId,
        /// Units the sender will emit.
        count: u32,
        /// How the sender draws force from its source.
        reservation: Reservation,
    },
    /// Reports that a sender deposited one unit onto its arrow.
    BatchLaunched {
        /// Sender that produced the unit.
        sender: SenderId,
        /// Cell supplying the force.
        source: CellId,
        /// Cell receiving the force.
        target: CellId,
        /// Whether the unit joined the newest existing batch.
        merged: bool,
    },
    /// Reports that a sender stopped permanently.
    SenderFinished {
        /// Sender that stopped.
        sender: SenderId,
        /// Why the sender stopped.
        reason: SenderStop,
    },
    /// Reports that a batch reached its target and was resolved.
    BatchArrived {
        /// Cell the batch originated from.
        source: CellId,
        /// Cell the batch was resolved against.
        target: CellId,
        /// Units carried by the batch.
        count: u32,
        /// Effect the batch had on the target.
        outcome: ArrivalOutcome,
    },
    /// Reports that the last batch of an arrow resolved and the arrow was removed.
    ArrowRetired {
        /// Cell the arrow originated from.
        source: CellId,
        /// Cell the arrow pointed at.
        target: CellId,
    },
    /// Reports the per-source totals of a committed distribution.
    DistributionCommitted {
        /// Totals recorded while allocating the distribution.
        summary: DistributionSummary,
    },
    /// Announces that the session ended and every timer stopped.
    SessionEnded {
        /// Why the session ended.
        outcome: SessionOutcome,
        /// Simulated time elapsed since the session started.
        elapsed: Duration,
        /// Units emitted by all senders during the session.
        units_sent: u64,
    },
    /// Announces that an abandoned session resumed.
    SessionResumed,
    /// Reports that a command had no effect.
    CommandIgnored {
        /// Specific reason the command was ignored.
        reason: CommandRejection,
    },
}

/// Side that controls a cell.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    /// Unclaimed cell that never grows.
    #[default]
    Neutral,
    /// The red side.
    Red,
    /// The blue side.
    Blue,
}

/// Unique identifier assigned to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(u32);

impl CellId {
    /// Creates a new cell identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SenderId(u32);

impl SenderId {
    /// Creates a new sender identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Integer location of a cell center in world units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    x: i32,
    y: i32,
}

impl CellPosition {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(self, other: CellPosition) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// Reports whether the position lies inside the rectangle spanned by two corners.
    ///
    /// Edges are inclusive and the corners may be given in any order.
    #[must_use]
    pub fn within(self, corner: CellPosition, opposite: CellPosition) -> bool {
        let (min_x, max_x) = (corner.x.min(opposite.x), corner.x.max(opposite.x));
        let (min_y, max_y) = (corner.y.min(opposite.y), corner.y.max(opposite.y));
        (min_x..=max_x).contains(&self.x) && (min_y..=max_y).contains(&self.y)
    }
}

/// Initial description of a cell used when loading a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSpec {
    /// Center of the cell.
    pub position: CellPosition,
    /// Radius of the cell in world units.
    pub radius: u32,
    /// Side that controls the cell at setup.
    pub owner: Owner,
    /// Garrison present at setup.
    pub force: u32,
}

impl CellSpec {
    /// Creates a new cell description.
    #[must_use]
    pub const fn new(x: i32, y: i32, radius: u32, owner: Owner, force: u32) -> Self {
        Self {
            position: CellPosition::new(x, y),
            radius,
            owner,
            force,
        }
    }
}

/// Describes how a sender draws force from its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reservation {
    /// Force is debited one unit per spawn while the source has any.
    Incremental,
    /// Force was debited in full when the command was accepted.
    PreConsumed,
}

/// Reasons a sender stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SenderStop {
    /// Every requested unit was emitted.
    Exhausted,
    /// The source ran out of force before the sender finished.
    SourceDepleted,
    /// The session ended while the sender was active.
    SessionEnded,
}

/// Effect a resolved batch had on its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrivalOutcome {
    /// The target shared the source's owner and gained the units.
    Reinforced,
    /// The target held and lost the units from its garrison.
    Repelled,
    /// The target fell and the overflow became the new garrison.
    Captured {
        /// Owner that controlled the target before the batch arrived.
        previous: Owner,
    },
}

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// The player controls every cell.
    Victory,
    /// The session was abandoned on request.
    Abandoned,
}

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Timers are running and commands are accepted.
    Running,
    /// Timers are stopped.
    Ended(SessionOutcome),
}

/// Reasons a command is ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandRejection {
    /// The session ended, so the command cannot take effect.
    SessionEnded,
    /// A referenced cell does not exist.
    UnknownCell(CellId),
    /// The source cell is not controlled by the player.
    SourceNotOwned,
    /// The source cell has too little force for the command.
    InsufficientForce,
    /// The target repeats a source cell.
    TargetIsSource,
    /// A full-force attack targeted a cell the player already controls.
    TargetOwnedByPlayer,
    /// The command referenced no sources.
    NoSources,
    /// The command referenced no targets.
    NoTargets,
    /// The sources held no force to commit.
    NothingToSend,
    /// The provided configuration failed validation.
    InvalidConfig,
    /// Only abandoned sessions can resume.
    NotResumable,
    /// The session is already running.
    AlreadyRunning,
}

/// Per-source totals recorded while committing a distribution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Units committed across all sources.
    pub total_sent: u64,
    /// Units committed from each source, in command order.
    pub per_source: Vec<(CellId, u32)>,
}

/// Immutable representation of a single cell used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSnapshot {
    /// Identifier allocated to the cell.
    pub id: CellId,
    /// Center of the cell.
    pub position: CellPosition,
    /// Radius of the cell in world units.
    pub radius: u32,
    /// Garrison currently stationed in the cell.
    pub force: u32,
    /// Side that controls the cell.
    pub owner: Owner,
    /// Whether the cell grows on each growth tick.
    pub regenerating: bool,
}

/// Read-only snapshot describing all cells.
#[derive(Clone, Debug, Default)]
pub struct CellView {
    snapshots: Vec<CellSnapshot>,
}

impl CellView {
    /// Creates a new cell view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CellSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured cell snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CellSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single cell.
    #[must_use]
    pub fn get(&self, id: CellId) -> Option<&CellSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Identifiers of the cells controlled by the provided side.
    #[must_use]
    pub fn owned_by(&self, owner: Owner) -> Vec<CellId> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.owner == owner)
            .map(|snapshot| snapshot.id)
            .collect()
    }

    /// Number of captured cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a batch in transit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchSnapshot {
    /// Units carried by the batch.
    pub count: u32,
    /// Seconds until the batch arrives.
    pub remaining: f64,
    /// Travel time the batch was launched with, in seconds.
    pub total: f64,
}

impl BatchSnapshot {
    /// Fraction of the route already covered, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.total).clamp(0.0, 1.0)
    }
}

/// Immutable representation of an arrow and the batches it carries.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowSnapshot {
    /// Cell the arrow originates from.
    pub source: CellId,
    /// Cell the arrow points at.
    pub target: CellId,
    /// Batches in arrival order.
    pub batches: Vec<BatchSnapshot>,
    /// Display weight of the arrow.
    pub source_power: u32,
}

impl ArrowSnapshot {
    /// Total units in transit along the arrow.
    #[must_use]
    pub fn in_flight(&self) -> u32 {
        self.batches.iter().map(|batch| batch.count).sum()
    }
}

/// Read-only snapshot describing all arrows in creation order.
#[derive(Clone, Debug, Default)]
pub struct ArrowView {
    snapshots: Vec<ArrowSnapshot>,
}

impl ArrowView {
    /// Creates a new arrow view that preserves the provided order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ArrowSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured arrows in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ArrowSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the arrow for an ordered cell pair.
    #[must_use]
    pub fn find(&self, source: CellId, target: CellId) -> Option<&ArrowSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.source == source && snapshot.target == target)
    }

    /// Total units in transit along every arrow.
    #[must_use]
    pub fn in_flight(&self) -> u32 {
        self.snapshots.iter().map(ArrowSnapshot::in_flight).sum()
    }

    /// Number of captured arrows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no arrows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ArrowSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a cosmetic pulse cue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseSnapshot {
    /// Center of the pulse.
    pub position: CellPosition,
    /// Current radius of the pulse.
    pub radius: f64,
    /// Seconds before the pulse disappears.
    pub remaining: f64,
}

/// Immutable summary of the session lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current lifecycle state.
    pub state: SessionState,
    /// Simulated time since the session started, frozen once it ends.
    pub elapsed: Duration,
    /// Units emitted by all senders during the session.
    pub units_sent: u64,
}

impl SessionSnapshot {
    /// Reports whether the session ended.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self.state, SessionState::Ended(_))
    }
}

/// Immutable representation of an active sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SenderSnapshot {
    /// Identifier allocated to the sender.
    pub id: SenderId,
    /// Cell supplying the force.
    pub source: CellId,
    /// Cell receiving the force.
    pub target: CellId,
    /// Units still to be emitted.
    pub remaining: u32,
    /// How the sender draws force from its source.
    pub reservation: Reservation,
    /// Simulated time at which the next unit is emitted.
    pub next_spawn: Duration,
}

/// Formats a duration as zero-padded `mm:ss`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn distance_matches_pythagoras() {
        let origin = CellPosition::new(0, 0);
        let destination = CellPosition::new(300, 400);
        assert!((origin.distance(destination) - 500.0).abs() < f64::EPSILON);
        assert!((destination.distance(origin) - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn within_accepts_corners_in_any_order() {
        let position = CellPosition::new(150, 150);
        assert!(position.within(CellPosition::new(100, 100), CellPosition::new(200, 200)));
        assert!(position.within(CellPosition::new(200, 200), CellPosition::new(100, 100)));
        assert!(position.within(CellPosition::new(150, 150), CellPosition::new(150, 150)));
        assert!(!position.within(CellPosition::new(0, 0), CellPosition::new(149, 400)));
    }

    #[test]
    fn batch_progress_is_clamped() {
        let fresh = BatchSnapshot {
            count: 1,
            remaining: 2.5,
            total: 2.5,
        };
        let halfway = BatchSnapshot {
            remaining: 1.25,
            ..fresh
        };
        let overdue = BatchSnapshot {
            remaining: -0.1,
            ..fresh
        };
        assert!(fresh.progress().abs() < f64::EPSILON);
        assert!((halfway.progress() - 0.5).abs() < f64::EPSILON);
        assert!((overdue.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cell_view_sorts_and_finds_by_identifier() {
        let snapshot = |id: u32, owner: Owner| CellSnapshot {
            id: CellId::new(id),
            position: CellPosition::new(0, 0),
            radius: 10,
            force: id,
            owner,
            regenerating: true,
        };
        let view = CellView::from_snapshots(vec![
            snapshot(2, Owner::Blue),
            snapshot(0, Owner::Red),
            snapshot(1, Owner::Red),
        ]);

        let ids: Vec<u32> = view.iter().map(|cell| cell.id.get()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(view.get(CellId::new(2)).map(|cell| cell.force), Some(2));
        assert!(view.get(CellId::new(7)).is_none());
        assert_eq!(view.owned_by(Owner::Red), vec![CellId::new(0), CellId::new(1)]);
    }

    #[test]
    fn format_duration_pads_minutes_and_seconds() {
        assert_eq!(format_duration(Duration::from_millis(65_900)), "01:05");
        assert_eq!(format_duration(Duration::ZERO), "00:00");
    }

    #[test]
    fn cell_spec_round_trips_through_bincode() {
        assert_round_trip(&CellSpec::new(150, 150, 32, Owner::Red, 10));
    }

    #[test]
    fn distribution_summary_round_trips_through_bincode() {
        assert_round_trip(&DistributionSummary {
            total_sent: 9,
            per_source: vec![(CellId::new(0), 4), (CellId::new(3), 5)],
        });
    }
}
