use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use neon_conquest_core::{CellId, CellSnapshot, Command, Event, Owner};
use neon_conquest_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_outcome() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first.cells.iter().any(|cell| cell.owner == Owner::Red && cell.id != 0),
        "scripted attack never captured anything"
    );
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new();
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        record_events(&events, &mut log);
    }

    let cells = query::cells(&world)
        .into_vec()
        .into_iter()
        .map(CellState::from)
        .collect();

    ReplayOutcome { cells, events: log }
}

fn record_events(events: &[Event], log: &mut Vec<String>) {
    log.extend(events.iter().map(|event| format!("{event:?}")));
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::SendHalf {
            source: CellId::new(0),
            target: CellId::new(1),
        },
        Command::Tick {
            dt: Duration::from_millis(500),
        },
        Command::SendAll {
            sources: vec![CellId::new(0)],
            target: CellId::new(3),
        },
    ];
    for _ in 0..6 {
        commands.push(Command::Tick {
            dt: Duration::from_secs(1),
        });
    }
    commands.push(Command::Distribute {
        sources: vec![CellId::new(0), CellId::new(1), CellId::new(3)],
        targets: vec![CellId::new(4), CellId::new(2)],
    });
    for _ in 0..12 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(750),
        });
    }
    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    cells: Vec<CellState>,
    events: Vec<String>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CellState {
    id: u32,
    owner: Owner,
    force: u32,
    regenerating: bool,
}

impl From<CellSnapshot> for CellState {
    fn from(snapshot: CellSnapshot) -> Self {
        Self {
            id: snapshot.id.get(),
            owner: snapshot.owner,
            force: snapshot.force,
            regenerating: snapshot.regenerating,
        }
    }
}
