use std::time::Duration;

use neon_conquest_core::{CellId, CellPosition, Command, Event, Owner};
use neon_conquest_system_selection::{Intent, Selection};
use neon_conquest_world::{self as world, query, World};

fn drive(
    world: &mut World,
    selection: &mut Selection,
    events: &[Event],
    intents: &[Intent],
) -> Vec<Event> {
    let mut commands = Vec::new();
    let player = query::config(world).player;
    selection.handle(
        events,
        intents,
        &query::cells(world),
        player,
        &mut commands,
    );

    let mut produced = Vec::new();
    for command in commands {
        world::apply(world, command, &mut produced);
    }
    produced
}

#[test]
fn box_selected_attack_is_queued_by_the_world() {
    let mut world = World::new();
    let mut selection = Selection::default();

    let events = drive(
        &mut world,
        &mut selection,
        &[],
        &[
            Intent::BoxSelect {
                corner: CellPosition::new(100, 100),
                opposite: CellPosition::new(200, 200),
            },
            Intent::CommitAttack {
                target: CellId::new(1),
            },
        ],
    );

    assert!(matches!(
        events.as_slice(),
        [Event::TransferQueued { count: 10, .. }]
    ));
    assert!(selection.is_empty());
    assert_eq!(query::cell(&world, CellId::new(0)).map(|cell| cell.force), Some(0));

    let mut events = Vec::new();
    for _ in 0..20 {
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
    }
    assert_eq!(
        query::cell(&world, CellId::new(1)).map(|cell| cell.owner),
        Some(Owner::Red)
    );
}

#[test]
fn distribution_commit_reaches_every_target() {
    let mut world = World::new();
    let mut selection = Selection::default();

    let events = drive(
        &mut world,
        &mut selection,
        &[],
        &[
            Intent::SelectAllOwned,
            Intent::ToggleTarget(CellId::new(3)),
            Intent::ToggleTarget(CellId::new(4)),
            Intent::CommitDistribution,
        ],
    );

    let committed = events.iter().find_map(|event| match event {
        Event::DistributionCommitted { summary } => Some(summary.clone()),
        _ => None,
    });
    let summary = committed.expect("distribution committed");
    assert_eq!(summary.total_sent, 10);
    assert_eq!(summary.per_source, vec![(CellId::new(0), 10)]);
    assert_eq!(query::pulses(&world).len(), 2);
}
