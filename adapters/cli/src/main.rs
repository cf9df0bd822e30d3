#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Neon Conquest session.

mod autoplay;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use neon_conquest_core::{format_duration, Command, Event, SessionState};
use neon_conquest_system_selection::Selection;
use neon_conquest_world::{self as world, query, World};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use autoplay::{Autoplay, Strategy};
use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "neon-conquest")]
#[command(about = "Run a headless Neon Conquest session", long_about = None)]
struct Args {
    /// TOML file with configuration overrides and an optional custom layout
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated seconds to play before abandoning the session
    #[arg(short, long, default_value = "120")]
    duration: f64,

    /// Strategy playing the red side
    #[arg(short, long, value_enum, default_value_t = Strategy::Greedy)]
    strategy: Strategy,

    /// Simulated seconds between strategy decisions
    #[arg(long, default_value = "2")]
    decision_period: f64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Neon Conquest command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let settings = match &args.config {
        Some(path) => settings::load(path)?,
        None => Settings::default(),
    };
    let limit = seconds(args.duration).context("invalid --duration")?;
    let period = seconds(args.decision_period).context("invalid --decision-period")?;

    let mut world = World::new();
    install(&mut world, settings)?;
    play(&mut world, Autoplay::new(args.strategy, period), limit);
    print_summary(&world);
    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")
}

fn seconds(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("{value} is not a valid duration"))
}

fn install(world: &mut World, settings: Settings) -> Result<()> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Configure {
            config: settings.config,
        },
        &mut events,
    );
    if let Some(Event::CommandIgnored { reason }) = events.first() {
        bail!("world rejected configuration: {reason:?}");
    }

    if let Some(cells) = settings.cells {
        events.clear();
        world::apply(world, Command::LoadScenario { cells }, &mut events);
    }
    Ok(())
}

/// Steps the world at the animation cadence until it is won or `limit` passes.
fn play(world: &mut World, mut autoplay: Autoplay, limit: Duration) {
    let config = query::config(world).clone();
    let mut selection = Selection::default();
    let mut events = Vec::new();

    info!(cells = query::cells(world).len(), ?limit, "session started");
    while query::now(world) < limit && !query::session(world).is_ended() {
        let cells = query::cells(world);
        let intents = autoplay.decide(query::now(world), &cells, config.player);

        let mut commands = Vec::new();
        selection.handle(&events, &intents, &cells, config.player, &mut commands);

        events.clear();
        for command in commands {
            world::apply(world, command, &mut events);
        }
        for event in &events {
            if let Event::CommandIgnored { reason } = event {
                debug!(?reason, "order rejected");
            }
        }
        world::apply(
            world,
            Command::Tick {
                dt: config.animation_step(),
            },
            &mut events,
        );
    }

    if !query::session(world).is_ended() {
        events.clear();
        world::apply(world, Command::EndSession, &mut events);
    }
}

fn print_summary(world: &World) {
    let session = query::session(world);
    let outcome = match session.state {
        SessionState::Running => "running".to_owned(),
        SessionState::Ended(outcome) => format!("{outcome:?}").to_lowercase(),
    };

    println!("outcome: {outcome}");
    println!("duration: {}", format_duration(session.elapsed));
    println!("units sent: {}", session.units_sent);
    println!("in flight: {}", query::in_flight(world));
    println!("{:>4} {:>8} {:>6}", "cell", "owner", "force");
    for cell in query::cells(world).iter() {
        println!(
            "{:>4} {:>8} {:>6}",
            cell.id.get(),
            format!("{:?}", cell.owner).to_lowercase(),
            cell.force
        );
    }
}
