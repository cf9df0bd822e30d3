//! Tuning parameters shared by the world and its adapters.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Owner;

/// Travel speed of force in transit measured in world units per second.
pub const DEFAULT_TRANSFER_SPEED: f64 = 120.0;
/// Cadence at which a sender emits a single unit.
pub const DEFAULT_SPAWN_INTERVAL_MS: u64 = 250;
/// Period of the passive growth tick.
pub const DEFAULT_GROWTH_PERIOD_MS: u64 = 1_000;
/// Duration of a single animation step (roughly 30 Hz).
pub const DEFAULT_ANIMATION_STEP_MS: u64 = 33;
/// Maximum travel time difference for two batches to merge.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 0.05;
/// Lifetime of a pulse cue in seconds.
pub const DEFAULT_PULSE_LIFETIME: f64 = 0.6;
/// Radius a pulse cue starts with.
pub const DEFAULT_PULSE_INITIAL_RADIUS: f64 = 12.0;
/// Radius growth of a pulse cue per second.
pub const DEFAULT_PULSE_GROWTH: f64 = 60.0;

/// Simulation parameters installed into the world via [`crate::Command::Configure`].
///
/// Every field falls back to its default when omitted from a serialized
/// source, so adapters can load partial TOML documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Side the local player commands.
    pub player: Owner,
    /// Travel speed of batches in world units per second.
    pub transfer_speed: f64,
    /// Milliseconds between two spawns of the same sender.
    pub spawn_interval_ms: u64,
    /// Milliseconds between two growth ticks.
    pub growth_period_ms: u64,
    /// Milliseconds covered by one animation step.
    pub animation_step_ms: u64,
    /// Seconds within which a new batch merges into the newest batch of its arrow.
    pub merge_tolerance: f64,
    /// Seconds a pulse cue stays visible.
    pub pulse_lifetime: f64,
    /// Radius a pulse cue starts with.
    pub pulse_initial_radius: f64,
    /// Radius growth of a pulse cue per second.
    pub pulse_growth: f64,
}

impl Config {
    /// Interval between two spawns of the same sender.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Period of the passive growth tick.
    #[must_use]
    pub const fn growth_period(&self) -> Duration {
        Duration::from_millis(self.growth_period_ms)
    }

    /// Duration covered by a single animation step.
    #[must_use]
    pub const fn animation_step(&self) -> Duration {
        Duration::from_millis(self.animation_step_ms)
    }

    /// Checks that every parameter lies within its supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player == Owner::Neutral {
            return Err(ConfigError::NeutralPlayer);
        }
        if !(self.transfer_speed.is_finite() && self.transfer_speed > 0.0) {
            return Err(ConfigError::TransferSpeed(self.transfer_speed));
        }
        for (name, value) in [
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("growth_period_ms", self.growth_period_ms),
            ("animation_step_ms", self.animation_step_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval(name));
            }
        }
        if !(self.merge_tolerance.is_finite() && self.merge_tolerance >= 0.0) {
            return Err(ConfigError::MergeTolerance(self.merge_tolerance));
        }
        if !(self.pulse_lifetime.is_finite() && self.pulse_lifetime > 0.0) {
            return Err(ConfigError::PulseLifetime(self.pulse_lifetime));
        }
        if !(self.pulse_initial_radius.is_finite() && self.pulse_growth.is_finite()) {
            return Err(ConfigError::PulseGeometry);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player: Owner::Red,
            transfer_speed: DEFAULT_TRANSFER_SPEED,
            spawn_interval_ms: DEFAULT_SPAWN_INTERVAL_MS,
            growth_period_ms: DEFAULT_GROWTH_PERIOD_MS,
            animation_step_ms: DEFAULT_ANIMATION_STEP_MS,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
            pulse_lifetime: DEFAULT_PULSE_LIFETIME,
            pulse_initial_radius: DEFAULT_PULSE_INITIAL_RADIUS,
            pulse_growth: DEFAULT_PULSE_GROWTH,
        }
    }
}

/// Reasons a [`Config`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The player side may not be neutral.
    #[error("the player side must be red or blue")]
    NeutralPlayer,
    /// Transfer speed must be positive and finite.
    #[error("transfer speed must be a positive finite number, got {0}")]
    TransferSpeed(f64),
    /// One of the timer intervals was zero.
    #[error("`{0}` must be greater than zero")]
    ZeroInterval(&'static str),
    /// Merge tolerance must be non-negative and finite.
    #[error("merge tolerance must be a non-negative finite number, got {0}")]
    MergeTolerance(f64),
    /// Pulse lifetime must be positive and finite.
    #[error("pulse lifetime must be a positive finite number, got {0}")]
    PulseLifetime(f64),
    /// Pulse radius parameters must be finite.
    #[error("pulse radius parameters must be finite")]
    PulseGeometry,
}
