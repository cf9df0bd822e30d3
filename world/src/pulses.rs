//! Short-lived cosmetic cues emitted at distribution targets.

use neon_conquest_core::{CellPosition, Config, PulseSnapshot};

#[derive(Clone, Copy, Debug)]
struct Pulse {
    position: CellPosition,
    radius: f64,
    remaining: f64,
}

#[derive(Debug, Default)]
pub(crate) struct Pulses {
    active: Vec<Pulse>,
}

impl Pulses {
    pub(crate) fn emit(&mut self, position: CellPosition, config: &Config) {
        self.active.push(Pulse {
            position,
            radius: config.pulse_initial_radius,
            remaining: config.pulse_lifetime,
        });
    }

    /// Ages every pulse by `dt` seconds and drops the expired ones.
    pub(crate) fn advance(&mut self, dt: f64, config: &Config) {
        for pulse in &mut self.active {
            pulse.remaining -= dt;
            pulse.radius += dt * config.pulse_growth;
        }
        self.active.retain(|pulse| pulse.remaining > 0.0);
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }

    pub(crate) fn snapshots(&self) -> Vec<PulseSnapshot> {
        self.active
            .iter()
            .map(|pulse| PulseSnapshot {
                position: pulse.position,
                radius: pulse.radius,
                remaining: pulse.remaining,
            })
            .collect()
    }
}
