//! Simulated clock that interleaves the periodic timers of the world.

use std::time::Duration;

use neon_conquest_core::Config;

/// Periodic callbacks driven by the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Timer {
    /// Passive growth of owned cells.
    Growth,
    /// Spawn of the earliest pending sender.
    Spawn,
    /// Batch advancement, arrival resolution and victory evaluation.
    Animation,
}

/// Tracks simulated time and the next deadline of each world-owned timer.
///
/// Sender deadlines live in the sender schedule and are passed in when the
/// next timer is selected.
#[derive(Debug, Default)]
pub(crate) struct Timeline {
    now: Duration,
    growth_due: Option<Duration>,
    animation_due: Option<Duration>,
}

impl Timeline {
    pub(crate) const fn now(&self) -> Duration {
        self.now
    }

    /// Arms the growth and animation timers relative to the current time.
    pub(crate) fn start(&mut self, config: &Config) {
        self.growth_due = self.now.checked_add(config.growth_period());
        self.animation_due = self.now.checked_add(config.animation_step());
    }

    pub(crate) fn stop(&mut self) {
        self.growth_due = None;
        self.animation_due = None;
    }

    /// Selects the earliest timer due no later than `horizon`.
    ///
    /// Timers due at the same instant fire growth first, then sender spawns,
    /// then the animation step.
    pub(crate) fn next(
        &self,
        horizon: Duration,
        spawn_due: Option<Duration>,
    ) -> Option<(Duration, Timer)> {
        [
            (self.growth_due, Timer::Growth),
            (spawn_due, Timer::Spawn),
            (self.animation_due, Timer::Animation),
        ]
        .into_iter()
        .filter_map(|(due, timer)| due.map(|due| (due, timer)))
        .filter(|(due, _)| *due <= horizon)
        .min()
    }

    /// Moves the clock to `at` and re-arms the fired timer.
    ///
    /// A timer whose next deadline is past the end of time stays disarmed.
    pub(crate) fn fire(&mut self, at: Duration, timer: Timer, config: &Config) {
        self.now = self.now.max(at);
        match timer {
            Timer::Growth => self.growth_due = at.checked_add(config.growth_period()),
            Timer::Animation => self.animation_due = at.checked_add(config.animation_step()),
            Timer::Spawn => {}
        }
    }

    /// Moves the clock to the end of a tick once no timer is left to fire.
    pub(crate) fn settle(&mut self, horizon: Duration) {
        self.now = self.now.max(horizon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_timeline_fires_nothing() {
        let timeline = Timeline::default();
        assert!(timeline.next(Duration::from_secs(10), None).is_none());
    }

    #[test]
    fn ties_prefer_growth_then_spawn_then_animation() {
        let config = Config {
            growth_period_ms: 1_000,
            animation_step_ms: 1_000,
            ..Config::default()
        };
        let mut timeline = Timeline::default();
        timeline.start(&config);

        let second = Duration::from_secs(1);
        assert_eq!(
            timeline.next(second, Some(second)),
            Some((second, Timer::Growth))
        );
        timeline.fire(second, Timer::Growth, &config);
        assert_eq!(
            timeline.next(second, Some(second)),
            Some((second, Timer::Spawn))
        );
        assert_eq!(timeline.next(second, None), Some((second, Timer::Animation)));
    }

    #[test]
    fn timers_past_the_end_of_time_disarm() {
        let config = Config::default();
        let mut timeline = Timeline::default();
        let end = Duration::MAX - Duration::from_millis(10);
        timeline.fire(end, Timer::Growth, &config);
        timeline.fire(end, Timer::Animation, &config);

        assert_eq!(timeline.now(), end);
        assert!(timeline.next(Duration::MAX, None).is_none());
    }

    #[test]
    fn timers_beyond_horizon_wait() {
        let config = Config::default();
        let mut timeline = Timeline::default();
        timeline.start(&config);

        assert!(timeline.next(Duration::from_millis(32), None).is_none());
        timeline.settle(Duration::from_millis(32));
        assert_eq!(timeline.now(), Duration::from_millis(32));
        assert_eq!(
            timeline.next(Duration::from_millis(33), None),
            Some((Duration::from_millis(33), Timer::Animation))
        );
    }
}
