//! Lifecycle of a conquest session.

use std::time::Duration;

use neon_conquest_core::{SessionOutcome, SessionSnapshot, SessionState};

#[derive(Debug)]
pub(crate) struct Session {
    state: SessionState,
    started_at: Duration,
    ended_at: Option<Duration>,
    units_sent: u64,
}

impl Session {
    pub(crate) const fn start(now: Duration) -> Self {
        Self {
            state: SessionState::Running,
            started_at: now,
            ended_at: None,
            units_sent: 0,
        }
    }

    pub(crate) const fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running)
    }

    pub(crate) fn record_unit_sent(&mut self) {
        self.units_sent = self.units_sent.saturating_add(1);
    }

    pub(crate) const fn units_sent(&self) -> u64 {
        self.units_sent
    }

    /// Transitions into the ended state, returning the elapsed time.
    ///
    /// Returns `None` if the session already ended.
    pub(crate) fn end(&mut self, outcome: SessionOutcome, now: Duration) -> Option<Duration> {
        if !self.is_running() {
            return None;
        }
        self.state = SessionState::Ended(outcome);
        self.ended_at = Some(now);
        Some(now.saturating_sub(self.started_at))
    }

    /// Reverts an abandoned session. Victories are final.
    pub(crate) fn resume(&mut self) -> bool {
        if self.state != SessionState::Ended(SessionOutcome::Abandoned) {
            return false;
        }
        self.state = SessionState::Running;
        self.ended_at = None;
        true
    }

    pub(crate) fn snapshot(&self, now: Duration) -> SessionSnapshot {
        let until = self.ended_at.unwrap_or(now);
        SessionSnapshot {
            state: self.state,
            elapsed: until.saturating_sub(self.started_at),
            units_sent: self.units_sent,
        }
    }
}
