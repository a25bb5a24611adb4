//! Rest timer countdown.
//!
//! The timer does not own a clock thread. The host calls [`RestTimer::tick`]
//! once per wall-clock second from the same thread that mutates the
//! session, so the countdown and data entry never race.

/// Notification produced by a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// The countdown moved; seconds still left
    Tick(u32),
    /// The countdown reached zero. Emitted once per countdown.
    Finished,
}

/// A single reusable countdown
#[derive(Clone, Debug, Default)]
pub struct RestTimer {
    remaining: Option<u32>,
    countdown: u64,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown, replacing any countdown already running.
    ///
    /// The replaced countdown is cancelled first, so it can never reach its
    /// own `Finished`.
    pub fn start(&mut self, duration_secs: u32) {
        if self.is_running() {
            tracing::debug!(
                "Replacing rest countdown #{} with {}s left",
                self.countdown,
                self.remaining.unwrap_or_default()
            );
            self.cancel();
        }
        self.countdown += 1;
        self.remaining = Some(duration_secs);
        tracing::debug!("Rest countdown #{} started: {}s", self.countdown, duration_secs);
    }

    /// Stop the countdown without emitting `Finished`. No-op when idle.
    pub fn cancel(&mut self) {
        if self.remaining.take().is_some() {
            tracing::debug!("Rest countdown #{} cancelled", self.countdown);
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `None` while idle.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        let left = self.remaining?;
        let next = left.saturating_sub(1);
        if next == 0 {
            self.remaining = None;
            tracing::debug!("Rest countdown #{} finished", self.countdown);
            Some(TimerEvent::Finished)
        } else {
            self.remaining = Some(next);
            Some(TimerEvent::Tick(next))
        }
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }
}

/// Format seconds as `m:ss` for display
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
