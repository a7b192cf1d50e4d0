use std::time::{Duration, Instant};

/// Drift-corrected frame scheduler.
///
/// Every evaluation consumes exactly one frame delay from the elapsed
/// time. Whatever is left over is carried into the next deadline instead
/// of being dropped, so late ticks do not slow playback down over time.
#[derive(Debug, Clone)]
pub struct FrameClock {
    anchor: Instant,
    carry: Duration,
    due: Instant,
    max_carry: Duration,
}

impl FrameClock {
    /// Start the schedule at `now`, first evaluation after `first_delay`
    pub fn start(now: Instant, first_delay: Duration, max_carry: Duration) -> Self {
        Self {
            anchor: now,
            carry: Duration::ZERO,
            due: now + first_delay,
            max_carry,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }

    pub fn due(&self) -> Instant {
        self.due
    }

    /// Time owed to the schedule from late evaluations
    pub fn carry(&self) -> Duration {
        self.carry
    }

    /// Account for one advance that consumed `nominal`
    pub fn advance(&mut self, now: Instant, nominal: Duration) {
        let elapsed = now.saturating_duration_since(self.anchor);
        self.anchor = now;
        self.carry = (self.carry + elapsed)
            .saturating_sub(nominal)
            .min(self.max_carry);
    }

    /// Schedule the next evaluation `delay` from now, minus what we owe
    pub fn rearm(&mut self, now: Instant, delay: Duration) {
        self.due = now + delay.saturating_sub(self.carry);
    }
}
