use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    /// Never started; elapsed is zero.
    Stopped,
    Running,
    /// Started and frozen; elapsed is greater than zero.
    Paused,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Stopped
    }
}

/// Pause-adjusted stopwatch over a monotonic clock. Wall-clock jumps cannot
/// move elapsed time backwards because intervals are measured with `Instant`;
/// wall time is only ever captured separately for note timestamps.
///
/// Every transition takes an explicit `now` so the arithmetic is testable with
/// simulated instants.
#[derive(Debug, Clone, Copy)]
pub struct TimerState {
    pub status: TimerStatus,
    /// Cached display value, refreshed by `sync_elapsed` on the tick cadence.
    pub elapsed_seconds: f64,
    /// Time accumulated from earlier running windows; combines with
    /// `running_anchor` to compute the true elapsed duration.
    elapsed_baseline: Duration,
    running_anchor: Option<Instant>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            status: TimerStatus::Stopped,
            elapsed_seconds: 0.0,
            elapsed_baseline: Duration::ZERO,
            running_anchor: None,
        }
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Stopped -> Running. No-op in any other state.
    pub fn start(&mut self, now: Instant) {
        if self.status != TimerStatus::Stopped {
            return;
        }
        self.elapsed_baseline = Duration::ZERO;
        self.running_anchor = Some(now);
        self.status = TimerStatus::Running;
    }

    /// Running -> Paused: freezes elapsed as the new baseline.
    pub fn pause(&mut self, now: Instant) {
        if self.status != TimerStatus::Running {
            return;
        }
        if let Some(anchor) = self.running_anchor.take() {
            self.elapsed_baseline += now.saturating_duration_since(anchor);
        }
        self.elapsed_seconds = self.elapsed_baseline.as_secs_f64();
        self.status = TimerStatus::Paused;
    }

    /// Paused -> Running: elapsed continues climbing from the frozen baseline.
    pub fn resume(&mut self, now: Instant) {
        if self.status != TimerStatus::Paused {
            return;
        }
        self.running_anchor = Some(now);
        self.status = TimerStatus::Running;
    }

    /// Back to Stopped with zero elapsed. Only a new session does this.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Re-enters Paused with a persisted elapsed snapshot, as when a saved
    /// session is loaded. Zero elapsed means the session never started.
    /// Snapshots come from storage and are untrusted: anything a `Duration`
    /// cannot represent (NaN, negative, out of range) restores to zero.
    pub fn restore_elapsed(&mut self, elapsed_seconds: f64) {
        let baseline = Duration::try_from_secs_f64(elapsed_seconds).unwrap_or(Duration::ZERO);
        self.elapsed_baseline = baseline;
        self.running_anchor = None;
        self.elapsed_seconds = baseline.as_secs_f64();
        self.status = if baseline > Duration::ZERO {
            TimerStatus::Paused
        } else {
            TimerStatus::Stopped
        };
    }

    /// Elapsed time as of `now`. Pure; does not touch the cached value.
    pub fn elapsed_at(&self, now: Instant) -> f64 {
        match (self.status, self.running_anchor) {
            (TimerStatus::Running, Some(anchor)) => {
                (self.elapsed_baseline + now.saturating_duration_since(anchor)).as_secs_f64()
            }
            _ => self.elapsed_baseline.as_secs_f64(),
        }
    }

    /// Refreshes the cached display value. Idempotent; safe to call on every
    /// tick.
    pub fn sync_elapsed(&mut self, now: Instant) {
        self.elapsed_seconds = self.elapsed_at(now);
    }
}
