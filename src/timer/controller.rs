use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};

use super::{TimerState, TimerStatus};

/// Display-refresh cadence while the timer is running.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub elapsed_seconds: f64,
}

/// Drives the timer state machine and owns the background ticker that
/// refreshes the cached elapsed value every 100ms while running. Snapshots are
/// published over a watch channel for display consumers.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    snapshot_tx: watch::Sender<TimerSnapshot>,
}

impl TimerController {
    pub fn new() -> Self {
        let state = TimerState::new();
        let (snapshot_tx, _) = watch::channel(TimerSnapshot {
            status: state.status,
            elapsed_seconds: state.elapsed_seconds,
        });
        Self {
            state: Arc::new(Mutex::new(state)),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: TICK_INTERVAL,
            snapshot_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        let mut guard = self.state.lock().await;
        guard.sync_elapsed(Instant::now());
        snapshot_of(&guard)
    }

    /// Elapsed seconds as of the call instant, whatever the tick cadence last
    /// cached. Note recording reads this, never the display value.
    pub async fn elapsed_seconds(&self) -> f64 {
        self.state.lock().await.elapsed_at(Instant::now())
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.is_running()
    }

    /// Start from Stopped, or resume from Paused. No-op while Running.
    pub async fn start(&self) {
        {
            let mut guard = self.state.lock().await;
            let now = Instant::now();
            match guard.status {
                TimerStatus::Stopped => guard.start(now),
                TimerStatus::Paused => guard.resume(now),
                TimerStatus::Running => return,
            }
        }
        self.spawn_ticker().await;
        self.publish().await;
    }

    /// Freeze elapsed and cancel the ticker. No-op unless Running.
    pub async fn pause(&self) {
        {
            let mut guard = self.state.lock().await;
            if !guard.is_running() {
                return;
            }
            guard.pause(Instant::now());
        }
        self.cancel_ticker().await;
        self.publish().await;
    }

    pub async fn toggle(&self) {
        if self.is_running().await {
            self.pause().await;
        } else {
            self.start().await;
        }
    }

    /// Zero out for a fresh session.
    pub async fn reset(&self) {
        self.state.lock().await.reset();
        self.cancel_ticker().await;
        self.publish().await;
    }

    /// Adopt a persisted elapsed snapshot; always lands in Paused (or Stopped
    /// when the snapshot is zero), never auto-resumes.
    pub async fn restore(&self, elapsed_seconds: f64) {
        self.state.lock().await.restore_elapsed(elapsed_seconds);
        self.cancel_ticker().await;
        self.publish().await;
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        // A stale ticker is aborted first so double-registration can never
        // produce duplicate tickers.
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            loop {
                interval.tick().await;
                let snapshot = {
                    let mut guard = state.lock().await;
                    if !guard.is_running() {
                        break;
                    }
                    guard.sync_elapsed(Instant::now());
                    snapshot_of(&guard)
                };
                snapshot_tx.send_replace(snapshot);
            }
        });

        *ticker_guard = Some(handle);
    }

    /// Safe to call when no ticker is registered.
    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn publish(&self) {
        let mut guard = self.state.lock().await;
        guard.sync_elapsed(Instant::now());
        let snapshot = snapshot_of(&guard);
        drop(guard);
        self.snapshot_tx.send_replace(snapshot);
    }
}

impl Default for TimerController {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot_of(state: &TimerState) -> TimerSnapshot {
    TimerSnapshot {
        status: state.status,
        elapsed_seconds: state.elapsed_seconds,
    }
}
