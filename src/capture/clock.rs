use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Refresh rate assumed when nobody says otherwise.
const DEFAULT_REFRESH_HZ: u32 = 60;

/// Display-refresh signal.
///
/// The host calls [`tick`](Self::tick) from its refresh callback, or lets
/// [`spawn_ticker`](Self::spawn_ticker) approximate one. Waiters on
/// [`next_frame`](Self::next_frame) resume on the next tick after they
/// started waiting, or after one refresh period if no tick comes.
pub struct RefreshClock {
    notify: Notify,
    ticks: AtomicU64,
    period: Duration,
}

impl RefreshClock {
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_REFRESH_HZ)
    }

    /// Clock whose refresh wait gives up after one period at `hz`.
    pub fn with_rate(hz: u32) -> Self {
        Self {
            notify: Notify::new(),
            ticks: AtomicU64::new(0),
            period: refresh_period(hz),
        }
    }

    /// Length of one refresh.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Signal one display refresh.
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.notify.notify_waiters();
    }

    /// Number of refreshes signalled so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Wait for the next refresh, at most one period.
    ///
    /// Returns `false` when the period elapsed without a tick, i.e. nothing
    /// is driving the clock.
    pub async fn next_frame(&self) -> bool {
        tokio::select! {
            _ = self.notify.notified() => true,
            _ = tokio::time::sleep(self.period) => {
                tracing::debug!("no refresh tick within {:?}", self.period);
                false
            }
        }
    }

    /// Drive the clock from a timer at `hz` refreshes per second.
    ///
    /// The task exits once the clock is dropped.
    pub fn spawn_ticker(self: &Arc<Self>, hz: u32) -> JoinHandle<()> {
        let clock: Weak<Self> = Arc::downgrade(self);
        let period = refresh_period(hz);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match clock.upgrade() {
                    Some(clock) => clock.tick(),
                    None => break,
                }
            }
        })
    }
}

fn refresh_period(hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(hz.max(1)))
}

impl Default for RefreshClock {
    fn default() -> Self {
        Self::new()
    }
}
