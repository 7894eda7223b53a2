//! Periodic tick source for a running session.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::session::SessionIntent;

/// Tick period. Elapsed time is recomputed from timestamps on every read, so
/// this only bounds display refresh and time-up detection latency, never
/// accuracy.
pub const TICK_PERIOD: Duration = Duration::from_millis(100);

/// Background task feeding `SessionIntent::Tick` into a dispatch channel.
///
/// Missed ticks are skipped rather than replayed; a burst of catch-up ticks
/// after the process was suspended would be pure noise since every tick
/// recomputes from the clock.
pub struct SessionTicker {
    handle: JoinHandle<()>,
}

impl SessionTicker {
    /// Spawn the tick loop. It stops on its own when the receiving side of
    /// the channel is dropped.
    #[must_use]
    pub fn spawn(sender: UnboundedSender<SessionIntent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if sender.send(SessionIntent::Tick).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for SessionTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
