use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use crate::client::clock::Clock;
use crate::services::attempt_timing::remaining_seconds;

const TICK: Duration = Duration::from_secs(1);

/// One-second ticker for an in-progress attempt. Each tick re-derives the remaining time from
/// `startTime` and the clock, so a delayed tick never drifts the figure.
#[derive(Debug)]
pub struct Countdown {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Returns `None` without spawning when no time is left; the caller submits right away.
    /// `on_expiry` runs at most once, from the ticking task.
    pub fn start<F>(
        clock: Arc<dyn Clock>,
        duration_minutes: i32,
        started_at: OffsetDateTime,
        remaining_tx: Arc<watch::Sender<u64>>,
        on_expiry: F,
    ) -> Option<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let initial = remaining_seconds(duration_minutes, started_at, clock.now());
        remaining_tx.send_replace(initial);
        if initial == 0 {
            return None;
        }

        let (stop, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut tick = interval_at(Instant::now() + TICK, TICK);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = stop_rx.changed() => return,
                    _ = tick.tick() => {
                        let remaining = remaining_seconds(duration_minutes, started_at, clock.now());
                        remaining_tx.send_replace(remaining);
                        if remaining == 0 {
                            break;
                        }
                    }
                }
            }

            tracing::debug!(started_at = %started_at, "Countdown reached zero");
            on_expiry();
        });

        Some(Self { stop, handle })
    }

    pub fn cancel(&self) {
        let _ = self.stop.send(true);
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
