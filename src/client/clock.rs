use time::OffsetDateTime;
use tokio::time::Instant;

/// Wall-clock reader. Remaining time is always derived from it and the attempt's `startTime`.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Wall time that advances with tokio's clock, so a paused runtime can drive it.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredClock {
    wall: OffsetDateTime,
    anchor: Instant,
}

impl AnchoredClock {
    pub fn new(wall: OffsetDateTime) -> Self {
        Self { wall, anchor: Instant::now() }
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> OffsetDateTime {
        self.wall + self.anchor.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use time::macros::datetime;

    #[tokio::test(start_paused = true)]
    async fn anchored_clock_follows_tokio_time() {
        let clock = AnchoredClock::new(datetime!(2025-03-01 09:00:00 UTC));
        assert_eq!(clock.now(), datetime!(2025-03-01 09:00:00 UTC));

        tokio::time::advance(Duration::from_secs(90)).await;
        assert_eq!(clock.now(), datetime!(2025-03-01 09:01:30 UTC));
    }
}
