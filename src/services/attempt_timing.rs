//! Time arithmetic shared by the API and the client lifecycle.
//!
//! Only an attempt's `startTime` is durable, so every remaining/elapsed figure is derived
//! from it and the current wall clock rather than from any running counter.

use thiserror::Error;
use time::{Date, Duration, OffsetDateTime, Time};

use crate::core::time::at_utc;

/// Why an assessment cannot be timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleIssue {
    #[error("test has no duration configured")]
    MissingDuration,
    #[error("test duration must be positive")]
    NonPositiveDuration,
    #[error("test has no scheduled date")]
    MissingDate,
    #[error("test has no start time")]
    MissingStartTime,
    #[error("test has no end time")]
    MissingEndTime,
    #[error("test end time is not after its start time")]
    EmptyWindow,
}

/// The span during which a new attempt may be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartWindow {
    pub opens_at: OffsetDateTime,
    pub closes_at: OffsetDateTime,
}

impl StartWindow {
    pub fn contains(&self, now: OffsetDateTime) -> bool {
        self.opens_at <= now && now <= self.closes_at
    }
}

pub fn validate_duration(duration_minutes: Option<i32>) -> Result<i32, ScheduleIssue> {
    match duration_minutes {
        None => Err(ScheduleIssue::MissingDuration),
        Some(minutes) if minutes <= 0 => Err(ScheduleIssue::NonPositiveDuration),
        Some(minutes) => Ok(minutes),
    }
}

pub fn start_window(
    duration_minutes: Option<i32>,
    scheduled_date: Option<Date>,
    start_time: Option<Time>,
    end_time: Option<Time>,
) -> Result<StartWindow, ScheduleIssue> {
    validate_duration(duration_minutes)?;
    let date = scheduled_date.ok_or(ScheduleIssue::MissingDate)?;
    let start = start_time.ok_or(ScheduleIssue::MissingStartTime)?;
    let end = end_time.ok_or(ScheduleIssue::MissingEndTime)?;
    if end <= start {
        return Err(ScheduleIssue::EmptyWindow);
    }

    Ok(StartWindow { opens_at: at_utc(date, start), closes_at: at_utc(date, end) })
}

pub fn deadline(started_at: OffsetDateTime, duration_minutes: i32) -> OffsetDateTime {
    started_at + Duration::minutes(duration_minutes as i64)
}

/// Whole seconds elapsed since `from`, rounded down; a `to` before `from` counts as zero.
pub fn elapsed_seconds(from: OffsetDateTime, to: OffsetDateTime) -> u64 {
    let elapsed_ms = (to - from).whole_milliseconds();
    if elapsed_ms <= 0 {
        return 0;
    }
    (elapsed_ms / 1000) as u64
}

/// `duration − floor((now − startTime) / 1s)`, clamped at zero.
pub fn remaining_seconds(duration_minutes: i32, started_at: OffsetDateTime, now: OffsetDateTime) -> u64 {
    let total = (duration_minutes.max(0) as u64) * 60;
    total.saturating_sub(elapsed_seconds(started_at, now))
}

/// Submissions stay acceptable for `grace_seconds` past the deadline to absorb the client's
/// auto-submit racing it. A cutoff beyond the representable range never closes.
pub(crate) fn accepts_submission(
    started_at: OffsetDateTime,
    duration_minutes: i32,
    now: OffsetDateTime,
    grace_seconds: u64,
) -> bool {
    let cutoff = i64::try_from(grace_seconds)
        .ok()
        .and_then(|grace| deadline(started_at, duration_minutes).checked_add(Duration::seconds(grace)));
    cutoff.map_or(true, |cutoff| now <= cutoff)
}
