use time::{format_description::well_known::Rfc3339, Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Current instant truncated to whole seconds, the resolution stored for attempt timestamps.
pub(crate) fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

pub(crate) fn format_offset(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}

/// Combines a calendar date and wall-clock time into a UTC instant.
pub(crate) fn at_utc(date: Date, time: Time) -> OffsetDateTime {
    PrimitiveDateTime::new(date, time).assume_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Month, UtcOffset};

    #[test]
    fn format_offset_outputs_utc_z() {
        let date = Date::from_calendar_date(2025, Month::January, 2).unwrap();
        let value = at_utc(date, Time::from_hms(10, 20, 30).unwrap());
        assert_eq!(format_offset(value), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn format_offset_preserves_offset() {
        let date = Date::from_calendar_date(2025, Month::January, 2).unwrap();
        let utc = at_utc(date, Time::from_hms(10, 20, 30).unwrap());
        let shifted = utc.to_offset(UtcOffset::from_hms(3, 0, 0).unwrap());
        assert_eq!(format_offset(shifted), "2025-01-02T13:20:30+03:00");
    }

    #[test]
    fn now_utc_has_no_subsecond_part() {
        assert_eq!(now_utc().nanosecond(), 0);
    }
}
