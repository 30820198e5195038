use chrono::TimeDelta;

use crate::calendar::WorkCalendar;
use crate::timestamp::Timestamp;

/// Sampling step, and the credit each in-hours sample earns.
pub const STEP_MINUTES: i64 = 10;

/// Business minutes between two instants.
///
/// Samples `[start, end]` every [`STEP_MINUTES`], counting `end` itself when a
/// step lands on it, and credits a full step for each sample that falls in
/// business time. The result is always a non-negative multiple of the step.
pub fn business_minutes(start: &Timestamp, end: &Timestamp, calendar: &WorkCalendar) -> i64 {
    if start > end {
        tracing::warn!("start {start} is after end {end}; counting 0 business minutes");
        return 0;
    }

    let step = TimeDelta::minutes(STEP_MINUTES);
    let end = *end.as_datetime();
    let mut current = *start.as_datetime();
    let mut total = 0;

    while current <= end {
        if calendar.is_business_time(&current) {
            total += STEP_MINUTES;
        }
        current += step;
    }

    total
}
