use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Weekday};

use crate::config::CalendarConfig;
use crate::error::{Error, Result};
use crate::holidays::HolidayCalendar;

/// Business-hour policy: daily windows, excluded weekdays and public holidays.
///
/// Built once from configuration and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct WorkCalendar {
    windows: Vec<(NaiveTime, NaiveTime)>,
    non_business_days: Vec<Weekday>,
    holidays: HolidayCalendar,
}

impl WorkCalendar {
    pub fn new(
        windows: Vec<(NaiveTime, NaiveTime)>,
        non_business_days: Vec<Weekday>,
        holidays: HolidayCalendar,
    ) -> Self {
        Self {
            windows,
            non_business_days,
            holidays,
        }
    }

    pub fn from_config(config: &CalendarConfig) -> Result<Self> {
        let windows = config
            .work_hours
            .iter()
            .map(|hours| Ok((parse_time(&hours.start)?, parse_time(&hours.end)?)))
            .collect::<Result<Vec<_>>>()?;

        let non_business_days = config
            .weekends
            .iter()
            .map(|name| {
                name.parse::<Weekday>()
                    .map_err(|_| Error::InvalidWeekday(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let holidays = HolidayCalendar::new(
            config.holiday_region,
            config.extra_holidays.iter().copied(),
        );

        Ok(Self::new(windows, non_business_days, holidays))
    }

    /// Whether the instant falls on a working day inside a business window.
    /// Day, weekday and time of day are read in the timestamp's own offset.
    pub fn is_business_time(&self, at: &DateTime<FixedOffset>) -> bool {
        !self.holidays.is_holiday(at.date_naive()) && self.is_within_hours(at)
    }

    fn is_within_hours(&self, at: &DateTime<FixedOffset>) -> bool {
        let time = at.time();
        self.windows
            .iter()
            .any(|(start, end)| *start <= time && time <= *end)
            && !self.non_business_days.contains(&at.weekday())
    }
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| Error::InvalidWorkHour {
        value: value.to_string(),
    })
}
