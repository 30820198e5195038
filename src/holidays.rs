//! Public-holiday predicates for the work calendar.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Deserialize;

/// Which national holiday table to apply.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HolidayRegion {
    #[default]
    Japan,
    /// Only the configured extra dates count as holidays.
    None,
}

#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    region: HolidayRegion,
    extra: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(region: HolidayRegion, extra: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            region,
            extra: extra.into_iter().collect(),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.extra.contains(&date) {
            return true;
        }
        match self.region {
            HolidayRegion::Japan => is_japan_holiday(date),
            HolidayRegion::None => false,
        }
    }
}

/// Japanese public holidays, including substitute and citizens' holidays.
pub fn is_japan_holiday(date: NaiveDate) -> bool {
    is_national_holiday(date) || is_substitute_holiday(date) || is_citizens_holiday(date)
}

/// A holiday falling on Sunday moves to the next day that is not itself a holiday.
/// Before 2007 the substitute was always the following Monday.
fn is_substitute_holiday(date: NaiveDate) -> bool {
    if is_national_holiday(date) {
        return false;
    }
    if date.year() < 2007 {
        return date.weekday() == Weekday::Mon && prev_day(date).is_some_and(is_national_holiday);
    }

    let mut cursor = prev_day(date);
    while let Some(day) = cursor {
        if !is_national_holiday(day) {
            return false;
        }
        if day.weekday() == Weekday::Sun {
            return true;
        }
        cursor = prev_day(day);
    }
    false
}

/// A weekday sandwiched between two national holidays.
fn is_citizens_holiday(date: NaiveDate) -> bool {
    date.weekday() != Weekday::Sun
        && !is_national_holiday(date)
        && prev_day(date).is_some_and(is_national_holiday)
        && next_day(date).is_some_and(is_national_holiday)
}

fn is_national_holiday(date: NaiveDate) -> bool {
    let year = date.year();
    let (month, day) = (date.month(), date.day());

    match (year, month, day) {
        // Imperial succession
        (2019, 4, 30) | (2019, 5, 1) | (2019, 5, 2) | (2019, 10, 22) => return true,
        // Olympic year moves
        (2020, 7, 23) | (2020, 7, 24) | (2020, 8, 10) => return true,
        (2021, 7, 22) | (2021, 7, 23) | (2021, 8, 8) => return true,
        _ => {}
    }

    match month {
        1 => day == 1 || is_nth_monday(date, 2),
        2 => day == 11 || (day == 23 && year >= 2020),
        3 => day == vernal_equinox_day(year),
        4 => day == 29,
        5 => day == 3 || day == 5 || (day == 4 && year >= 2007),
        7 => match year {
            2020 | 2021 => false,
            y if y >= 2003 => is_nth_monday(date, 3),
            _ => day == 20,
        },
        8 => day == 11 && year >= 2016 && year != 2020 && year != 2021,
        9 => {
            day == autumnal_equinox_day(year)
                || if year >= 2003 {
                    is_nth_monday(date, 3)
                } else {
                    day == 15
                }
        }
        10 => !matches!(year, 2020 | 2021) && is_nth_monday(date, 2),
        11 => day == 3 || day == 23,
        12 => day == 23 && (1989..=2018).contains(&year),
        _ => false,
    }
}

fn is_nth_monday(date: NaiveDate, n: u8) -> bool {
    NaiveDate::from_weekday_of_month_opt(date.year(), date.month(), Weekday::Mon, n) == Some(date)
}

// Approximation valid for 1980-2099
fn vernal_equinox_day(year: i32) -> u32 {
    equinox_day(20.8431, year)
}

fn autumnal_equinox_day(year: i32) -> u32 {
    equinox_day(23.2488, year)
}

fn equinox_day(base: f64, year: i32) -> u32 {
    let offset = f64::from(year - 1980);
    (base + 0.242194 * offset - (offset / 4.0).floor()).floor() as u32
}

fn prev_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(1))
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fixed_and_happy_monday_holidays_2024() {
        for date in [
            d(2024, 1, 1),
            d(2024, 1, 8),
            d(2024, 2, 11),
            d(2024, 2, 23),
            d(2024, 4, 29),
            d(2024, 5, 3),
            d(2024, 5, 4),
            d(2024, 5, 5),
            d(2024, 7, 15),
            d(2024, 8, 11),
            d(2024, 9, 16),
            d(2024, 10, 14),
            d(2024, 11, 3),
            d(2024, 11, 23),
        ] {
            assert!(is_japan_holiday(date), "{date} should be a holiday");
        }
    }

    #[test]
    fn equinoxes() {
        assert!(is_japan_holiday(d(2024, 3, 20)));
        assert!(is_japan_holiday(d(2024, 9, 22)));
        assert!(is_japan_holiday(d(2025, 3, 20)));
        assert!(is_japan_holiday(d(2025, 9, 23)));
    }

    #[test]
    fn substitute_holidays() {
        // Feb 11 2024 was a Sunday
        assert!(is_japan_holiday(d(2024, 2, 12)));
        // Children's Day on Sunday with May 3/4 already taken
        assert!(is_japan_holiday(d(2024, 5, 6)));
        assert!(is_japan_holiday(d(2024, 11, 4)));
        assert!(!is_japan_holiday(d(2024, 11, 5)));
    }

    #[test]
    fn citizens_holiday_between_respect_for_aged_and_equinox() {
        assert!(is_japan_holiday(d(2026, 9, 21)));
        assert!(is_japan_holiday(d(2026, 9, 22)));
        assert!(is_japan_holiday(d(2026, 9, 23)));
    }

    #[test]
    fn olympic_year_moves() {
        assert!(is_japan_holiday(d(2020, 7, 24)));
        assert!(!is_japan_holiday(d(2020, 10, 12)));
        assert!(!is_japan_holiday(d(2020, 8, 11)));
    }

    #[test]
    fn ordinary_weekday_is_not_a_holiday() {
        assert!(!is_japan_holiday(d(2024, 1, 9)));
        assert!(!is_japan_holiday(d(2024, 6, 3)));
    }

    #[test]
    fn extra_dates_and_region_none() {
        let calendar = HolidayCalendar::new(HolidayRegion::None, [d(2024, 12, 30)]);
        assert!(calendar.is_holiday(d(2024, 12, 30)));
        assert!(!calendar.is_holiday(d(2024, 1, 1)));

        let japan = HolidayCalendar::new(HolidayRegion::Japan, []);
        assert!(japan.is_holiday(d(2024, 1, 1)));
    }
}
