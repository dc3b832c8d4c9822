//! Calendar arithmetic on naive dates.
//!
//! Periods are addressed by flat indices (days from CE, Sunday-start weeks,
//! `year * 12 + month0`, years) so interval stepping stays in integer space.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::rule::WeekOrdinal;

/// Policy for a day-of-month that does not exist in the target month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MonthEndPolicy {
    /// Land on the last day of the shorter month. Later months return to the
    /// requested day.
    #[default]
    Clamp,
    /// Produce no occurrence in months that lack the requested day.
    Skip,
}

/// Number of days in `month` (1–12) of `year`.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1)?;
    (28..=31)
        .rev()
        .find(|day| NaiveDate::from_ymd_opt(year, month, *day).is_some())
}

/// Resolves "day `day` of `year`-`month`" under `policy`.
#[must_use]
pub fn resolve_day(year: i32, month: u32, day: u32, policy: MonthEndPolicy) -> Option<NaiveDate> {
    if day == 0 {
        return None;
    }
    let last = days_in_month(year, month)?;
    if day <= last {
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    match policy {
        MonthEndPolicy::Clamp => NaiveDate::from_ymd_opt(year, month, last),
        MonthEndPolicy::Skip => None,
    }
}

/// The `ordinal`-th `weekday` of `year`-`month`.
#[must_use]
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    ordinal: WeekOrdinal,
    weekday: Weekday,
) -> Option<NaiveDate> {
    match ordinal {
        WeekOrdinal::Last => NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5)
            .or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4)),
        nth => {
            let n = u8::try_from(nth.number()).ok()?;
            NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
        }
    }
}

#[must_use]
pub fn day_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

#[must_use]
pub fn day_from_index(index: i64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(i32::try_from(index).ok()?)
}

/// Index of the Sunday-start week containing `date`.
#[must_use]
pub fn week_index(date: NaiveDate) -> i64 {
    (day_index(date) - i64::from(date.weekday().num_days_from_sunday())).div_euclid(7)
}

/// The Sunday that opens week `index`.
#[must_use]
pub fn week_from_index(index: i64) -> Option<NaiveDate> {
    // Day 0 from CE (0000-12-31) is a Sunday.
    day_from_index(index.checked_mul(7)?)
}

#[must_use]
pub fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Splits a month index into `(year, month)` with month in 1–12.
#[must_use]
pub fn month_from_index(index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}
