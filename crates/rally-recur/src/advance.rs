//! Occurrence advancing: given a candidate date, find the next one.
//!
//! Candidates are generated on the lattice anchored at the schedule's anchor:
//! periods `anchor`, `anchor + interval`, `anchor + 2 * interval`, … at the
//! frequency's granularity, and inside each period the dates picked by the
//! selector. Every date produced here also passes [`Schedule::is_valid`].

use chrono::{Datelike, NaiveDate};

use crate::calendar::{self, MonthEndPolicy};
use crate::rule::RecurrenceRule;
use crate::schedule::{Schedule, Selector};

/// Upper bound on consecutive aligned periods searched without a hit.
///
/// Only reachable with `MonthEndPolicy::Skip` (a day that no aligned month
/// has) or at the edge of the representable calendar.
pub(crate) const MAX_EMPTY_PERIODS: u32 = 512;

impl Schedule {
    /// ## Summary
    /// First date of the series, at or after the anchor.
    ///
    /// Returns `None` if no aligned period within reach contains a date.
    #[must_use]
    pub fn first(&self) -> Option<NaiveDate> {
        self.seek(self.anchor())
    }

    /// ## Summary
    /// Next candidate strictly after `current`.
    ///
    /// An unrecognized frequency steps one day at a time. Returns `None` once
    /// the series can no longer produce dates.
    #[must_use]
    pub fn next(&self, current: NaiveDate) -> Option<NaiveDate> {
        let floor = current.succ_opt()?;
        if self.is_unrecognized() {
            return Some(floor);
        }
        self.seek(floor)
    }

    /// ## Summary
    /// First candidate at or after `target`.
    ///
    /// Jumps straight to the aligned period containing `target`, so the cost
    /// does not depend on how far the anchor lies in the past.
    #[must_use]
    pub fn seek(&self, target: NaiveDate) -> Option<NaiveDate> {
        let floor = target.max(self.anchor());
        if self.is_unrecognized() {
            return Some(floor);
        }
        self.landing_from(self.aligned_period(floor), floor)
    }

    fn landing_from(&self, mut period: i64, floor: NaiveDate) -> Option<NaiveDate> {
        for _ in 0..MAX_EMPTY_PERIODS {
            if let Some(date) = self.landing_in(period, floor) {
                return Some(date);
            }
            period = period.checked_add(self.interval())?;
        }
        tracing::trace!(
            anchor = %self.anchor(),
            floor = %floor,
            "No occurrence found within search limit"
        );
        None
    }

    /// Earliest selected date inside `period` that is not before `floor`.
    pub(crate) fn landing_in(&self, period: i64, floor: NaiveDate) -> Option<NaiveDate> {
        match self.selector() {
            Selector::Daily | Selector::Unrecognized => {
                calendar::day_from_index(period).filter(|date| *date >= floor)
            }
            Selector::Weekly { days } => calendar::week_from_index(period)?
                .iter_days()
                .take(7)
                .find(|date| *date >= floor && days.contains(date.weekday())),
            Selector::MonthlyOnDay { day } => {
                let (year, month) = calendar::month_from_index(period)?;
                calendar::resolve_day(year, month, day, self.month_end())
                    .filter(|date| *date >= floor)
            }
            Selector::MonthlyOnWeekday { ordinal, weekday } => {
                let (year, month) = calendar::month_from_index(period)?;
                calendar::nth_weekday_of_month(year, month, ordinal, weekday)
                    .filter(|date| *date >= floor)
            }
            Selector::Yearly { months, day } => {
                let year = i32::try_from(period).ok()?;
                months
                    .iter()
                    .filter_map(|month| calendar::resolve_day(year, month, day, self.month_end()))
                    .find(|date| *date >= floor)
            }
        }
    }
}

/// ## Summary
/// Next candidate after `current` for `rule` anchored at `anchor`, with the
/// default month-end policy.
#[must_use]
pub fn next_candidate(
    current: NaiveDate,
    anchor: NaiveDate,
    rule: &RecurrenceRule,
) -> Option<NaiveDate> {
    Schedule::new(anchor, rule, MonthEndPolicy::default()).next(current)
}
