//! Occurrence validation: does a calendar date satisfy a rule relative to its anchor?

use chrono::{Datelike, NaiveDate};

use crate::calendar::{self, MonthEndPolicy};
use crate::rule::RecurrenceRule;
use crate::schedule::{Schedule, Selector};

impl Schedule {
    /// ## Summary
    /// Returns `true` if `candidate` is a date of this series.
    ///
    /// Exceptions and the terminator are not considered; the expansion driver
    /// applies those.
    #[must_use]
    pub fn is_valid(&self, candidate: NaiveDate) -> bool {
        if candidate < self.anchor() {
            return false;
        }
        if self.periods_from_anchor(candidate) % self.interval() != 0 {
            return false;
        }

        match self.selector() {
            Selector::Daily => true,
            Selector::Weekly { days } => days.contains(candidate.weekday()),
            Selector::MonthlyOnDay { day } => {
                calendar::resolve_day(candidate.year(), candidate.month(), day, self.month_end())
                    == Some(candidate)
            }
            Selector::MonthlyOnWeekday { ordinal, weekday } => {
                calendar::nth_weekday_of_month(
                    candidate.year(),
                    candidate.month(),
                    ordinal,
                    weekday,
                ) == Some(candidate)
            }
            Selector::Yearly { months, day } => {
                months.contains(candidate.month())
                    && calendar::resolve_day(
                        candidate.year(),
                        candidate.month(),
                        day,
                        self.month_end(),
                    ) == Some(candidate)
            }
            Selector::Unrecognized => false,
        }
    }
}

/// ## Summary
/// Checks `candidate` against `rule` anchored at `anchor`, with the default
/// month-end policy.
#[must_use]
pub fn is_valid(candidate: NaiveDate, anchor: NaiveDate, rule: &RecurrenceRule) -> bool {
    Schedule::new(anchor, rule, MonthEndPolicy::default()).is_valid(candidate)
}
