//! Rule normalization.
//!
//! Defaults that depend on the anchor (weekly days, yearly months, the yearly
//! day of month) are resolved exactly once here. The validator and the
//! advancer only ever see a [`Schedule`].

use chrono::{Datelike, NaiveDate, Weekday};

use crate::calendar::{self, MonthEndPolicy};
use crate::rule::{MonthSet, MonthlyMode, Pattern, RecurrenceRule, WeekOrdinal, WeekdaySet};

/// Per-unit selector with every default filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selector {
    Daily,
    /// Never empty.
    Weekly { days: WeekdaySet },
    MonthlyOnDay { day: u32 },
    MonthlyOnWeekday {
        ordinal: WeekOrdinal,
        weekday: Weekday,
    },
    /// `months` is never empty; `day` is the anchor's day of month.
    Yearly { months: MonthSet, day: u32 },
    Unrecognized,
}

/// A recurrence rule bound to its anchor date and month-end policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    anchor: NaiveDate,
    interval: i64,
    selector: Selector,
    month_end: MonthEndPolicy,
}

impl Schedule {
    /// ## Summary
    /// Normalizes `rule` against `anchor`.
    ///
    /// An empty weekly day set becomes the anchor's weekday and an empty
    /// yearly month set becomes the anchor's month.
    #[must_use]
    pub fn new(anchor: NaiveDate, rule: &RecurrenceRule, month_end: MonthEndPolicy) -> Self {
        let selector = match *rule.pattern() {
            Pattern::Daily => Selector::Daily,
            Pattern::Weekly { days } => Selector::Weekly {
                days: if days.is_empty() {
                    WeekdaySet::single(anchor.weekday())
                } else {
                    days
                },
            },
            Pattern::Monthly(MonthlyMode::OnDay(day)) => Selector::MonthlyOnDay { day },
            Pattern::Monthly(MonthlyMode::OnWeekday { ordinal, weekday }) => {
                Selector::MonthlyOnWeekday { ordinal, weekday }
            }
            Pattern::Yearly { months } => Selector::Yearly {
                months: if months.is_empty() {
                    [anchor.month()].into_iter().collect()
                } else {
                    months
                },
                day: anchor.day(),
            },
            Pattern::Unrecognized => Selector::Unrecognized,
        };

        Self {
            anchor,
            interval: i64::from(rule.interval()),
            selector,
            month_end,
        }
    }

    #[must_use]
    pub const fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    #[must_use]
    pub const fn interval(&self) -> i64 {
        self.interval
    }

    #[must_use]
    pub const fn month_end(&self) -> MonthEndPolicy {
        self.month_end
    }

    /// Whether the rule's frequency was unknown to the engine.
    #[must_use]
    pub const fn is_unrecognized(&self) -> bool {
        matches!(self.selector, Selector::Unrecognized)
    }

    pub(crate) const fn selector(&self) -> Selector {
        self.selector
    }

    /// Index of the frequency period (day, week, month, year) containing `date`.
    pub(crate) fn period_of(&self, date: NaiveDate) -> i64 {
        match self.selector {
            Selector::Daily | Selector::Unrecognized => calendar::day_index(date),
            Selector::Weekly { .. } => calendar::week_index(date),
            Selector::MonthlyOnDay { .. } | Selector::MonthlyOnWeekday { .. } => {
                calendar::month_index(date)
            }
            Selector::Yearly { .. } => i64::from(date.year()),
        }
    }

    /// Signed number of periods between the anchor's period and `date`'s.
    pub(crate) fn periods_from_anchor(&self, date: NaiveDate) -> i64 {
        self.period_of(date) - self.period_of(self.anchor)
    }

    /// The latest interval-aligned period at or before the one containing `date`.
    pub(crate) fn aligned_period(&self, date: NaiveDate) -> i64 {
        let base = self.period_of(self.anchor);
        let offset = self.period_of(date) - base;
        base + offset.div_euclid(self.interval) * self.interval
    }
}
