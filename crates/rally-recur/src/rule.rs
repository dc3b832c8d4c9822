//! Recurrence rule model.
//!
//! The rule is a sum type with one payload shape per frequency, so a monthly
//! rule always carries exactly one of its two modes.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::{NaiveDate, Weekday};

/// Weekdays in Sunday-first order (Sun=0 … Sat=6).
pub const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Set of weekdays, stored as a bitmask indexed by days from Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: Self = Self(0);

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_sunday()
    }

    /// Creates a set containing only `day`.
    #[must_use]
    pub fn single(day: Weekday) -> Self {
        Self(Self::bit(day))
    }

    /// Adds a weekday to the set.
    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates the selected weekdays from Sunday to Saturday.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        SUNDAY_FIRST.into_iter().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// Set of months of the year (1–12), stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MonthSet(u16);

impl MonthSet {
    pub const EMPTY: Self = Self(0);

    /// Adds a month. Returns `false` and leaves the set unchanged if `month`
    /// is outside 1–12.
    pub fn insert(&mut self, month: u32) -> bool {
        if !(1..=12).contains(&month) {
            return false;
        }
        self.0 |= 1 << month;
        true
    }

    #[must_use]
    pub fn contains(self, month: u32) -> bool {
        (1..=12).contains(&month) && self.0 & (1 << month) != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the selected months in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u32> {
        (1..=12).filter(move |month| self.contains(*month))
    }
}

/// Builds a set from month numbers; numbers outside 1–12 are dropped.
impl FromIterator<u32> for MonthSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for month in iter {
            set.insert(month);
        }
        set
    }
}

/// Which occurrence of a weekday within its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekOrdinal {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOrdinal {
    /// Parses the stored ordinal: 1–4, or −1 for the last occurrence.
    #[must_use]
    pub const fn from_number(n: i64) -> Option<Self> {
        Some(match n {
            1 => Self::First,
            2 => Self::Second,
            3 => Self::Third,
            4 => Self::Fourth,
            -1 => Self::Last,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn number(self) -> i64 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Last => -1,
        }
    }
}

/// The two mutually exclusive monthly modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthlyMode {
    /// "On day N" (1–31).
    OnDay(u32),
    /// "On the Nth weekday", e.g. the second Tuesday or the last Friday.
    OnWeekday {
        ordinal: WeekOrdinal,
        weekday: Weekday,
    },
}

/// Repeating unit together with its per-unit selectors.
///
/// Empty selector sets are resolved against the anchor date when the rule is
/// normalized into a [`Schedule`](crate::Schedule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Daily,
    Weekly { days: WeekdaySet },
    Monthly(MonthlyMode),
    Yearly { months: MonthSet },
    /// A frequency tag the engine does not know. Expands to nothing.
    Unrecognized,
}

/// Stopping condition of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Terminator {
    #[default]
    Never,
    /// Stop after this many occurrences, counted from the anchor.
    AfterCount(NonZeroU32),
    /// Stop after this date (inclusive).
    UntilDate(NaiveDate),
}

/// Validated description of a repeating pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pattern: Pattern,
    interval: u32,
    terminator: Terminator,
    exceptions: BTreeSet<NaiveDate>,
}

impl RecurrenceRule {
    /// Creates an open-ended rule with interval 1 and no exceptions.
    #[must_use]
    pub const fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            interval: 1,
            terminator: Terminator::Never,
            exceptions: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn daily() -> Self {
        Self::new(Pattern::Daily)
    }

    #[must_use]
    pub const fn weekly(days: WeekdaySet) -> Self {
        Self::new(Pattern::Weekly { days })
    }

    #[must_use]
    pub const fn monthly_on_day(day: u32) -> Self {
        Self::new(Pattern::Monthly(MonthlyMode::OnDay(day)))
    }

    #[must_use]
    pub const fn monthly_on_weekday(ordinal: WeekOrdinal, weekday: Weekday) -> Self {
        Self::new(Pattern::Monthly(MonthlyMode::OnWeekday { ordinal, weekday }))
    }

    #[must_use]
    pub const fn yearly(months: MonthSet) -> Self {
        Self::new(Pattern::Yearly { months })
    }

    /// Sets the interval. Zero and negative values are coerced to 1.
    #[must_use]
    pub fn with_interval(mut self, interval: i64) -> Self {
        self.interval = if interval < 1 {
            1
        } else {
            u32::try_from(interval).unwrap_or(u32::MAX)
        };
        self
    }

    #[must_use]
    pub fn with_terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    #[must_use]
    pub fn with_exceptions<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.exceptions.extend(dates);
        self
    }

    /// Adds an exception date. Returns `false` if it was already present.
    pub fn add_exception(&mut self, date: NaiveDate) -> bool {
        self.exceptions.insert(date)
    }

    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Always at least 1.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    #[must_use]
    pub const fn terminator(&self) -> Terminator {
        self.terminator
    }

    #[must_use]
    pub const fn exceptions(&self) -> &BTreeSet<NaiveDate> {
        &self.exceptions
    }

    #[must_use]
    pub fn is_exception(&self, date: NaiveDate) -> bool {
        self.exceptions.contains(&date)
    }
}
