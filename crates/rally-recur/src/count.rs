//! Counting series dates without walking them.
//!
//! The Gregorian calendar repeats every 400 years, weekdays included, so the
//! number of dates a selector picks in a month or a year only depends on where
//! that period sits in the cycle. A long run of aligned periods is then a whole
//! number of lattice cycles plus a remainder.

use chrono::NaiveDate;

use crate::advance::MAX_EMPTY_PERIODS;
use crate::schedule::{Schedule, Selector};

const CYCLE_YEARS: i64 = 400;
const CYCLE_MONTHS: i64 = CYCLE_YEARS * 12;

impl Schedule {
    /// ## Summary
    /// Number of series dates on or after the anchor and strictly before
    /// `target`, exceptions included.
    ///
    /// The cost does not depend on how far `target` lies from the anchor.
    /// Returns `None` for an unrecognized frequency, and for a lattice with
    /// gaps long enough that advancing would give up before reaching `target`.
    #[must_use]
    pub fn count_before(&self, target: NaiveDate) -> Option<u64> {
        if self.is_unrecognized() {
            return None;
        }
        let anchor = self.anchor();
        if target <= anchor {
            return Some(0);
        }

        let first = self.period_of(anchor);
        let last = self.aligned_period(target);
        if first == last {
            return Some(self.count_in(first, anchor, target));
        }

        let head = self.count_in(first, anchor, NaiveDate::MAX);
        let tail = self.count_in(last, NaiveDate::MIN, target);
        let middle = self.count_between(first, (last - first) / self.interval() - 1)?;
        Some(head + middle + tail)
    }

    /// Dates in the `periods` aligned periods following `first`.
    fn count_between(&self, first: i64, periods: i64) -> Option<u64> {
        if periods <= 0 {
            return Some(0);
        }
        let cycle = self.lattice_cycle();
        let terms: Vec<u64> = (1..=cycle.min(periods))
            .map(|k| self.count_in(first + k * self.interval(), NaiveDate::MIN, NaiveDate::MAX))
            .collect();
        let per_cycle: u64 = terms.iter().sum();
        let wraps = periods > cycle;
        if wraps && per_cycle == 0 {
            return Some(0);
        }
        // Advancing stops after this many empty periods in a row.
        if longest_gap(&terms, wraps) >= MAX_EMPTY_PERIODS - 1 {
            return None;
        }

        let full_cycles = u64::try_from(periods / cycle).ok()?;
        let remainder = usize::try_from(periods % cycle).ok()?;
        Some(full_cycles * per_cycle + terms.iter().take(remainder).sum::<u64>())
    }

    /// Aligned periods after which per-period counts repeat.
    fn lattice_cycle(&self) -> i64 {
        let calendar_cycle = match self.selector() {
            Selector::Daily | Selector::Weekly { .. } | Selector::Unrecognized => 1,
            Selector::MonthlyOnDay { .. } | Selector::MonthlyOnWeekday { .. } => CYCLE_MONTHS,
            Selector::Yearly { .. } => CYCLE_YEARS,
        };
        calendar_cycle / gcd(self.interval(), calendar_cycle)
    }

    /// Selected dates `d` in `period` with `from <= d < until`.
    fn count_in(&self, period: i64, from: NaiveDate, until: NaiveDate) -> u64 {
        let mut count = 0;
        let mut floor = from;
        while let Some(date) = self.landing_in(period, floor) {
            if date >= until {
                break;
            }
            count += 1;
            match date.succ_opt() {
                Some(next) => floor = next,
                None => break,
            }
        }
        count
    }
}

/// Longest run of empty periods, read cyclically when `wraps`.
fn longest_gap(terms: &[u64], wraps: bool) -> u32 {
    let passes = if wraps { 2 } else { 1 };
    let mut longest = 0;
    let mut run: u32 = 0;
    for count in terms.iter().cycle().take(terms.len() * passes) {
        if *count == 0 {
            run = run.saturating_add(1);
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

const fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let rest = a % b;
        a = b;
        b = rest;
    }
    a
}
