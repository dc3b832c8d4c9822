//! Expansion of a base event into the occurrences inside a query window.

use chrono::NaiveDate;

use crate::calendar::MonthEndPolicy;
use crate::rule::{RecurrenceRule, Terminator};
use crate::schedule::Schedule;

/// ## Summary
/// Hard cap on occurrences returned by one expansion, whatever the terminator.
pub const MAX_OCCURRENCES: usize = 1000;

/// A stored event as seen by the engine.
///
/// `payload` carries the caller's own fields and is copied into every
/// occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseEvent<P> {
    pub id: String,
    /// Date of the first occurrence.
    pub anchor_date: NaiveDate,
    /// `None` for a non-recurring event.
    pub recurrence: Option<RecurrenceRule>,
    pub payload: P,
}

/// One materialized date of an event. Never stored by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<P> {
    /// `{parent id}_{date}` for recurring instances, the event's own id otherwise.
    pub id: String,
    pub date: NaiveDate,
    /// Id of the recurring event this instance was generated from.
    pub parent_id: Option<String>,
    pub payload: P,
}

impl<P> Occurrence<P> {
    /// Whether this occurrence was generated from a recurring series.
    #[must_use]
    pub const fn is_recurring_instance(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Deterministic identifier of the instance of `event_id` on `date`.
#[must_use]
pub fn synthetic_id(event_id: &str, date: NaiveDate) -> String {
    format!("{event_id}_{date}")
}

/// Tunables of the expansion driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionOptions {
    pub month_end: MonthEndPolicy,
    /// Per-query cap. Values above [`MAX_OCCURRENCES`] are lowered to it.
    pub max_occurrences: usize,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            month_end: MonthEndPolicy::default(),
            max_occurrences: MAX_OCCURRENCES,
        }
    }
}

impl ExpansionOptions {
    #[must_use]
    pub const fn with_month_end(mut self, month_end: MonthEndPolicy) -> Self {
        self.month_end = month_end;
        self
    }

    #[must_use]
    pub const fn with_max_occurrences(mut self, max_occurrences: usize) -> Self {
        self.max_occurrences = max_occurrences;
        self
    }

    const fn cap(&self) -> usize {
        if self.max_occurrences < MAX_OCCURRENCES {
            self.max_occurrences
        } else {
            MAX_OCCURRENCES
        }
    }
}

/// Drives validation and advancing over a query window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expander {
    options: ExpansionOptions,
}

impl Expander {
    #[must_use]
    pub const fn new(options: ExpansionOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> ExpansionOptions {
        self.options
    }

    /// ## Summary
    /// Expands `event` into its occurrences between `window_start` and
    /// `window_end`, both inclusive, in increasing date order.
    ///
    /// A non-recurring event yields itself when its anchor lies in the window.
    /// An inverted window yields nothing.
    #[must_use]
    pub fn expand<P: Clone>(
        &self,
        event: &BaseEvent<P>,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Vec<Occurrence<P>> {
        if window_start > window_end {
            tracing::debug!(
                event_id = %event.id,
                %window_start,
                %window_end,
                "Inverted window, nothing to expand"
            );
            return Vec::new();
        }

        let Some(rule) = &event.recurrence else {
            if (window_start..=window_end).contains(&event.anchor_date) {
                return vec![Occurrence {
                    id: event.id.clone(),
                    date: event.anchor_date,
                    parent_id: None,
                    payload: event.payload.clone(),
                }];
            }
            return Vec::new();
        };

        let schedule = Schedule::new(event.anchor_date, rule, self.options.month_end);
        if schedule.is_unrecognized() {
            tracing::debug!(event_id = %event.id, "Unrecognized frequency, series is empty");
            return Vec::new();
        }

        self.expand_schedule(event, rule, &schedule, window_start, window_end)
    }

    fn expand_schedule<P: Clone>(
        &self,
        event: &BaseEvent<P>,
        rule: &RecurrenceRule,
        schedule: &Schedule,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Vec<Occurrence<P>> {
        let cap = self.options.cap();
        let terminator = rule.terminator();

        let (mut current, mut emitted_in_series) = match terminator {
            Terminator::AfterCount(_) => resume_counted(rule, schedule, window_start),
            Terminator::Never | Terminator::UntilDate(_) => (schedule.seek(window_start), 0),
        };
        let mut occurrences = Vec::new();

        while let Some(date) = current {
            if date > window_end || occurrences.len() >= cap {
                break;
            }
            match terminator {
                Terminator::UntilDate(until) if date > until => break,
                Terminator::AfterCount(count) if emitted_in_series >= count.get().into() => break,
                _ => {}
            }

            if !rule.is_exception(date) && schedule.is_valid(date) {
                emitted_in_series = emitted_in_series.saturating_add(1);
                if date >= window_start {
                    occurrences.push(Occurrence {
                        id: synthetic_id(&event.id, date),
                        date,
                        parent_id: Some(event.id.clone()),
                        payload: event.payload.clone(),
                    });
                }
            }

            current = schedule.next(date);
        }

        tracing::trace!(
            event_id = %event.id,
            count = occurrences.len(),
            "Expanded recurring event"
        );
        occurrences
    }
}

/// ## Summary
/// Where a counted series enters the window, with the number of occurrences
/// it has already produced before `window_start`.
///
/// Earlier occurrences are counted arithmetically and the exceptions among
/// them subtracted, so an old anchor costs nothing extra. When the lattice
/// cannot be counted that way the series is walked from its first date.
fn resume_counted(
    rule: &RecurrenceRule,
    schedule: &Schedule,
    window_start: NaiveDate,
) -> (Option<NaiveDate>, u64) {
    let anchor = schedule.anchor();
    let counted = if window_start > anchor {
        schedule.count_before(window_start)
    } else {
        None
    };
    let Some(candidates) = counted else {
        return (schedule.first(), 0);
    };

    let excepted = rule
        .exceptions()
        .range(anchor..window_start)
        .filter(|date| schedule.is_valid(**date))
        .count();
    let emitted = candidates.saturating_sub(u64::try_from(excepted).unwrap_or(u64::MAX));
    tracing::trace!(%window_start, emitted, "Resumed counted series");
    (schedule.seek(window_start), emitted)
}
