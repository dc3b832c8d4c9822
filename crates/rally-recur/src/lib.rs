//! Recurring-event expansion for Rally calendars.
//!
//! A [`RecurrenceRule`] attached to a [`BaseEvent`] is normalized once into a
//! [`Schedule`], which both validates candidate dates and advances to the next
//! one. The [`Expander`] drives the two over a query window and materializes
//! [`Occurrence`] values. All dates are naive calendar dates.

pub mod advance;
pub mod calendar;
pub mod count;
pub mod expand;
pub mod rule;
pub mod schedule;
pub mod validate;

pub use calendar::MonthEndPolicy;
pub use expand::{BaseEvent, ExpansionOptions, Expander, MAX_OCCURRENCES, Occurrence, synthetic_id};
pub use rule::{MonthSet, MonthlyMode, Pattern, RecurrenceRule, Terminator, WeekOrdinal, WeekdaySet};
pub use schedule::Schedule;
pub use validate::is_valid;
