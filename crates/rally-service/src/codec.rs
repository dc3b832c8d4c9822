//! Decoding of stored recurrence fields into engine types.
//!
//! Malformed stored values are rejected here, at the persistence boundary.
//! An unknown `recurrence_type` is not an error: it decodes to
//! [`Pattern::Unrecognized`], which expands to an empty series.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::{Datelike, NaiveDate, Weekday};
use rally_recur::{
    MonthSet, MonthlyMode, Pattern, RecurrenceRule, Terminator, WeekOrdinal, WeekdaySet,
};
use serde::de::DeserializeOwned;

use crate::error::{ServiceError, ServiceResult};
use crate::record::EventRecord;

/// Stored field names, used in error reports.
pub mod field {
    pub const DAYS_OF_WEEK: &str = "recurrence_days_of_week";
    pub const DAY_OF_MONTH: &str = "recurrence_day_of_month";
    pub const WEEK_OF_MONTH: &str = "recurrence_week_of_month";
    pub const DAY_OF_WEEK: &str = "recurrence_day_of_week";
    pub const MONTHS: &str = "recurrence_months";
    pub const END_TYPE: &str = "recurrence_end_type";
    pub const END_DATE: &str = "recurrence_end_date";
    pub const OCCURRENCES: &str = "recurrence_occurrences";
    pub const EXCEPTIONS: &str = "recurrence_exceptions";
}

/// Parses a weekday name, full or three-letter, in any case.
#[must_use]
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    Some(match name.trim().to_ascii_lowercase().as_str() {
        "sunday" | "sun" => Weekday::Sun,
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        _ => return None,
    })
}

/// Lowercase full name, as written to storage.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "sunday",
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
    }
}

/// Absent, blank and `null` columns all decode to an empty list.
fn decode_list<T: DeserializeOwned>(
    field: &'static str,
    encoded: Option<&str>,
) -> ServiceResult<Vec<T>> {
    let Some(text) = encoded.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(Vec::new());
    };
    serde_json::from_str::<Option<Vec<T>>>(text)
        .map(Option::unwrap_or_default)
        .map_err(|err| ServiceError::invalid_field(field, err.to_string()))
}

/// ## Summary
/// Decodes a JSON list of weekday names.
///
/// ## Errors
/// Returns `ServiceError::InvalidField` for malformed JSON or unknown names.
pub fn decode_weekdays(field: &'static str, encoded: Option<&str>) -> ServiceResult<WeekdaySet> {
    decode_list::<String>(field, encoded)?
        .iter()
        .map(|name| {
            parse_weekday(name).ok_or_else(|| {
                ServiceError::invalid_field(field, format!("unknown weekday {name:?}"))
            })
        })
        .collect()
}

/// ## Summary
/// Decodes a JSON list of month numbers.
///
/// ## Errors
/// Returns `ServiceError::InvalidField` for malformed JSON or numbers outside 1–12.
pub fn decode_months(field: &'static str, encoded: Option<&str>) -> ServiceResult<MonthSet> {
    let mut months = MonthSet::EMPTY;
    for month in decode_list::<i64>(field, encoded)? {
        let inserted = u32::try_from(month).is_ok_and(|m| months.insert(m));
        if !inserted {
            return Err(ServiceError::invalid_field(
                field,
                format!("{month} is not a month number"),
            ));
        }
    }
    Ok(months)
}

/// ## Summary
/// Decodes a JSON list of ISO dates.
///
/// ## Errors
/// Returns `ServiceError::InvalidField` for malformed JSON or dates.
pub fn decode_dates(
    field: &'static str,
    encoded: Option<&str>,
) -> ServiceResult<BTreeSet<NaiveDate>> {
    Ok(decode_list::<NaiveDate>(field, encoded)?.into_iter().collect())
}

/// ## Summary
/// Encodes dates as a JSON list in ascending order.
///
/// ## Errors
/// Returns `ServiceError::SerdeError` if serialization fails.
pub fn encode_dates(dates: &BTreeSet<NaiveDate>) -> ServiceResult<String> {
    Ok(serde_json::to_string(dates)?)
}

fn decode_monthly_mode(record: &EventRecord) -> ServiceResult<MonthlyMode> {
    if let Some(day) = record.recurrence_day_of_month {
        let day = u32::try_from(day)
            .ok()
            .filter(|d| (1..=31).contains(d))
            .ok_or_else(|| {
                ServiceError::invalid_field(
                    field::DAY_OF_MONTH,
                    format!("{day} is not within 1-31"),
                )
            })?;
        return Ok(MonthlyMode::OnDay(day));
    }

    match (
        record.recurrence_week_of_month,
        record.recurrence_day_of_week.as_deref(),
    ) {
        (Some(week), Some(name)) => {
            let ordinal = WeekOrdinal::from_number(week).ok_or_else(|| {
                ServiceError::invalid_field(
                    field::WEEK_OF_MONTH,
                    format!("{week} is not 1-4 or -1"),
                )
            })?;
            let weekday = parse_weekday(name).ok_or_else(|| {
                ServiceError::invalid_field(field::DAY_OF_WEEK, format!("unknown weekday {name:?}"))
            })?;
            Ok(MonthlyMode::OnWeekday { ordinal, weekday })
        }
        (None, None) => Ok(MonthlyMode::OnDay(record.start_date.day())),
        (Some(_), None) => Err(ServiceError::invalid_field(
            field::DAY_OF_WEEK,
            "required with recurrence_week_of_month",
        )),
        (None, Some(_)) => Err(ServiceError::invalid_field(
            field::WEEK_OF_MONTH,
            "required with recurrence_day_of_week",
        )),
    }
}

fn decode_terminator(record: &EventRecord) -> ServiceResult<Terminator> {
    let end_type = record
        .recurrence_end_type
        .as_deref()
        .map(|text| text.trim().to_ascii_lowercase());

    match end_type.as_deref() {
        None | Some("" | "never") => Ok(Terminator::Never),
        Some("after_occurrences") => record
            .recurrence_occurrences
            .and_then(|n| u32::try_from(n).ok())
            .and_then(NonZeroU32::new)
            .map(Terminator::AfterCount)
            .ok_or_else(|| {
                ServiceError::invalid_field(field::OCCURRENCES, "must be a positive integer")
            }),
        Some("end_date") => record
            .recurrence_end_date
            .map(Terminator::UntilDate)
            .ok_or_else(|| ServiceError::invalid_field(field::END_DATE, "required for end_date")),
        Some(other) => Err(ServiceError::invalid_field(
            field::END_TYPE,
            format!("unknown end type {other:?}"),
        )),
    }
}

/// ## Summary
/// Decodes the recurrence columns of `record`.
///
/// Returns `Ok(None)` for a non-recurring record. Monthly mode precedence is
/// day of month, then week of month with day of week, then the anchor's day.
///
/// ## Errors
/// Returns `ServiceError::InvalidField` naming the first column that cannot be decoded.
pub fn decode_rule(record: &EventRecord) -> ServiceResult<Option<RecurrenceRule>> {
    if !record.is_recurring {
        return Ok(None);
    }

    let frequency = record
        .recurrence_type
        .as_deref()
        .map(|text| text.trim().to_ascii_lowercase());
    let pattern = match frequency.as_deref() {
        Some("daily") => Pattern::Daily,
        Some("weekly") => Pattern::Weekly {
            days: decode_weekdays(field::DAYS_OF_WEEK, record.recurrence_days_of_week.as_deref())?,
        },
        Some("monthly") => Pattern::Monthly(decode_monthly_mode(record)?),
        Some("yearly") => Pattern::Yearly {
            months: decode_months(field::MONTHS, record.recurrence_months.as_deref())?,
        },
        other => {
            tracing::warn!(
                event_id = %record.id,
                recurrence_type = ?other,
                "Unrecognized recurrence type, series will be empty"
            );
            Pattern::Unrecognized
        }
    };

    let exceptions = decode_dates(field::EXCEPTIONS, record.recurrence_exceptions.as_deref())?;

    Ok(Some(
        RecurrenceRule::new(pattern)
            .with_interval(record.recurrence_interval.unwrap_or(1))
            .with_terminator(decode_terminator(record)?)
            .with_exceptions(exceptions),
    ))
}
