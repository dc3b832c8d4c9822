//! Stored event records, in the shape the persistence and API layers exchange.

use chrono::NaiveDate;
use rally_recur::{BaseEvent, Occurrence, RecurrenceRule};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::ServiceResult;

/// ## Summary
/// An event row as stored.
///
/// Selector lists (`recurrence_days_of_week`, `recurrence_months`,
/// `recurrence_exceptions`) are JSON arrays encoded into a string column.
/// Fields the calendar does not interpret are kept in `extra` and copied into
/// every expanded occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Date of the first occurrence.
    pub start_date: NaiveDate,

    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_type: Option<String>,
    #[serde(default)]
    pub recurrence_interval: Option<i64>,
    #[serde(default)]
    pub recurrence_days_of_week: Option<String>,
    #[serde(default)]
    pub recurrence_day_of_month: Option<i64>,
    #[serde(default)]
    pub recurrence_week_of_month: Option<i64>,
    #[serde(default)]
    pub recurrence_day_of_week: Option<String>,
    #[serde(default)]
    pub recurrence_months: Option<String>,
    #[serde(default)]
    pub recurrence_end_type: Option<String>,
    #[serde(default)]
    pub recurrence_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurrence_occurrences: Option<i64>,
    #[serde(default)]
    pub recurrence_exceptions: Option<String>,

    /// Set on expanded instances and on detached override events.
    #[serde(default)]
    pub parent_event_id: Option<String>,
    #[serde(default)]
    pub is_recurring_instance: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EventRecord {
    /// Creates a non-recurring record.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            start_date,
            is_recurring: false,
            recurrence_type: None,
            recurrence_interval: None,
            recurrence_days_of_week: None,
            recurrence_day_of_month: None,
            recurrence_week_of_month: None,
            recurrence_day_of_week: None,
            recurrence_months: None,
            recurrence_end_type: None,
            recurrence_end_date: None,
            recurrence_occurrences: None,
            recurrence_exceptions: None,
            parent_event_id: None,
            is_recurring_instance: false,
            extra: serde_json::Map::new(),
        }
    }

    /// ## Summary
    /// Decodes the recurrence columns; `None` for a one-off event.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidField` if a recurrence field cannot be decoded.
    pub fn recurrence_rule(&self) -> ServiceResult<Option<RecurrenceRule>> {
        codec::decode_rule(self)
    }

    /// ## Summary
    /// Builds the engine's view of this record.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidField` if a recurrence field cannot be decoded.
    pub fn to_base_event(&self) -> ServiceResult<BaseEvent<EventRecord>> {
        Ok(BaseEvent {
            id: self.id.clone(),
            anchor_date: self.start_date,
            recurrence: self.recurrence_rule()?,
            payload: self.clone(),
        })
    }

    /// ## Summary
    /// Shapes an expanded occurrence as an API record.
    ///
    /// Recurring instances get the synthetic id, their own date, a
    /// `parent_event_id` back-reference, `is_recurring_instance = true` and
    /// `is_recurring = false`. A non-recurring event comes back unchanged.
    #[must_use]
    pub fn from_occurrence(occurrence: Occurrence<EventRecord>) -> Self {
        let Occurrence {
            id,
            date,
            parent_id,
            payload: mut record,
        } = occurrence;

        if let Some(parent_id) = parent_id {
            record.id = id;
            record.start_date = date;
            record.parent_event_id = Some(parent_id);
            record.is_recurring_instance = true;
            record.is_recurring = false;
        }
        record
    }

    /// Drops every recurrence field, leaving a one-off event.
    pub fn clear_recurrence(&mut self) {
        self.is_recurring = false;
        self.recurrence_type = None;
        self.recurrence_interval = None;
        self.recurrence_days_of_week = None;
        self.recurrence_day_of_month = None;
        self.recurrence_week_of_month = None;
        self.recurrence_day_of_week = None;
        self.recurrence_months = None;
        self.recurrence_end_type = None;
        self.recurrence_end_date = None;
        self.recurrence_occurrences = None;
        self.recurrence_exceptions = None;
    }

    /// ## Summary
    /// Adds `date` to `recurrence_exceptions`.
    ///
    /// Returns `false` if the date was already excluded.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidField` if the stored exception list is malformed.
    pub fn add_exception(&mut self, date: NaiveDate) -> ServiceResult<bool> {
        let mut exceptions = codec::decode_dates(
            codec::field::EXCEPTIONS,
            self.recurrence_exceptions.as_deref(),
        )?;
        let inserted = exceptions.insert(date);
        if inserted {
            self.recurrence_exceptions = Some(codec::encode_dates(&exceptions)?);
        }
        Ok(inserted)
    }
}
