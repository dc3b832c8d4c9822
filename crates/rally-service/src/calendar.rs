//! Calendar operations over an [`EventStore`]: window listings, exceptions
//! and detached instance overrides.

use std::sync::Arc;

use chrono::NaiveDate;
use rally_core::config::{CalendarConfig, MonthEndSetting};
use rally_core::error::CoreError;
use rally_recur::{ExpansionOptions, Expander, MonthEndPolicy};
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};
use crate::record::EventRecord;
use crate::store::EventStore;

/// Field overrides applied to a detached instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstanceOverride {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// ## Summary
/// Maps the `calendar` configuration section onto engine options.
#[must_use]
pub fn expansion_options(config: &CalendarConfig) -> ExpansionOptions {
    let month_end = match config.month_end_policy {
        MonthEndSetting::Clamp => MonthEndPolicy::Clamp,
        MonthEndSetting::Skip => MonthEndPolicy::Skip,
    };
    ExpansionOptions {
        month_end,
        max_occurrences: config.max_occurrences,
    }
}

#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn EventStore>,
    expander: Expander,
}

impl CalendarService {
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, expander: Expander) -> Self {
        Self { store, expander }
    }

    #[must_use]
    pub fn from_config(store: Arc<dyn EventStore>, config: &CalendarConfig) -> Self {
        Self::new(store, Expander::new(expansion_options(config)))
    }

    #[must_use]
    pub const fn expander(&self) -> &Expander {
        &self.expander
    }

    /// ## Summary
    /// Expands every stored event over `start..=end`.
    ///
    /// Events whose recurrence cannot be decoded are logged and left out.
    /// The result is ordered by date, then id.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn list_occurrences(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<EventRecord>> {
        let events = self.store.list_events().await?;

        let mut occurrences = Vec::new();
        for record in &events {
            let base = match record.to_base_event() {
                Ok(base) => base,
                Err(err) => {
                    tracing::warn!(
                        event_id = %record.id,
                        error = %err,
                        "Skipping undecodable event"
                    );
                    continue;
                }
            };
            occurrences.extend(
                self.expander
                    .expand(&base, start, end)
                    .into_iter()
                    .map(EventRecord::from_occurrence),
            );
        }

        occurrences.sort_by(|a, b| (a.start_date, &a.id).cmp(&(b.start_date, &b.id)));
        tracing::debug!(
            events = events.len(),
            occurrences = occurrences.len(),
            "Listed occurrences"
        );
        Ok(occurrences)
    }

    /// ## Summary
    /// Expands the event `id` over `start..=end`.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` for an unknown id, or
    /// `ServiceError::InvalidField` if its recurrence cannot be decoded.
    #[tracing::instrument(skip(self))]
    pub async fn event_occurrences(
        &self,
        id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<EventRecord>> {
        let record = self.require_event(id).await?;
        let base = record.to_base_event()?;
        Ok(self
            .expander
            .expand(&base, start, end)
            .into_iter()
            .map(EventRecord::from_occurrence)
            .collect())
    }

    /// ## Summary
    /// Excludes `date` from the series `id`. Adding an existing exception is a no-op.
    ///
    /// Returns the stored parent record.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` for an unknown id and
    /// `ServiceError::ValidationError` if the event does not recur.
    #[tracing::instrument(skip(self))]
    pub async fn add_exception(&self, id: &str, date: NaiveDate) -> ServiceResult<EventRecord> {
        let mut added = false;
        let added_slot = &mut added;
        let record = self
            .store
            .update_event(
                id,
                Box::new(move |record: &mut EventRecord| -> ServiceResult<()> {
                    if record.recurrence_rule()?.is_none() {
                        return Err(not_recurring(&record.id));
                    }
                    *added_slot = record.add_exception(date)?;
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        if added {
            tracing::info!(event_id = %id, %date, "Added recurrence exception");
        } else {
            tracing::debug!(event_id = %id, %date, "Exception already present");
        }
        Ok(record)
    }

    /// ## Summary
    /// Replaces the occurrence of `id` on `date` with a standalone event.
    ///
    /// The new event gets a fresh id, `date` as its start and a
    /// `parent_event_id` pointing back at the series; `date` is then excluded
    /// from the series so the instance appears only once. The occurrence check
    /// and the exception are applied to the parent in one store update, so two
    /// detaches of the same date cannot both succeed.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` for an unknown id and
    /// `ServiceError::ValidationError` if `date` is not an occurrence of the series.
    #[tracing::instrument(skip(self))]
    pub async fn detach_instance(
        &self,
        id: &str,
        date: NaiveDate,
        overrides: InstanceOverride,
    ) -> ServiceResult<EventRecord> {
        let expander = self.expander;
        let mut detached = None;
        let detached_slot = &mut detached;
        self.store
            .update_event(
                id,
                Box::new(move |parent: &mut EventRecord| -> ServiceResult<()> {
                    let base = parent.to_base_event()?;
                    if base.recurrence.is_none() {
                        return Err(not_recurring(&parent.id));
                    }
                    if expander.expand(&base, date, date).is_empty() {
                        return Err(ServiceError::ValidationError(format!(
                            "{date} is not an occurrence of event {}",
                            parent.id
                        )));
                    }
                    *detached_slot = Some(detached_instance(parent, date, overrides));
                    parent.add_exception(date)?;
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        let detached =
            detached.ok_or(CoreError::InvariantViolation("detach stored no instance"))?;
        self.store.put_event(detached.clone()).await?;

        tracing::info!(
            event_id = %id,
            detached_id = %detached.id,
            %date,
            "Detached recurring instance"
        );
        Ok(detached)
    }

    /// ## Summary
    /// Stores `record` after checking that its recurrence decodes.
    ///
    /// A blank id is replaced by a generated one.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidField` if a recurrence field is malformed.
    #[tracing::instrument(skip(self, record), fields(event_id = %record.id))]
    pub async fn put_event(&self, mut record: EventRecord) -> ServiceResult<EventRecord> {
        record.recurrence_rule()?;
        if record.id.trim().is_empty() {
            record.id = uuid::Uuid::now_v7().to_string();
        }
        self.store.put_event(record.clone()).await?;
        tracing::debug!(event_id = %record.id, "Stored event");
        Ok(record)
    }

    async fn require_event(&self, id: &str) -> ServiceResult<EventRecord> {
        self.store
            .get_event(id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

/// The standalone copy of `parent` on `date`.
fn detached_instance(
    parent: &EventRecord,
    date: NaiveDate,
    overrides: InstanceOverride,
) -> EventRecord {
    let mut detached = parent.clone();
    detached.id = uuid::Uuid::now_v7().to_string();
    detached.start_date = date;
    detached.parent_event_id = Some(parent.id.clone());
    detached.is_recurring_instance = false;
    detached.clear_recurrence();
    if let Some(title) = overrides.title {
        detached.title = title;
    }
    if let Some(description) = overrides.description {
        detached.description = Some(description);
    }
    detached
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("event {id}"))
}

fn not_recurring(id: &str) -> ServiceError {
    ServiceError::ValidationError(format!("event {id} is not recurring"))
}
