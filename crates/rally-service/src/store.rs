//! Event persistence.
//!
//! The calendar reads every event, reads one by id, upserts, and changes a
//! stored event in place with [`EventStore::update_event`].
//! [`MemoryEventStore`] is the bundled implementation; it can be seeded from a
//! JSON file of [`EventRecord`] rows.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::ServiceResult;
use crate::record::EventRecord;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = ServiceResult<T>> + Send + 'a>>;

/// An in-place change to one stored record.
pub type RecordUpdate<'a> = Box<dyn FnOnce(&mut EventRecord) -> ServiceResult<()> + Send + 'a>;

/// Storage for event records.
pub trait EventStore: Send + Sync {
    /// Every stored event, in id order.
    fn list_events(&self) -> StoreFuture<'_, Vec<EventRecord>>;

    /// The event with `id`, if stored.
    fn get_event<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<EventRecord>>;

    /// Inserts `record`, replacing any event with the same id.
    fn put_event(&self, record: EventRecord) -> StoreFuture<'_, ()>;

    /// ## Summary
    /// Applies `update` to the event with `id` and stores the result.
    ///
    /// No other write to the store interleaves with the read, the update and
    /// the write. When `update` fails the stored event is left unchanged.
    /// Returns the updated record, or `None` if `id` is not stored.
    ///
    /// ## Errors
    /// Returns the error produced by `update`.
    fn update_event<'a>(
        &'a self,
        id: &'a str,
        update: RecordUpdate<'a>,
    ) -> StoreFuture<'a, Option<EventRecord>>;
}

/// ## Summary
/// In-process event store.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: Arc<RwLock<BTreeMap<String, EventRecord>>>,
}

impl MemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding `records`. Later duplicates of an id win.
    #[must_use]
    pub fn from_records<I: IntoIterator<Item = EventRecord>>(records: I) -> Self {
        let events = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            events: Arc::new(RwLock::new(events)),
        }
    }

    /// ## Summary
    /// Loads a JSON array of event records from `path`.
    ///
    /// ## Errors
    /// Returns `ServiceError::IoError` if the file cannot be read, or
    /// `ServiceError::SerdeError` if it is not an array of records.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load_json_file(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        let records: Vec<EventRecord> = serde_json::from_str(&contents)?;
        tracing::info!(count = records.len(), "Loaded seed events");
        Ok(Self::from_records(records))
    }
}

impl EventStore for MemoryEventStore {
    fn list_events(&self) -> StoreFuture<'_, Vec<EventRecord>> {
        Box::pin(async move { Ok(self.events.read().await.values().cloned().collect()) })
    }

    fn get_event<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<EventRecord>> {
        Box::pin(async move { Ok(self.events.read().await.get(id).cloned()) })
    }

    fn put_event(&self, record: EventRecord) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.events.write().await.insert(record.id.clone(), record);
            Ok(())
        })
    }

    fn update_event<'a>(
        &'a self,
        id: &'a str,
        update: RecordUpdate<'a>,
    ) -> StoreFuture<'a, Option<EventRecord>> {
        Box::pin(async move {
            let mut events = self.events.write().await;
            let Some(stored) = events.get_mut(id) else {
                return Ok(None);
            };
            let mut updated = stored.clone();
            update(&mut updated)?;
            stored.clone_from(&updated);
            Ok(Some(updated))
        })
    }
}
