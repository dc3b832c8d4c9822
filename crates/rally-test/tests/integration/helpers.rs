#![allow(clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Building a fully wired Salvo service over an in-memory store
//! - Making HTTP requests
//! - Asserting on responses

use std::sync::Arc;

use chrono::NaiveDate;
use salvo::http::StatusCode;
use salvo::prelude::*;
use salvo::test::{ResponseExt, TestClient};
use serde::de::DeserializeOwned;
use serde_json::Value;

use rally_test::component::calendar::CalendarService;
use rally_test::component::config::{ConfigHandler, Settings};
use rally_test::component::handler::CalendarServiceHandler;
use rally_test::component::record::EventRecord;
use rally_test::component::store::{EventStore, MemoryEventStore};

pub use rally_test::app::api::EVENTS_ROUTE_PREFIX;
pub use tracing;

/// Settings used when a test does not supply its own.
#[must_use]
pub fn test_config() -> Settings {
    Settings::from_toml("[server]\nhost = \"127.0.0.1\"\n").expect("test config should load")
}

/// ## Summary
/// Creates a service with every route, backed by a store holding `records`.
///
/// Mirrors the router assembled by the binary.
#[must_use]
pub fn create_test_service(records: Vec<EventRecord>) -> Service {
    create_test_service_with(test_config(), MemoryEventStore::from_records(records))
}

/// Creates a service over `store` using `settings`.
#[must_use]
pub fn create_test_service_with(settings: Settings, store: MemoryEventStore) -> Service {
    let store: Arc<dyn EventStore> = Arc::new(store);
    let calendar = CalendarService::from_config(store, &settings.calendar);
    let router = Router::new()
        .hoop(CalendarServiceHandler {
            service: Arc::new(calendar),
        })
        .hoop(ConfigHandler { settings })
        .push(rally_test::app::api::routes());
    Service::new(router)
}

#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A one-off event.
#[must_use]
pub fn one_off(id: &str, title: &str, start: NaiveDate) -> EventRecord {
    EventRecord::new(id, title, start)
}

/// A recurring event of `kind` with the remaining recurrence columns unset.
#[must_use]
pub fn recurring(id: &str, kind: &str, start: NaiveDate) -> EventRecord {
    let mut record = EventRecord::new(id, id, start);
    record.is_recurring = true;
    record.recurrence_type = Some(kind.to_string());
    record
}

/// Path of the window listing for all events.
#[must_use]
pub fn events_path(start: &str, end: &str) -> String {
    format!("{EVENTS_ROUTE_PREFIX}?start={start}&end={end}")
}

/// Path of the window listing for one event.
#[must_use]
pub fn occurrences_path(id: &str, start: &str, end: &str) -> String {
    format!("{}?start={start}&end={end}", event_action_path(id, "occurrences"))
}

/// Path of a per-event route such as `detach` or `exceptions`.
#[must_use]
pub fn event_action_path(id: &str, action: &str) -> String {
    format!("{EVENTS_ROUTE_PREFIX}/{id}/{action}")
}

/// Test request builder for constructing HTTP requests.
pub struct TestRequest {
    post: bool,
    path: String,
    body: Option<Value>,
}

impl TestRequest {
    /// Creates a new GET request.
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self {
            post: false,
            path: path.to_string(),
            body: None,
        }
    }

    /// Creates a new POST request.
    #[must_use]
    pub fn post(path: &str) -> Self {
        Self {
            post: true,
            path: path.to_string(),
            body: None,
        }
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// ## Summary
    /// Sends the request to the service and returns the response.
    ///
    /// ## Panics
    /// Panics if the response body cannot be read.
    pub async fn send(self, service: &Service) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{}", self.path);
        let mut client = if self.post {
            TestClient::post(&url)
        } else {
            TestClient::get(&url)
        };
        if let Some(body) = &self.body {
            client = client.json(body);
        }

        let mut response = client.send(service).await;
        let status = response.status_code.unwrap_or(StatusCode::OK);
        let body = response.take_string().await.expect("Failed to read response body");

        TestResponse { status, body }
    }
}

/// Test response wrapper with assertion helpers.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    /// Asserts the response status code.
    ///
    /// ## Panics
    /// Panics if the status does not match.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "unexpected status, body: {}",
            self.body
        );
        self
    }

    /// Parses the body as JSON.
    ///
    /// ## Panics
    /// Panics if the body is not valid JSON for `T`.
    #[must_use]
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_str(&self.body).expect("response body should be JSON")
    }

    /// Parses the body as a list of records and returns their ids.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.field("id")
    }

    /// Parses the body as a list of records and returns their start dates.
    #[must_use]
    pub fn dates(&self) -> Vec<String> {
        self.field("start_date")
    }

    fn field(&self, name: &str) -> Vec<String> {
        self.json::<Vec<Value>>()
            .iter()
            .filter_map(|record| record[name].as_str().map(str::to_string))
            .collect()
    }
}
