//! Tests for recurrence exceptions.

use salvo::http::StatusCode;
use serde_json::{Value, json};

use super::helpers::*;

fn standup() -> rally_test::component::record::EventRecord {
    let mut record = recurring("standup", "weekly", date(2025, 1, 6));
    record.recurrence_days_of_week = Some(r#"["monday","wednesday"]"#.to_string());
    record
}

/// ## Summary
/// Stored exceptions are excluded from listings.
#[test_log::test(tokio::test)]
async fn stored_exceptions_are_skipped() {
    let mut record = standup();
    record.recurrence_exceptions = Some(r#"["2025-01-08","2025-01-13"]"#.to_string());
    let service = create_test_service(vec![record]);

    let response = TestRequest::get(&events_path("2025-01-06", "2025-01-15"))
        .send(&service)
        .await;

    assert_eq!(response.dates(), vec!["2025-01-06", "2025-01-15"]);
}

/// ## Summary
/// Exceptions do not consume the occurrence count.
#[test_log::test(tokio::test)]
async fn exceptions_do_not_consume_count() {
    let mut record = standup();
    record.recurrence_end_type = Some("after_occurrences".to_string());
    record.recurrence_occurrences = Some(3);
    record.recurrence_exceptions = Some(r#"["2025-01-08"]"#.to_string());
    let service = create_test_service(vec![record]);

    let response = TestRequest::get(&events_path("2025-01-01", "2025-02-28"))
        .send(&service)
        .await;

    assert_eq!(
        response.dates(),
        vec!["2025-01-06", "2025-01-13", "2025-01-15"]
    );
}

/// ## Summary
/// Adding an exception over HTTP is idempotent and removes the instance.
#[test_log::test(tokio::test)]
async fn add_exception_round_trip() {
    let service = create_test_service(vec![standup()]);

    for _ in 0..2 {
        let response = TestRequest::post(&event_action_path("standup", "exceptions"))
            .json(json!({ "date": "2025-01-13" }))
            .send(&service)
            .await;
        response.assert_status(StatusCode::OK);
        let parent: Value = response.json();
        assert_eq!(parent["recurrence_exceptions"], r#"["2025-01-13"]"#);
    }

    let response = TestRequest::get(&occurrences_path("standup", "2025-01-12", "2025-01-16"))
        .send(&service)
        .await;
    assert_eq!(response.ids(), vec!["standup_2025-01-15"]);
}

/// ## Summary
/// Exceptions are rejected for one-off and unknown events.
#[test_log::test(tokio::test)]
async fn add_exception_errors() {
    let service = create_test_service(vec![one_off("lunch", "Lunch", date(2025, 1, 8))]);

    let response = TestRequest::post(&event_action_path("lunch", "exceptions"))
        .json(json!({ "date": "2025-01-08" }))
        .send(&service)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().is_some_and(|e| e.contains("not recurring")));

    TestRequest::post(&event_action_path("ghost", "exceptions"))
        .json(json!({ "date": "2025-01-08" }))
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
