//! Tests for detached instance overrides.

use salvo::http::StatusCode;
use serde_json::{Value, json};

use super::helpers::*;

fn book_club() -> rally_test::component::record::EventRecord {
    let mut record = recurring("club", "monthly", date(2025, 1, 31));
    record.title = "Book club".to_string();
    record.recurrence_week_of_month = Some(-1);
    record.recurrence_day_of_week = Some("fri".to_string());
    record
        .extra
        .insert("location".to_string(), json!("Library"));
    record
}

/// ## Summary
/// A detached instance replaces the generated occurrence exactly once.
#[test_log::test(tokio::test)]
async fn detached_instance_appears_once() {
    let service = create_test_service(vec![book_club()]);

    let response = TestRequest::post(&event_action_path("club", "detach"))
        .json(json!({ "date": "2025-02-28", "title": "Book club (author visit)" }))
        .send(&service)
        .await;
    response.assert_status(StatusCode::CREATED);
    let detached: Value = response.json();
    let detached_id = detached["id"].as_str().expect("id").to_string();
    assert_ne!(detached_id, "club_2025-02-28");
    assert_eq!(detached["parent_event_id"], "club");
    assert_eq!(detached["location"], "Library");

    let response = TestRequest::get(&events_path("2025-01-01", "2025-03-31"))
        .send(&service)
        .await;
    assert_eq!(
        response.dates(),
        vec!["2025-01-31", "2025-02-28", "2025-03-28"]
    );
    assert_eq!(
        response.ids(),
        vec!["club_2025-01-31".to_string(), detached_id, "club_2025-03-28".to_string()]
    );
    let body: Vec<Value> = response.json();
    assert_eq!(body[1]["title"], "Book club (author visit)");
    assert_eq!(body[1]["is_recurring_instance"], false);
}

/// ## Summary
/// Only dates the series actually produces can be detached, and only once.
#[test_log::test(tokio::test)]
async fn detach_rejects_non_occurrences() {
    let service = create_test_service(vec![book_club()]);

    TestRequest::post(&event_action_path("club", "detach"))
        .json(json!({ "date": "2025-02-21" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    TestRequest::post(&event_action_path("club", "detach"))
        .json(json!({ "date": "2025-02-28" }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED);

    // Already excluded from the series.
    TestRequest::post(&event_action_path("club", "detach"))
        .json(json!({ "date": "2025-02-28" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// ## Summary
/// Detaching from a one-off event is rejected.
#[test_log::test(tokio::test)]
async fn detach_one_off_is_rejected() {
    let service = create_test_service(vec![one_off("gig", "Gig", date(2025, 6, 1))]);

    TestRequest::post(&event_action_path("gig", "detach"))
        .json(json!({ "date": "2025-06-01" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
