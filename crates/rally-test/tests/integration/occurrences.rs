//! Tests for window listings.
//!
//! Verifies expansion through the full router: frequencies, terminators and caps.

use salvo::http::StatusCode;
use serde_json::Value;

use super::helpers::*;

/// ## Summary
/// The healthcheck route is mounted under the API prefix.
#[test_log::test(tokio::test)]
async fn healthcheck_is_mounted() {
    let service = create_test_service(Vec::new());

    let response = TestRequest::get("/api/app/healthcheck").send(&service).await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body, "OK");
}

/// ## Summary
/// Daily every third day with a count bound stops after the counted dates.
#[test_log::test(tokio::test)]
async fn daily_interval_with_count() {
    let mut record = recurring("water", "daily", date(2025, 3, 1));
    record.recurrence_interval = Some(3);
    record.recurrence_end_type = Some("after_occurrences".to_string());
    record.recurrence_occurrences = Some(4);
    let service = create_test_service(vec![record]);

    let response = TestRequest::get(&events_path("2025-03-01", "2025-04-30"))
        .send(&service)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.dates(),
        vec!["2025-03-01", "2025-03-04", "2025-03-07", "2025-03-10"]
    );
}

/// ## Summary
/// A counted series keeps counting from its anchor when the window starts later.
#[test_log::test(tokio::test)]
async fn count_is_measured_from_anchor() {
    let mut record = recurring("water", "daily", date(2025, 3, 1));
    record.recurrence_end_type = Some("after_occurrences".to_string());
    record.recurrence_occurrences = Some(5);
    let service = create_test_service(vec![record]);

    let response = TestRequest::get(&events_path("2025-03-04", "2025-03-31"))
        .send(&service)
        .await;

    assert_eq!(response.dates(), vec!["2025-03-04", "2025-03-05"]);
}

/// ## Summary
/// Biweekly Monday/Wednesday with an inclusive end date.
#[test_log::test(tokio::test)]
async fn biweekly_until_end_date() {
    let mut record = recurring("sync", "weekly", date(2025, 1, 6));
    record.recurrence_interval = Some(2);
    record.recurrence_days_of_week = Some(r#"["Monday","wed"]"#.to_string());
    record.recurrence_end_type = Some("end_date".to_string());
    record.recurrence_end_date = Some(date(2025, 1, 20));
    let service = create_test_service(vec![record]);

    let response = TestRequest::get(&events_path("2025-01-01", "2025-02-28"))
        .send(&service)
        .await;

    assert_eq!(
        response.dates(),
        vec!["2025-01-06", "2025-01-08", "2025-01-20"]
    );
}

/// ## Summary
/// Monthly on the 31st clamps to the last day of shorter months by default.
#[test_log::test(tokio::test)]
async fn monthly_month_end_clamps() {
    let mut record = recurring("rent", "monthly", date(2025, 1, 31));
    record.recurrence_day_of_month = Some(31);
    let service = create_test_service(vec![record]);

    let response = TestRequest::get(&occurrences_path("rent", "2025-01-01", "2025-06-30"))
        .send(&service)
        .await;

    assert_eq!(
        response.dates(),
        vec![
            "2025-01-31",
            "2025-02-28",
            "2025-03-31",
            "2025-04-30",
            "2025-05-31",
            "2025-06-30",
        ]
    );
}

/// ## Summary
/// Monthly on the second Tuesday.
#[test_log::test(tokio::test)]
async fn monthly_nth_weekday() {
    let mut record = recurring("council", "monthly", date(2025, 1, 14));
    record.recurrence_week_of_month = Some(2);
    record.recurrence_day_of_week = Some("tuesday".to_string());
    let service = create_test_service(vec![record]);

    let response = TestRequest::get(&events_path("2025-01-01", "2025-04-30"))
        .send(&service)
        .await;

    assert_eq!(
        response.dates(),
        vec!["2025-01-14", "2025-02-11", "2025-03-11", "2025-04-08"]
    );
}

/// ## Summary
/// Yearly over several months, every other year.
#[test_log::test(tokio::test)]
async fn yearly_selected_months() {
    let mut record = recurring("review", "yearly", date(2024, 3, 15));
    record.recurrence_interval = Some(2);
    record.recurrence_months = Some("[3, 9]".to_string());
    let service = create_test_service(vec![record]);

    let response = TestRequest::get(&events_path("2024-01-01", "2027-12-31"))
        .send(&service)
        .await;

    assert_eq!(
        response.dates(),
        vec!["2024-03-15", "2024-09-15", "2026-03-15", "2026-09-15"]
    );
}

/// ## Summary
/// A window far past the anchor of a never-ending series starts on the lattice.
#[test_log::test(tokio::test)]
async fn far_window_stays_aligned() {
    let mut record = recurring("standup", "daily", date(2000, 1, 1));
    record.recurrence_interval = Some(7);
    let service = create_test_service(vec![record]);

    let response = TestRequest::get(&events_path("2025-01-01", "2025-01-20"))
        .send(&service)
        .await;

    // 2000-01-01 and 2025-01-04 are both Saturdays.
    assert_eq!(
        response.dates(),
        vec!["2025-01-04", "2025-01-11", "2025-01-18"]
    );
}

/// ## Summary
/// A never-ending daily series is capped at 1000 occurrences per query.
#[test_log::test(tokio::test)]
async fn listing_is_capped() {
    let service = create_test_service(vec![recurring("tick", "daily", date(2020, 1, 1))]);

    let response = TestRequest::get(&occurrences_path("tick", "2020-01-01", "2029-12-31"))
        .send(&service)
        .await;

    let body: Vec<Value> = response.json();
    assert_eq!(body.len(), 1000);
    assert_eq!(body[999]["start_date"], "2022-09-26");
}

/// ## Summary
/// Unknown frequencies expand to nothing; other events are unaffected.
#[test_log::test(tokio::test)]
async fn unrecognized_frequency_is_empty() {
    let service = create_test_service(vec![
        recurring("odd", "fortnightly", date(2025, 1, 1)),
        one_off("dentist", "Dentist", date(2025, 1, 15)),
    ]);

    let response = TestRequest::get(&events_path("2025-01-01", "2025-01-31"))
        .send(&service)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.ids(), vec!["dentist"]);

    let response = TestRequest::get(&occurrences_path("odd", "2025-01-01", "2025-01-31"))
        .send(&service)
        .await;
    response.assert_status(StatusCode::OK);
    assert!(response.ids().is_empty());
}

/// ## Summary
/// Inverted and malformed windows.
#[test_log::test(tokio::test)]
async fn window_validation() {
    let service = create_test_service(vec![recurring("tick", "daily", date(2025, 1, 1))]);

    let response = TestRequest::get(&events_path("2025-02-01", "2025-01-01"))
        .send(&service)
        .await;
    response.assert_status(StatusCode::OK);
    assert!(response.ids().is_empty());

    TestRequest::get(&events_path("yesterday", "2025-01-01"))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    TestRequest::get(&format!("{EVENTS_ROUTE_PREFIX}?start=2025-01-01"))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// ## Summary
/// Events created over HTTP are expanded by later listings, extra fields included.
#[test_log::test(tokio::test)]
async fn created_event_is_listed() {
    let service = create_test_service(Vec::new());

    let response = TestRequest::post(EVENTS_ROUTE_PREFIX)
        .json(serde_json::json!({
            "id": "yoga",
            "title": "Yoga",
            "start_date": "2025-05-05",
            "is_recurring": true,
            "recurrence_type": "weekly",
            "recurrence_days_of_week": "[\"monday\", \"thursday\"]",
            "location": "Studio B"
        }))
        .send(&service)
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = TestRequest::get(&events_path("2025-05-05", "2025-05-12"))
        .send(&service)
        .await;
    assert_eq!(
        response.ids(),
        vec!["yoga_2025-05-05", "yoga_2025-05-08", "yoga_2025-05-12"]
    );
    let body: Vec<Value> = response.json();
    assert!(body.iter().all(|r| r["location"] == "Studio B"));
}
