//! Tests for configuration-driven behavior.

use salvo::http::StatusCode;

use super::helpers::*;
use rally_test::component::config::Settings;
use rally_test::component::record::EventRecord;
use rally_test::component::store::MemoryEventStore;

fn day_31() -> EventRecord {
    let mut record = recurring("rent", "monthly", date(2025, 1, 31));
    record.recurrence_day_of_month = Some(31);
    record
}

/// ## Summary
/// `month_end_policy = "skip"` drops months without the requested day.
#[test_log::test(tokio::test)]
async fn skip_policy_from_config() {
    let settings = Settings::from_toml("[calendar]\nmonth_end_policy = \"skip\"\n")
        .expect("valid settings");
    let service =
        create_test_service_with(settings, MemoryEventStore::from_records([day_31()]));

    let response = TestRequest::get(&events_path("2025-01-01", "2025-06-30"))
        .send(&service)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.dates(),
        vec!["2025-01-31", "2025-03-31", "2025-05-31"]
    );
}

/// ## Summary
/// A configured cap below the hard limit bounds every expansion.
#[test_log::test(tokio::test)]
async fn configured_cap() {
    let settings =
        Settings::from_toml("[calendar]\nmax_occurrences = 3\n").expect("valid settings");
    let service = create_test_service_with(
        settings,
        MemoryEventStore::from_records([recurring("tick", "daily", date(2025, 1, 1))]),
    );

    let response = TestRequest::get(&events_path("2025-01-01", "2025-12-31"))
        .send(&service)
        .await;

    assert_eq!(
        response.dates(),
        vec!["2025-01-01", "2025-01-02", "2025-01-03"]
    );
}

/// ## Summary
/// A seed file populates the store.
#[test_log::test(tokio::test)]
async fn seed_file_is_served() {
    let path = std::env::temp_dir().join(format!("rally-it-{}.json", uuid::Uuid::now_v7()));
    let seed = serde_json::to_string(&vec![day_31()]).expect("serializable");
    tokio::fs::write(&path, seed).await.expect("write seed");

    let store = MemoryEventStore::load_json_file(&path).await.expect("seed loads");
    tokio::fs::remove_file(&path).await.expect("cleanup");
    let service = create_test_service_with(test_config(), store);

    let response = TestRequest::get(&occurrences_path("rent", "2025-02-01", "2025-02-28"))
        .send(&service)
        .await;

    assert_eq!(response.ids(), vec!["rent_2025-02-28"]);
}
