use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler, writing::Json};

use rally_service::record::EventRecord;

use super::window::{path_id, query_window};
use crate::calendar_handler::get_calendar_from_depot;
use crate::error::{AppError, AppResult};

/// ## Summary
/// GET /calendar/events?start=&end= - Every event expanded over the window.
///
/// ## Errors
/// Returns HTTP 400 if `start` or `end` is missing or malformed
/// Returns HTTP 500 if the calendar service is unavailable
#[handler]
pub(super) async fn list_events(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<Vec<EventRecord>> = async {
        let (start, end) = query_window(req)?;
        let calendar = get_calendar_from_depot(depot)?;
        Ok(calendar.list_occurrences(start, end).await?)
    }
    .await;

    match result {
        Ok(records) => res.render(Json(records)),
        Err(err) => err.render(res),
    }
}

/// ## Summary
/// GET /calendar/events/{id}/occurrences?start=&end= - One event expanded over the window.
///
/// ## Errors
/// Returns HTTP 400 if the window is malformed or the event cannot be decoded
/// Returns HTTP 404 if the event does not exist
#[handler]
pub(super) async fn event_occurrences(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<Vec<EventRecord>> = async {
        let id = path_id(req)?;
        let (start, end) = query_window(req)?;
        let calendar = get_calendar_from_depot(depot)?;
        Ok(calendar.event_occurrences(&id, start, end).await?)
    }
    .await;

    match result {
        Ok(records) => res.render(Json(records)),
        Err(err) => err.render(res),
    }
}

/// ## Summary
/// POST /calendar/events - Stores an event record.
///
/// ## Errors
/// Returns HTTP 400 if the body is not a record or its recurrence fields are malformed
#[handler]
pub(super) async fn create_event(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<EventRecord> = async {
        let record: EventRecord = req.parse_json().await.map_err(|err| {
            tracing::debug!(error = ?err, "Failed to parse event record");
            AppError::BadRequest("Invalid request body".to_string())
        })?;
        let calendar = get_calendar_from_depot(depot)?;
        Ok(calendar.put_event(record).await?)
    }
    .await;

    match result {
        Ok(record) => {
            tracing::info!(event_id = %record.id, "Event created");
            res.status_code(StatusCode::CREATED);
            res.render(Json(record));
        }
        Err(err) => err.render(res),
    }
}
