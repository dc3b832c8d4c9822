use chrono::NaiveDate;
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler, writing::Json};
use serde::Deserialize;

use rally_service::calendar::InstanceOverride;
use rally_service::record::EventRecord;

use super::window::path_id;
use crate::calendar_handler::get_calendar_from_depot;
use crate::error::{AppError, AppResult};

/// ## Summary
/// Add exception request payload
#[derive(Debug, Deserialize)]
pub struct ExceptionRequest {
    pub date: NaiveDate,
}

/// ## Summary
/// Detach instance request payload
#[derive(Debug, Deserialize)]
pub struct DetachRequest {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub overrides: InstanceOverride,
}

/// ## Summary
/// POST /calendar/events/{id}/exceptions - Excludes one date from a series.
///
/// ## Errors
/// Returns HTTP 400 if the body is malformed or the event does not recur
/// Returns HTTP 404 if the event does not exist
#[handler]
pub(super) async fn add_exception(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<EventRecord> = async {
        let id = path_id(req)?;
        let body: ExceptionRequest = req.parse_json().await.map_err(|err| {
            tracing::debug!(error = ?err, "Failed to parse exception request");
            AppError::BadRequest("Invalid request body".to_string())
        })?;
        let calendar = get_calendar_from_depot(depot)?;
        Ok(calendar.add_exception(&id, body.date).await?)
    }
    .await;

    match result {
        Ok(record) => res.render(Json(record)),
        Err(err) => err.render(res),
    }
}

/// ## Summary
/// POST /calendar/events/{id}/detach - Replaces one occurrence with a standalone event.
///
/// ## Side Effects
/// - Stores the detached event
/// - Adds the date to the parent's exceptions
///
/// ## Errors
/// Returns HTTP 400 if the body is malformed or the date is not an occurrence
/// Returns HTTP 404 if the event does not exist
#[handler]
pub(super) async fn detach_instance(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<EventRecord> = async {
        let id = path_id(req)?;
        let body: DetachRequest = req.parse_json().await.map_err(|err| {
            tracing::debug!(error = ?err, "Failed to parse detach request");
            AppError::BadRequest("Invalid request body".to_string())
        })?;
        let calendar = get_calendar_from_depot(depot)?;
        Ok(calendar.detach_instance(&id, body.date, body.overrides).await?)
    }
    .await;

    match result {
        Ok(record) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(record));
        }
        Err(err) => err.render(res),
    }
}
