use chrono::NaiveDate;
use salvo::Request;

use crate::error::{AppError, AppResult};

/// ## Summary
/// Reads the inclusive `start`/`end` query window.
///
/// An inverted window is accepted; expanding it yields nothing.
///
/// ## Errors
/// Returns `AppError::BadRequest` if either bound is missing or not a `YYYY-MM-DD` date.
pub(super) fn query_window(req: &Request) -> AppResult<(NaiveDate, NaiveDate)> {
    Ok((query_date(req, "start")?, query_date(req, "end")?))
}

fn query_date(req: &Request, name: &str) -> AppResult<NaiveDate> {
    let raw = req
        .query::<String>(name)
        .ok_or_else(|| AppError::BadRequest(format!("missing query parameter {name}")))?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| AppError::BadRequest(format!("invalid {name} date {raw:?}: {err}")))
}

/// Extracts the `{id}` path segment.
pub(super) fn path_id(req: &Request) -> AppResult<String> {
    req.param::<String>("id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("event id required".to_string()))
}
