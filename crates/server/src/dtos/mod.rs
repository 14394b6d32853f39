pub mod reservation;
pub mod space;

use crate::error::AppError;
use chrono::{DateTime, FixedOffset, Utc};
use models::datetime::parse_api_datetime;

/// Parses an optional query timestamp; naive values use the server zone
pub fn parse_param(
    value: Option<&str>,
    tz: &FixedOffset,
) -> Result<Option<DateTime<Utc>>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_api_datetime(raw, tz).map(Some).ok_or_else(|| {
            AppError::BadRequest("Invalid datetime format. Use ISO 8601.".to_string())
        }),
    }
}

pub fn ensure_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::BadRequest(
            "Start must be before end".to_string(),
        ));
    }
    Ok(())
}
