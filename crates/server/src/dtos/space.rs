use super::{ensure_ordered, parse_param};
use crate::error::AppError;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AvailabilityParams {
    /// ISO 8601
    pub start: Option<String>,
    /// ISO 8601
    pub end: Option<String>,
}

impl AvailabilityParams {
    /// Both ends are required
    pub fn window(&self, tz: &FixedOffset) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
        let (Some(start), Some(end)) = (
            parse_param(self.start.as_deref(), tz)?,
            parse_param(self.end.as_deref(), tz)?,
        ) else {
            return Err(AppError::BadRequest("Invalid start or end".to_string()));
        };
        ensure_ordered(start, end)?;
        Ok((start, end))
    }
}
