use super::{ensure_ordered, parse_param};
use crate::error::AppError;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use database::services::reservation::ReportFilter;
use models::reservation::parse_status_filter;
use serde::Deserialize;
use utoipa::IntoParams;

/// Default window of the listing
const LIST_DAYS: i64 = 30;
/// Open side of a half-specified `mine` range
const MINE_DAYS: i64 = 365;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RangeParams {
    /// ISO 8601, defaults to now
    pub start: Option<String>,
    /// ISO 8601, defaults to 30 days from now
    pub end: Option<String>,
    /// Space id
    pub space: Option<i32>,
    /// Alias of `space`
    pub space_id: Option<i32>,
}

impl RangeParams {
    pub fn space(&self) -> Option<i32> {
        self.space.or(self.space_id)
    }

    /// The listing window; both ends have defaults
    pub fn window(
        &self,
        now: DateTime<Utc>,
        tz: &FixedOffset,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
        let start = parse_param(self.start.as_deref(), tz)?.unwrap_or(now);
        let end = parse_param(self.end.as_deref(), tz)?.unwrap_or(now + Duration::days(LIST_DAYS));
        ensure_ordered(start, end)?;
        Ok((start, end))
    }

    /// `None` unless at least one side was given
    pub fn mine_window(
        &self,
        now: DateTime<Utc>,
        tz: &FixedOffset,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, AppError> {
        let start = parse_param(self.start.as_deref(), tz)?;
        let end = parse_param(self.end.as_deref(), tz)?;
        if start.is_none() && end.is_none() {
            return Ok(None);
        }

        Ok(Some((
            start.unwrap_or(now - Duration::days(MINE_DAYS)),
            end.unwrap_or(now + Duration::days(MINE_DAYS)),
        )))
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub space: Option<i32>,
    pub space_id: Option<i32>,
    /// Comma separated statuses, or `all`
    pub status: Option<String>,
}

impl ReportParams {
    pub fn filter(&self, tz: &FixedOffset) -> Result<ReportFilter, AppError> {
        let start = parse_param(self.start.as_deref(), tz)?;
        let end = parse_param(self.end.as_deref(), tz)?;
        if let (Some(start), Some(end)) = (start, end) {
            ensure_ordered(start, end)?;
        }

        Ok(ReportFilter {
            start,
            end,
            space_id: self.space.or(self.space_id),
            statuses: parse_status_filter(self.status.as_deref()),
        })
    }
}
