use crate::{
    api::ApiClient,
    error::ApiError,
    services::reservations,
    session::Session,
};
use chrono::{DateTime, Duration, Utc};
use log::info;
use models::{
    calendar::CalendarView,
    reservation::{ReportQuery, Reservation, ReservationQuery},
    stats::{DashboardStats, UPCOMING_DAYS, UPCOMING_LIMIT},
};

pub const LOAD_ERROR_MESSAGE: &str = "Could not load reservations.";
pub const REPORT_ERROR_MESSAGE: &str = "Could not generate the report.";

/// A downloaded PDF and the name to save it under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardPage {
    pub upcoming: Vec<Reservation>,
    pub stats: Option<DashboardStats>,
    pub error: Option<String>,
    pub report_error: Option<String>,
}

async fn fetch(
    api: &ApiClient,
    admin: bool,
    query: &ReservationQuery,
) -> Result<Vec<Reservation>, ApiError> {
    if admin {
        reservations::list(api, query).await
    } else {
        reservations::mine(api, query).await
    }
}

impl DashboardPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admins see everyone's reservations, others only their own
    pub async fn load(&mut self, session: &mut Session, now: DateTime<Utc>) {
        let admin = session.is_admin();
        let month = CalendarView::current(now, &session.tz);
        let Some((month_start, month_end)) = month.month_bounds(&session.tz) else {
            return;
        };
        let upcoming_query = ReservationQuery::between(now, now + Duration::days(UPCOMING_DAYS));
        let month_query = ReservationQuery::between(month_start, month_end);

        let result = futures::try_join!(
            fetch(&session.api, admin, &upcoming_query),
            fetch(&session.api, admin, &month_query),
        );

        match result {
            Ok((upcoming, month)) => {
                self.stats = Some(DashboardStats::compute(&month, &upcoming));
                self.upcoming = upcoming.into_iter().take(UPCOMING_LIMIT).collect();
                self.error = None;
            }
            Err(err) => {
                session.report(&err);
                self.error = Some(LOAD_ERROR_MESSAGE.to_string());
            }
        }
    }

    pub fn time_until_next(&self, now: DateTime<Utc>) -> Option<String> {
        self.stats.as_ref().and_then(|s| s.time_until_next(now))
    }

    /// Unfiltered report of every reservation
    pub async fn download_report(&mut self, session: &mut Session) -> Option<ReportFile> {
        self.report_error = None;
        match reservations::download_report(&session.api, &ReportQuery::default()).await {
            Ok(bytes) => {
                let today = Utc::now().with_timezone(&session.tz).format("%Y-%m-%d");
                info!("Downloaded report ({} bytes)", bytes.len());
                Some(ReportFile {
                    file_name: format!("reservations-report-{today}.pdf"),
                    bytes,
                })
            }
            Err(err) => {
                session.report(&err);
                self.report_error = Some(REPORT_ERROR_MESSAGE.to_string());
                None
            }
        }
    }
}
