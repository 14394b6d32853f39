use crate::reservation::{Reservation, ReservationStatus};
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// How far ahead the dashboard looks for upcoming reservations
pub const UPCOMING_DAYS: i64 = 7;
/// Upcoming reservations listed on the dashboard
pub const UPCOMING_LIMIT: usize = 5;

/// Per-status tallies shown on the my-reservations filter buttons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn tally(reservations: &[Reservation]) -> Self {
        reservations.iter().fold(Self::default(), |mut counts, r| {
            counts.total += 1;
            match r.status {
                ReservationStatus::Pending => counts.pending += 1,
                ReservationStatus::Approved => counts.approved += 1,
                ReservationStatus::Rejected => counts.rejected += 1,
                ReservationStatus::Cancelled => counts.cancelled += 1,
            }
            counts
        })
    }

    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.total,
            StatusFilter::Only(ReservationStatus::Pending) => self.pending,
            StatusFilter::Only(ReservationStatus::Approved) => self.approved,
            StatusFilter::Only(ReservationStatus::Rejected) => self.rejected,
            StatusFilter::Only(ReservationStatus::Cancelled) => self.cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReservationStatus),
}

impl StatusFilter {
    /// The filter buttons in display order
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Only(ReservationStatus::Pending),
        Self::Only(ReservationStatus::Approved),
        Self::Only(ReservationStatus::Rejected),
        Self::Only(ReservationStatus::Cancelled),
    ];

    pub fn matches(self, status: ReservationStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(status) => status.label(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = crate::reservation::ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            ReservationStatus::from_str(s).map(Self::Only)
        }
    }
}

pub fn filter_by_status(reservations: &[Reservation], filter: StatusFilter) -> Vec<&Reservation> {
    reservations
        .iter()
        .filter(|r| filter.matches(r.status))
        .collect()
}

/// Figures on the dashboard cards
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_month: usize,
    pub pending: usize,
    pub approved: usize,
    pub next_approved: Option<Reservation>,
}

impl DashboardStats {
    /// `month` holds this month's reservations, `upcoming` the next few days'
    /// in server order.
    pub fn compute(month: &[Reservation], upcoming: &[Reservation]) -> Self {
        let counts = StatusCounts::tally(month);
        Self {
            total_month: counts.total,
            pending: counts.pending,
            approved: counts.approved,
            next_approved: upcoming
                .iter()
                .find(|r| r.status == ReservationStatus::Approved)
                .cloned(),
        }
    }

    pub fn time_until_next(&self, now: DateTime<Utc>) -> Option<String> {
        self.next_approved
            .as_ref()
            .map(|r| time_until(now, r.start_at))
    }
}

/// Countdown label: `Xd Yh` when more than a day away, `Xh Ym` otherwise.
///
/// Instants already in the past read `0h 0m`.
pub fn time_until(now: DateTime<Utc>, at: DateTime<Utc>) -> String {
    let minutes = (at - now).num_minutes().max(0);
    let hours = minutes / 60;

    if hours > 24 {
        format!("{}d {}h", hours / 24, hours % 24)
    } else {
        format!("{}h {}m", hours, minutes % 60)
    }
}
