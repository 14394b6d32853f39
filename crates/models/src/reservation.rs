use crate::{space::Space, user::UserBasic};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use strum::EnumIter;
use thiserror::Error;

/// Lifecycle state of a reservation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ReservationStatus {
    /// Waiting for an admin decision
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Withdrawn by its owner or an admin
    Cancelled,
}

impl ReservationStatus {
    /// Statuses that occupy their space and take part in overlap checks
    pub const ACTIVE: [Self; 2] = [Self::Pending, Self::Approved];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    /// Only live requests can be cancelled
    pub fn is_cancellable(self) -> bool {
        self.is_active()
    }

    /// Approve/reject actions are offered for pending requests only
    pub fn is_decidable(self) -> bool {
        self == Self::Pending
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown reservation status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for ReservationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

impl Display for ReservationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[cfg(feature = "database")]
impl_text_value!(ReservationStatus, "ReservationStatus");

/// A booking of a space over a time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Reservation {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub space: Option<Space>,
    pub created_by: Option<UserBasic>,
    pub approved_by: Option<UserBasic>,
    #[serde(default)]
    pub decision_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub decision_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_at - self.start_at).num_minutes()
    }

    pub fn can_cancel(&self) -> bool {
        self.status.is_cancellable()
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.created_by.as_ref().is_some_and(|u| u.id == user_id)
    }

    /// Half-open interval intersection with `[start, end)`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_at < end && self.end_at > start
    }
}

/// Body of `POST /reservations/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewReservation {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Omitted: the server assigns its default space
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<i32>,
}

/// Admin edit of a reservation; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReservationChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
}

/// Body of the approve/reject actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Decision {
    #[serde(default)]
    pub note: Option<String>,
}

/// Query string of the reservation listing endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<i32>,
}

impl ReservationQuery {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            space_id: None,
        }
    }

    pub fn in_space(mut self, space_id: Option<i32>) -> Self {
        self.space_id = space_id;
        self
    }
}

/// Query string of the report endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<i32>,
    /// Comma separated statuses, or `all`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Parses a comma separated status filter, ignoring unknown values.
///
/// `None` means "no filter": the input was absent, `all`, or held nothing valid.
pub fn parse_status_filter(raw: Option<&str>) -> Option<Vec<ReservationStatus>> {
    let raw = raw?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return None;
    }

    let statuses: Vec<ReservationStatus> = raw
        .split(',')
        .filter_map(|part| ReservationStatus::from_str(part).ok())
        .collect();

    if statuses.is_empty() { None } else { Some(statuses) }
}
