use crate::{services::reservations, session::Session};
use chrono::{Duration, Utc};
use log::info;
use models::{
    reservation::{Reservation, ReservationQuery, ReservationStatus},
    stats::{StatusCounts, StatusFilter, filter_by_status},
};

/// How far back and ahead the review list reaches
pub const PAST_DAYS: i64 = 30;
pub const FUTURE_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    Approve,
    Reject,
}

/// The open approve/reject dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDecision {
    pub reservation_id: i32,
    pub kind: DecisionKind,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminReservationsPage {
    pub reservations: Vec<Reservation>,
    pub filter: StatusFilter,
    pub decision: Option<PendingDecision>,
    pub banner: Option<String>,
}

impl Default for AdminReservationsPage {
    fn default() -> Self {
        Self {
            reservations: Vec::new(),
            filter: StatusFilter::Only(ReservationStatus::Pending),
            decision: None,
            banner: None,
        }
    }
}

impl AdminReservationsPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, session: &mut Session) {
        let now = Utc::now();
        let query = ReservationQuery::between(
            now - Duration::days(PAST_DAYS),
            now + Duration::days(FUTURE_DAYS),
        );

        match reservations::list(&session.api, &query).await {
            Ok(reservations) => {
                self.reservations = reservations;
                self.banner = None;
            }
            Err(err) => self.banner = session.report(&err),
        }
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.reservations)
    }

    pub fn visible(&self) -> Vec<&Reservation> {
        filter_by_status(&self.reservations, self.filter)
    }

    /// Opens the dialog; only pending reservations can be decided
    pub fn open_decision(&mut self, reservation_id: i32, kind: DecisionKind) -> bool {
        let decidable = self
            .reservations
            .iter()
            .any(|r| r.id == reservation_id && r.status.is_decidable());
        if decidable {
            self.decision = Some(PendingDecision {
                reservation_id,
                kind,
                note: String::new(),
            });
        }
        decidable
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        if let Some(decision) = self.decision.as_mut() {
            decision.note = note.into();
        }
    }

    pub fn close_decision(&mut self) {
        self.decision = None;
    }

    /// Sends the open decision and reloads the list. The dialog stays open on failure.
    pub async fn confirm(&mut self, session: &mut Session) -> bool {
        let Some(decision) = self.decision.clone() else {
            return false;
        };
        let note = Some(decision.note.trim().to_string()).filter(|n| !n.is_empty());

        let result = match decision.kind {
            DecisionKind::Approve => {
                reservations::approve(&session.api, decision.reservation_id, note).await
            }
            DecisionKind::Reject => {
                reservations::reject(&session.api, decision.reservation_id, note).await
            }
        };

        match result {
            Ok(reservation) => {
                info!(
                    "Reservation {} is now {}",
                    reservation.id, reservation.status
                );
                self.decision = None;
                self.load(session).await;
                true
            }
            Err(err) => {
                self.banner = session.report(&err);
                false
            }
        }
    }
}
