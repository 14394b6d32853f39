use crate::{services::reservations, session::Session};
use log::info;
use models::{
    reservation::{Reservation, ReservationQuery},
    stats::{StatusCounts, StatusFilter, filter_by_status},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MyReservationsPage {
    pub reservations: Vec<Reservation>,
    pub filter: StatusFilter,
    pub banner: Option<String>,
}

impl MyReservationsPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, session: &mut Session) {
        match reservations::mine(&session.api, &ReservationQuery::default()).await {
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

    /// Cancels and reloads. Reservations that are no longer live are left alone.
    pub async fn cancel(&mut self, session: &mut Session, id: i32) -> bool {
        let cancellable = self
            .reservations
            .iter()
            .any(|r| r.id == id && r.can_cancel());
        if !cancellable {
            return false;
        }

        match reservations::cancel(&session.api, id).await {
            Ok(_) => {
                info!("Reservation {id} cancelled");
                session.toasts.success("Reservation cancelled");
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
