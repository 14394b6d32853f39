use crate::{
    services::{reservations, spaces},
    session::Session,
};
use chrono::{NaiveDate, Utc};
use models::{
    calendar::{CalendarView, MonthGrid, bucket_by_local_day},
    reservation::{Reservation, ReservationQuery},
    space::{Space, active_spaces},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarPage {
    pub view: CalendarView,
    pub spaces: Vec<Space>,
    pub space_id: Option<i32>,
    pub reservations: Vec<Reservation>,
    pub banner: Option<String>,
}

impl CalendarPage {
    pub fn new(session: &Session) -> Self {
        Self {
            view: CalendarView::current(Utc::now(), &session.tz),
            spaces: Vec::new(),
            space_id: None,
            reservations: Vec::new(),
            banner: None,
        }
    }

    /// Loads the space filter options and the displayed month
    pub async fn load(&mut self, session: &mut Session) {
        match spaces::list(&session.api).await {
            Ok(all) => self.spaces = active_spaces(&all),
            Err(err) => self.banner = session.report(&err),
        }
        self.load_month(session).await;
    }

    pub async fn load_month(&mut self, session: &mut Session) {
        let Some((start, end)) = self.view.month_bounds(&session.tz) else {
            return;
        };
        let query = ReservationQuery::between(start, end).in_space(self.space_id);

        match reservations::list(&session.api, &query).await {
            Ok(reservations) => {
                self.reservations = reservations;
                self.banner = None;
            }
            Err(err) => self.banner = session.report(&err),
        }
    }

    pub async fn filter_space(&mut self, session: &mut Session, space_id: Option<i32>) {
        self.space_id = space_id;
        self.load_month(session).await;
    }

    pub async fn next_month(&mut self, session: &mut Session) {
        self.view = self.view.next_month();
        self.load_month(session).await;
    }

    pub async fn previous_month(&mut self, session: &mut Session) {
        self.view = self.view.previous_month();
        self.load_month(session).await;
    }

    pub async fn today(&mut self, session: &mut Session) {
        self.view = self.view.go_to_today();
        self.load_month(session).await;
    }

    pub fn select(&mut self, day: NaiveDate) {
        self.view.select(day);
    }

    pub fn grid(&self, session: &Session) -> MonthGrid<'_, Reservation> {
        self.view.grid(&self.reservations, &session.tz)
    }

    /// Reservations starting on the selected local day, in received order
    pub fn selected_day(&self, session: &Session) -> Vec<&Reservation> {
        let Some(day) = self.view.selected() else {
            return Vec::new();
        };
        bucket_by_local_day(&self.reservations, &session.tz)
            .remove(&day)
            .unwrap_or_default()
    }
}
