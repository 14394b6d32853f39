use crate::{
    services::{reservations, spaces},
    session::Session,
};
use chrono::{NaiveDate, Utc};
use log::{debug, info};
use models::{
    calendar::{CalendarView, MonthGrid},
    forms::{FormState, ReservationForm},
    reservation::{Reservation, ReservationQuery},
    space::{Space, active_spaces},
};

/// The booking screen: form on one side, the selected space's month on the other
#[derive(Debug, Clone, PartialEq)]
pub struct CreateReservationPage {
    pub form: FormState<ReservationForm>,
    /// Active spaces only, in server order
    pub spaces: Vec<Space>,
    pub calendar: CalendarView,
    /// Pending and approved reservations of the selected space in the displayed month
    pub busy: Vec<Reservation>,
}

impl CreateReservationPage {
    pub fn new(session: &Session) -> Self {
        Self {
            form: FormState::new(ReservationForm::default()),
            spaces: Vec::new(),
            calendar: CalendarView::current(Utc::now(), &session.tz),
            busy: Vec::new(),
        }
    }

    /// Loads the active spaces and preselects the first one when none is chosen
    pub async fn load(&mut self, session: &mut Session) {
        match spaces::list(&session.api).await {
            Ok(all) => self.spaces = active_spaces(&all),
            Err(err) => {
                if let Some(message) = session.report(&err) {
                    self.form.set_banner(message);
                }
                return;
            }
        }

        if self.form.values().space_id().is_none()
            && let Some(first) = self.spaces.first().map(|s| s.id)
        {
            self.select_space(session, Some(first)).await;
        }
    }

    pub async fn select_space(&mut self, session: &mut Session, space_id: Option<i32>) {
        self.form.values_mut().select_space(space_id);
        self.load_busy(session).await;
    }

    /// A click on the mini calendar books 09:00 to 10:00 that day
    pub fn select_date(&mut self, day: NaiveDate) {
        self.form.values_mut().prefill_day(day);
        self.calendar.select(day);
        self.calendar = self.calendar.with_highlighted(Some(day));
    }

    pub async fn next_month(&mut self, session: &mut Session) {
        self.calendar = self.calendar.next_month();
        self.load_busy(session).await;
    }

    pub async fn previous_month(&mut self, session: &mut Session) {
        self.calendar = self.calendar.previous_month();
        self.load_busy(session).await;
    }

    /// Refreshes the month's markers for the selected space; with no space there are none.
    ///
    /// The list endpoint already limits non-admins to pending and approved
    /// reservations, so markers keep their status colour.
    pub async fn load_busy(&mut self, session: &mut Session) {
        let Some(space_id) = self.form.values().space_id() else {
            self.busy.clear();
            return;
        };
        let Some((start, end)) = self.calendar.month_bounds(&session.tz) else {
            return;
        };

        let query = ReservationQuery::between(start, end).in_space(Some(space_id));
        match reservations::list(&session.api, &query).await {
            Ok(reservations) => self.busy = reservations,
            Err(err) => {
                if let Some(message) = session.report(&err) {
                    self.form.set_banner(message);
                }
            }
        }
    }

    pub fn grid(&self, session: &Session) -> MonthGrid<'_, Reservation> {
        let calendar = self
            .calendar
            .with_highlighted(self.form.values().highlighted_date());
        calendar.grid(&self.busy, &session.tz)
    }

    /// Checks the fields, then the duration, then asks the server.
    ///
    /// A duration problem or a server rejection lands in the banner; the form
    /// is cleared only after a successful create.
    pub async fn submit(&mut self, session: &mut Session) -> Option<Reservation> {
        let payload = match self.form.submit() {
            Ok(form) => form.to_payload(&session.tz, &session.policy),
            Err(rejected) => {
                debug!("Reservation form blocked: {rejected}");
                return None;
            }
        };

        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                self.form.set_banner(err.to_string());
                return None;
            }
        };

        match reservations::create(&session.api, &payload).await {
            Ok(reservation) => {
                info!("Reservation {} requested", reservation.id);
                session.toasts.success("Reservation requested");
                self.form.reset(ReservationForm::default());
                self.busy.clear();
                Some(reservation)
            }
            Err(err) => {
                if let Some(message) = session.report(&err) {
                    self.form.set_banner(message);
                }
                None
            }
        }
    }
}
