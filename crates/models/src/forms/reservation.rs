use super::Form;
use crate::{
    datetime::{LOCAL_INPUT_FORMAT, parse_local_input, resolve_local},
    reservation::NewReservation,
    validation::{self, DurationError, DurationPolicy, FieldError, check_duration},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationField {
    Space,
    Title,
    Description,
    StartAt,
    EndAt,
}

/// The create-reservation form.
///
/// Times are kept as `datetime-local` strings in the viewer's zone and the
/// space as the selected option's id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationForm {
    pub space: String,
    pub title: String,
    pub description: String,
    pub start_at: String,
    pub end_at: String,
}

impl ReservationForm {
    pub fn space_id(&self) -> Option<i32> {
        self.space.trim().parse().ok()
    }

    pub fn select_space(&mut self, space_id: Option<i32>) {
        self.space = space_id.map(|id| id.to_string()).unwrap_or_default();
    }

    pub fn start_local(&self) -> Option<NaiveDateTime> {
        parse_local_input(&self.start_at)
    }

    pub fn end_local(&self) -> Option<NaiveDateTime> {
        parse_local_input(&self.end_at)
    }

    /// Day to highlight on the mini calendar
    pub fn highlighted_date(&self) -> Option<NaiveDate> {
        self.start_local().map(|dt| dt.date())
    }

    /// Fills in 09:00 to 10:00 on the clicked calendar day
    pub fn prefill_day(&mut self, day: NaiveDate) {
        let at = |hour| {
            day.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
                .format(LOCAL_INPUT_FORMAT)
                .to_string()
        };
        self.start_at = at(9);
        self.end_at = at(10);
    }

    /// Start and end as instants, resolving the wall-clock values in `tz`
    pub fn window<Tz: TimeZone>(&self, tz: &Tz) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let resolve = |naive: Option<NaiveDateTime>| naive.and_then(|n| resolve_local(&n, tz));
        (resolve(self.start_local()), resolve(self.end_local()))
    }

    /// Runs the duration guard and builds the request body
    pub fn to_payload<Tz: TimeZone>(
        &self,
        tz: &Tz,
        policy: &DurationPolicy,
    ) -> Result<NewReservation, DurationError> {
        let (start, end) = self.window(tz);
        check_duration(start.as_ref(), end.as_ref(), policy)?;

        match (start, end) {
            (Some(start_at), Some(end_at)) => Ok(NewReservation {
                title: self.title.clone(),
                description: self.description.clone(),
                start_at,
                end_at,
                space_id: self.space_id(),
            }),
            _ => Err(DurationError::Missing),
        }
    }

    fn check_start(&self) -> Result<(), FieldError> {
        validation::required(&self.start_at, "Start time")?;
        self.start_local()
            .map(|_| ())
            .ok_or(FieldError::InvalidDateTime)
    }

    fn check_end(&self) -> Result<(), FieldError> {
        validation::required(&self.end_at, "End time")?;
        let end = self.end_local().ok_or(FieldError::InvalidDateTime)?;

        match self.start_local() {
            Some(start) if end <= start => Err(FieldError::EndNotAfterStart),
            _ => Ok(()),
        }
    }
}

impl Form for ReservationForm {
    type Field = ReservationField;

    fn fields() -> &'static [ReservationField] {
        &[
            ReservationField::Space,
            ReservationField::Title,
            ReservationField::Description,
            ReservationField::StartAt,
            ReservationField::EndAt,
        ]
    }

    fn value(&self, field: ReservationField) -> &str {
        match field {
            ReservationField::Space => &self.space,
            ReservationField::Title => &self.title,
            ReservationField::Description => &self.description,
            ReservationField::StartAt => &self.start_at,
            ReservationField::EndAt => &self.end_at,
        }
    }

    fn set_value(&mut self, field: ReservationField, value: String) {
        match field {
            ReservationField::Space => self.space = value,
            ReservationField::Title => self.title = value,
            ReservationField::Description => self.description = value,
            ReservationField::StartAt => self.start_at = value,
            ReservationField::EndAt => self.end_at = value,
        }
    }

    fn validate_field(&self, field: ReservationField) -> Result<(), FieldError> {
        match field {
            ReservationField::Title => validation::required(&self.title, "Title"),
            ReservationField::StartAt => self.check_start(),
            ReservationField::EndAt => self.check_end(),
            ReservationField::Space | ReservationField::Description => Ok(()),
        }
    }

    fn validate_submit(&self, field: ReservationField) -> Result<(), FieldError> {
        match field {
            ReservationField::Space if self.space_id().is_none() => {
                Err(FieldError::NoSpaceSelected)
            }
            _ => self.validate_field(field),
        }
    }
}
