use crate::{
    reservation::{Reservation, ReservationStatus},
    space::BusyBlock,
};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Markers drawn in a day cell before the rest collapse into "+N"
pub const MAX_VISIBLE_MARKERS: usize = 3;

/// Anything that can be placed on the calendar by its start instant
pub trait CalendarEntry {
    fn starts_at(&self) -> DateTime<Utc>;

    fn status(&self) -> Option<ReservationStatus> {
        None
    }
}

impl CalendarEntry for Reservation {
    fn starts_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    fn status(&self) -> Option<ReservationStatus> {
        Some(self.status)
    }
}

impl CalendarEntry for BusyBlock {
    fn starts_at(&self) -> DateTime<Utc> {
        self.start_at
    }
}

/// Colour family of a day marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerTone {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    /// Entries without a status, e.g. availability blocks
    Busy,
}

impl From<Option<ReservationStatus>> for MarkerTone {
    fn from(status: Option<ReservationStatus>) -> Self {
        match status {
            Some(ReservationStatus::Pending) => Self::Pending,
            Some(ReservationStatus::Approved) => Self::Approved,
            Some(ReservationStatus::Rejected) => Self::Rejected,
            Some(ReservationStatus::Cancelled) => Self::Cancelled,
            None => Self::Busy,
        }
    }
}

/// What a calendar is currently showing: a month plus the marked days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarView {
    month: NaiveDate,
    today: NaiveDate,
    selected: Option<NaiveDate>,
    highlighted: Option<NaiveDate>,
}

impl CalendarView {
    /// Shows the month containing `reference`
    pub fn new(reference: NaiveDate, today: NaiveDate) -> Self {
        Self {
            month: first_of_month(reference),
            today,
            selected: None,
            highlighted: None,
        }
    }

    /// Shows the current month in `tz`
    pub fn current<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Self {
        let today = now.with_timezone(tz).date_naive();
        Self::new(today, today)
    }

    pub fn with_selected(mut self, selected: Option<NaiveDate>) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_highlighted(mut self, highlighted: Option<NaiveDate>) -> Self {
        self.highlighted = highlighted;
        self
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.selected = Some(date);
    }

    /// First day of the displayed month
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn highlighted(&self) -> Option<NaiveDate> {
        self.highlighted
    }

    pub fn next_month(self) -> Self {
        Self {
            month: self.month + Months::new(1),
            ..self
        }
    }

    pub fn previous_month(self) -> Self {
        Self {
            month: self.month - Months::new(1),
            ..self
        }
    }

    /// Jumps back to the month of "today" and selects it
    pub fn go_to_today(self) -> Self {
        Self {
            month: first_of_month(self.today),
            selected: Some(self.today),
            ..self
        }
    }

    pub fn last_of_month(&self) -> NaiveDate {
        last_of_month(self.month)
    }

    /// Monday on or before the first of the month
    pub fn first_visible_day(&self) -> NaiveDate {
        week_start(self.month)
    }

    /// Sunday on or after the last day of the month
    pub fn last_visible_day(&self) -> NaiveDate {
        week_end(self.last_of_month())
    }

    /// First and last instant of the displayed month in `tz`.
    ///
    /// `None` only when local midnight of the first or last day does not exist
    /// in `tz`.
    pub fn month_bounds<Tz: TimeZone>(&self, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = tz
            .from_local_datetime(&self.month.and_time(NaiveTime::MIN))
            .earliest()?;
        let next = tz
            .from_local_datetime(&(self.last_of_month() + Days::new(1)).and_time(NaiveTime::MIN))
            .earliest()?;
        let end = next - chrono::Duration::milliseconds(1);

        Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }

    /// Lays out the month and drops every entry into the cell of its local start day
    pub fn grid<'a, T, Tz>(&self, entries: &'a [T], tz: &Tz) -> MonthGrid<'a, T>
    where
        T: CalendarEntry,
        Tz: TimeZone,
    {
        let by_day = bucket_by_local_day(entries, tz);
        let first = self.first_visible_day();
        let last = self.last_visible_day();

        let mut weeks = Vec::new();
        let mut week = Vec::with_capacity(7);
        let mut day = first;

        while day <= last {
            week.push(DayCell {
                date: day,
                in_month: day.year() == self.month.year() && day.month() == self.month.month(),
                is_today: day == self.today,
                is_selected: self.selected == Some(day),
                is_highlighted: self.highlighted == Some(day),
                entries: by_day.get(&day).cloned().unwrap_or_default(),
            });

            if week.len() == 7 {
                weeks.push(std::mem::replace(&mut week, Vec::with_capacity(7)));
            }
            day = day + Days::new(1);
        }

        MonthGrid {
            month: self.month,
            weeks,
        }
    }
}

/// Groups entries by the calendar day of their start instant in `tz`.
///
/// Entries keep the order they were received in within a day.
pub fn bucket_by_local_day<'a, T, Tz>(entries: &'a [T], tz: &Tz) -> HashMap<NaiveDate, Vec<&'a T>>
where
    T: CalendarEntry,
    Tz: TimeZone,
{
    let mut by_day: HashMap<NaiveDate, Vec<&'a T>> = HashMap::new();
    for entry in entries {
        let day = entry.starts_at().with_timezone(tz).date_naive();
        by_day.entry(day).or_default().push(entry);
    }

    by_day
}

/// One day of the month grid
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell<'a, T> {
    pub date: NaiveDate,
    /// False for the padding days borrowed from adjacent months
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_highlighted: bool,
    pub entries: Vec<&'a T>,
}

impl<'a, T: CalendarEntry> DayCell<'a, T> {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Entries drawn as markers, in received order
    pub fn visible(&self) -> &[&'a T] {
        &self.entries[..self.entries.len().min(MAX_VISIBLE_MARKERS)]
    }

    /// Number hidden behind the "+N" indicator, if any
    pub fn overflow(&self) -> Option<usize> {
        self.entries
            .len()
            .checked_sub(MAX_VISIBLE_MARKERS)
            .filter(|hidden| *hidden > 0)
    }

    pub fn tones(&self) -> Vec<MarkerTone> {
        self.visible()
            .iter()
            .map(|entry| MarkerTone::from(entry.status()))
            .collect()
    }
}

/// A month laid out as full Monday-first weeks
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid<'a, T> {
    month: NaiveDate,
    weeks: Vec<Vec<DayCell<'a, T>>>,
}

impl<'a, T> MonthGrid<'a, T> {
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    /// Rows of exactly seven cells
    pub fn weeks(&self) -> &[Vec<DayCell<'a, T>>] {
        &self.weeks
    }

    pub fn cells(&self) -> impl Iterator<Item = &DayCell<'a, T>> {
        self.weeks.iter().flatten()
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell<'a, T>> {
        self.cells().find(|cell| cell.date == date)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.weeks.first().and_then(|w| w.first()).map(|c| c.date)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.weeks.last().and_then(|w| w.last()).map(|c| c.date)
    }
}

const WEEKDAY_HEADER: &str = " Mo  Tu  We  Th  Fr  Sa  Su";

impl<T: CalendarEntry> Display for MonthGrid<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{}", self.month.format("%B %Y"))?;
        writeln!(f, "{WEEKDAY_HEADER}")?;

        for week in &self.weeks {
            let mut line = String::new();
            for cell in week {
                if !cell.in_month {
                    line.push_str("    ");
                    continue;
                }

                let flag = match (cell.count(), cell.overflow()) {
                    (0, _) => ' ',
                    (_, Some(_)) => '+',
                    _ => '*',
                };
                let day = cell.date.day();
                if cell.is_today {
                    line.push_str(&format!("[{day:>2}]"));
                } else {
                    line.push_str(&format!(" {day:>2}{flag}"));
                }
            }
            writeln!(f, "{}", line.trim_end())?;
        }

        Ok(())
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date) + Months::new(1) - Days::new(1)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

fn week_end(date: NaiveDate) -> NaiveDate {
    date + Days::new(u64::from(6 - date.weekday().num_days_from_monday()))
}
