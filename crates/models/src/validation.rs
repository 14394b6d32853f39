use chrono::{DateTime, Duration, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Why a single form field was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("Enter a valid date and time")]
    InvalidDateTime,
    #[error("End time must be after start time")]
    EndNotAfterStart,
    #[error("Select a space")]
    NoSpaceSelected,
}

/// Fails with [`FieldError::Required`] when `value` is blank
pub fn required(value: &str, field: &'static str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::Required(field))
    } else {
        Ok(())
    }
}

pub fn min_length(value: &str, field: &'static str, min: usize) -> Result<(), FieldError> {
    if value.trim().chars().count() < min {
        Err(FieldError::TooShort { field, min })
    } else {
        Ok(())
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Required, then shaped like `local@domain.tld`
pub fn email(value: &str) -> Result<(), FieldError> {
    required(value, "Email")?;
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(FieldError::InvalidEmail)
    }
}

/// Why a reservation window was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("Start and end times are required")]
    Missing,
    #[error("End time must be after start time")]
    EndNotAfterStart,
    #[error("Reservations must last at least {0} minutes")]
    TooShort(i64),
    #[error("Reservations cannot last more than {0} minutes")]
    TooLong(i64),
}

/// Allowed reservation lengths, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            min_minutes: 30,
            max_minutes: 240,
        }
    }
}

impl DurationPolicy {
    pub fn new(min_minutes: i64, max_minutes: i64) -> Self {
        Self {
            min_minutes,
            max_minutes,
        }
    }

    /// Checks a window that is already known to be complete
    pub fn check<Tz: TimeZone>(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> Result<(), DurationError> {
        let length = end.clone().signed_duration_since(start.clone());

        if length <= Duration::zero() {
            return Err(DurationError::EndNotAfterStart);
        }
        if length < Duration::minutes(self.min_minutes) {
            return Err(DurationError::TooShort(self.min_minutes));
        }
        if length > Duration::minutes(self.max_minutes) {
            return Err(DurationError::TooLong(self.max_minutes));
        }

        Ok(())
    }
}

/// Guards a reservation window before it is submitted
pub fn check_duration<Tz: TimeZone>(
    start: Option<&DateTime<Tz>>,
    end: Option<&DateTime<Tz>>,
    policy: &DurationPolicy,
) -> Result<(), DurationError> {
    match (start, end) {
        (Some(start), Some(end)) => policy.check(start, end),
        _ => Err(DurationError::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(email(""), Err(FieldError::Required("Email")));
        assert_eq!(email("   "), Err(FieldError::Required("Email")));
        assert_eq!(email("teacher"), Err(FieldError::InvalidEmail));
        assert_eq!(email("teacher@fesc"), Err(FieldError::InvalidEmail));
        assert_eq!(email("a b@fesc.local"), Err(FieldError::InvalidEmail));
        assert_eq!(email("teacher@fesc.local"), Ok(()));
    }

    #[test]
    fn test_min_length_counts_chars() {
        assert!(min_length("Á", "Name", 2).is_err());
        assert!(min_length("Áb", "Name", 2).is_ok());
        assert!(min_length("  a  ", "Name", 2).is_err());
    }

    #[test]
    fn test_duration_bounds_are_inclusive() {
        let policy = DurationPolicy::default();
        assert_eq!(policy.check(&at(9, 0), &at(9, 30)), Ok(()));
        assert_eq!(policy.check(&at(9, 0), &at(13, 0)), Ok(()));
        assert_eq!(
            policy.check(&at(9, 0), &at(9, 29)),
            Err(DurationError::TooShort(30))
        );
        assert_eq!(
            policy.check(&at(9, 0), &at(13, 1)),
            Err(DurationError::TooLong(240))
        );
    }

    #[test]
    fn test_partial_minutes_count() {
        let policy = DurationPolicy::default();
        let start = at(9, 0);
        let just_over = at(13, 0) + Duration::seconds(1);
        assert_eq!(
            policy.check(&start, &just_over),
            Err(DurationError::TooLong(240))
        );
    }

    #[test]
    fn test_end_must_follow_start() {
        let policy = DurationPolicy::default();
        assert_eq!(
            policy.check(&at(9, 0), &at(9, 0)),
            Err(DurationError::EndNotAfterStart)
        );
        assert_eq!(
            policy.check(&at(10, 0), &at(9, 0)),
            Err(DurationError::EndNotAfterStart)
        );
    }

    #[test]
    fn test_missing_side() {
        let policy = DurationPolicy::default();
        assert_eq!(
            check_duration(Some(&at(9, 0)), None, &policy),
            Err(DurationError::Missing)
        );
        assert_eq!(
            check_duration::<Utc>(None, None, &policy),
            Err(DurationError::Missing)
        );
        assert_eq!(
            check_duration(Some(&at(9, 0)), Some(&at(10, 0)), &policy),
            Ok(())
        );
    }

    #[test]
    fn test_custom_policy() {
        let policy = DurationPolicy::new(15, 60);
        assert_eq!(policy.check(&at(9, 0), &at(9, 15)), Ok(()));
        assert_eq!(
            policy.check(&at(9, 0), &at(10, 30)),
            Err(DurationError::TooLong(60))
        );
    }
}
