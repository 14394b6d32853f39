use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::fmt::Display;

/// Formats accepted for timestamps without an offset
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Format of an HTML `datetime-local` input value
pub const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parses an ISO-8601 timestamp as sent to the API.
///
/// Values carrying an offset are taken as-is; naive values are interpreted in
/// `zone`. Returns `None` for anything unparseable.
pub fn parse_api_datetime(value: &str, zone: &FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })?;

    resolve_local(&naive, zone)
}

/// Parses the value of a `datetime-local` input (`2024-03-10T09:00`)
pub fn parse_local_input(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    NAIVE_FORMATS[..3]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Maps a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (DST fold) resolve to the earlier instant; times that do
/// not exist (DST gap) yield `None`.
pub fn resolve_local<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Renders an instant as a `datetime-local` input value in `tz`
pub fn to_local_input<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    instant
        .with_timezone(tz)
        .format(LOCAL_INPUT_FORMAT)
        .to_string()
}

/// `dd/MM/yyyy HH:mm`
pub fn format_date_time<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format("%d/%m/%Y %H:%M").to_string()
}

/// `dd/MM/yyyy`
pub fn format_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format("%d/%m/%Y").to_string()
}

/// `HH:mm`
pub fn format_time<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bogota() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    #[test]
    fn test_parse_api_datetime_with_offset() {
        let parsed = parse_api_datetime("2024-03-10T09:00:00-05:00", &bogota()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 10, 14, 0, 0).unwrap());

        let zulu = parse_api_datetime("2024-03-10T09:00:00Z", &bogota()).unwrap();
        assert_eq!(zulu, Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_api_datetime_naive_uses_zone() {
        let parsed = parse_api_datetime("2024-03-10T09:00", &bogota()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 10, 14, 0, 0).unwrap());

        let date_only = parse_api_datetime("2024-03-10", &bogota()).unwrap();
        assert_eq!(date_only, Utc.with_ymd_and_hms(2024, 3, 10, 5, 0, 0).unwrap());

        assert!(parse_api_datetime("yesterday", &bogota()).is_none());
    }

    #[test]
    fn test_local_input_round_trip() {
        let naive = parse_local_input("2024-03-10T09:00").unwrap();
        let instant = resolve_local(&naive, &bogota()).unwrap();
        assert_eq!(to_local_input(&instant, &bogota()), "2024-03-10T09:00");
        assert!(parse_local_input("").is_none());
        assert!(parse_local_input("10/03/2024").is_none());
    }

    #[test]
    fn test_display_formats() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 14, 5, 0).unwrap();
        assert_eq!(format_date_time(&instant, &bogota()), "10/03/2024 09:05");
        assert_eq!(format_date(&instant, &bogota()), "10/03/2024");
        assert_eq!(format_time(&instant, &Utc), "14:05");
    }
}
