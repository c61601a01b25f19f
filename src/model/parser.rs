// File: ./src/model/parser.rs
// Turns raw deadline expressions into absolute instants.
//
// A raw expression is a timestamp string, optionally carrying the year
// templates `%y` (target year) and `%Y` (previous year), interpreted in a
// named timezone or, when none is given, in "Anywhere on Earth" (UTC-12).
// The literal "TBA" means the deadline is not known yet.

use crate::error::ParseError;
use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// Sentinel for a deadline that has not been announced.
pub const TBA: &str = "TBA";

const AOE_OFFSET_SECS: i32 = 12 * 3600;

// Tried in order; `%.f` also accepts a missing fraction.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// The timezone a naive timestamp is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Fixed(FixedOffset),
    Named(Tz),
    /// The timezone of the machine running the board.
    Local,
}

impl Zone {
    /// UTC-12, the latest timezone on the planet.
    pub fn anywhere_on_earth() -> Self {
        Zone::Fixed(FixedOffset::west_opt(AOE_OFFSET_SECS).unwrap_or_else(|| Utc.fix()))
    }

    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    /// Resolves a wall-clock time in this zone. Ambiguous times (DST fold)
    /// resolve to the earlier instant; times inside a DST gap are an error.
    pub fn resolve(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>, ParseError> {
        let resolved = match self {
            Zone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            Zone::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            Zone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
        };
        resolved.ok_or_else(|| ParseError::NonexistentLocalTime(naive.to_string(), self.to_string()))
    }

    /// Expresses an instant as wall-clock time in this zone.
    pub fn localize(&self, instant: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            Zone::Fixed(offset) => instant.with_timezone(offset),
            Zone::Named(tz) => instant.with_timezone(tz).fixed_offset(),
            Zone::Local => instant.with_timezone(&Local).fixed_offset(),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Fixed(offset) => write!(f, "UTC{}", offset),
            Zone::Named(tz) => write!(f, "{}", tz.name()),
            Zone::Local => write!(f, "local"),
        }
    }
}

impl FromStr for Zone {
    type Err = ParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let trimmed = name.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "AOE" => return Ok(Self::anywhere_on_earth()),
            "UTC" | "GMT" | "Z" => return Ok(Self::utc()),
            "LOCAL" => return Ok(Zone::Local),
            _ => {}
        }
        if let Some(offset) = parse_utc_offset(trimmed) {
            return Ok(Zone::Fixed(offset));
        }
        trimmed
            .parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| ParseError::UnknownTimezone(trimmed.to_string()))
    }
}

/// Parses `UTC-12`, `UTC+5:30`, `GMT+2`. Unlike the IANA `Etc/GMT+N` zones
/// the sign is the conventional one: `UTC-12` is behind UTC.
fn parse_utc_offset(name: &str) -> Option<FixedOffset> {
    let upper = name.to_ascii_uppercase();
    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))?;
    let sign = match rest.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits = &rest[1..];
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None => (digits.parse::<i32>().ok()?, 0),
    };
    if hours > 14 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Replaces the first `%y` with `year` and the first `%Y` with `year - 1`.
pub fn substitute_year(raw: &str, year: i32) -> String {
    raw.replacen("%y", &year.to_string(), 1)
        .replacen("%Y", &(year - 1).to_string(), 1)
}

/// Parses one timestamp into wall-clock time of `zone`.
///
/// Naive strings (date, date + minutes, date + seconds) are read in `zone`.
/// Strings carrying their own RFC 3339 offset keep their instant but are
/// converted to `zone`, so the minute seen by `boundary::correct` is the
/// minute a reader in `zone` sees.
pub fn parse_timestamp(text: &str, zone: &Zone) -> Result<DateTime<FixedOffset>, ParseError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(zone.localize(&dt));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return zone.resolve(naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return zone.resolve(date.and_time(NaiveTime::MIN));
    }
    Err(ParseError::InvalidTimestamp(text.to_string()))
}

/// Converts a raw catalog expression into an instant.
///
/// Returns `Ok(None)` for the "TBA" sentinel. A missing or blank timezone
/// means Anywhere on Earth.
pub fn parse(
    raw: &str,
    year: i32,
    timezone: Option<&str>,
) -> Result<Option<DateTime<FixedOffset>>, ParseError> {
    if raw == TBA {
        return Ok(None);
    }
    let zone = match timezone.map(str::trim).filter(|tz| !tz.is_empty()) {
        Some(name) => name.parse::<Zone>()?,
        None => Zone::anywhere_on_earth(),
    };
    parse_timestamp(&substitute_year(raw, year), &zone).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_tba_is_unspecified() {
        assert_eq!(parse("TBA", 2026, None), Ok(None));
        // Case-sensitive
        assert!(parse("tba", 2026, None).is_err());
    }

    #[test]
    fn test_year_templates_are_order_independent() {
        let direct = substitute_year("%y-%Y", 2025);
        let reversed = "%y-%Y".replacen("%Y", "2024", 1).replacen("%y", "2025", 1);
        assert_eq!(direct, "2025-2024");
        assert_eq!(direct, reversed);
    }

    #[test]
    fn test_template_expands_previous_year() {
        let dt = parse("%Y-12-01 12:00", 2026, Some("UTC")).unwrap().unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("2025-12-01T12:00:00Z"));
    }

    #[test]
    fn test_default_zone_is_anywhere_on_earth() {
        let dt = parse("%y-03-15T23:59", 2026, None).unwrap().unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -12 * 3600);
        assert_eq!(dt.with_timezone(&Utc), utc("2026-03-16T11:59:00Z"));
    }

    #[test]
    fn test_blank_timezone_means_default() {
        let a = parse("2026-01-01 10:00", 2026, Some("  ")).unwrap();
        let b = parse("2026-01-01 10:00", 2026, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_named_timezone() {
        let dt = parse("2026-07-01 09:30:00", 2026, Some("America/New_York"))
            .unwrap()
            .unwrap();
        // EDT is UTC-4 in July
        assert_eq!(dt.with_timezone(&Utc), utc("2026-07-01T13:30:00Z"));
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_fixed_offset_names() {
        assert_eq!(
            "UTC-12".parse::<Zone>().unwrap(),
            Zone::anywhere_on_earth()
        );
        assert_eq!(
            "UTC+5:30".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::east_opt(5 * 3600 + 1800).unwrap())
        );
        // IANA Etc zones keep their inverted POSIX sign
        let etc = "Etc/GMT+12".parse::<Zone>().unwrap();
        let dt = parse_timestamp("2026-01-01 00:00", &etc).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -12 * 3600);
    }

    #[test]
    fn test_unknown_timezone_is_error() {
        assert_eq!(
            parse("2026-01-01", 2026, Some("Mars/Olympus")),
            Err(ParseError::UnknownTimezone("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn test_explicit_offset_is_read_in_record_zone() {
        let dt = parse("2026-05-01T10:00:00+02:00", 2026, Some("Asia/Tokyo"))
            .unwrap()
            .unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("2026-05-01T08:00:00Z"));
        assert_eq!(dt.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(dt.hour(), 17);
    }

    #[test]
    fn test_utc_string_is_localized_to_half_hour_zone() {
        let ist = "UTC+5:30".parse::<Zone>().unwrap();
        let dt = parse_timestamp("2026-03-15T18:29:00.000Z", &ist).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!((dt.hour(), dt.minute()), (23, 59));
    }

    #[test]
    fn test_date_only_is_midnight() {
        let dt = parse_timestamp("2026-02-10", &Zone::utc()).unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("2026-02-10T00:00:00Z"));
    }

    #[test]
    fn test_garbage_is_invalid_timestamp() {
        assert_eq!(
            parse("next tuesday", 2026, None),
            Err(ParseError::InvalidTimestamp("next tuesday".to_string()))
        );
    }

    #[test]
    fn test_dst_gap_is_error() {
        // 2026-03-08 02:30 does not exist in New York
        let zone = "America/New_York".parse::<Zone>().unwrap();
        assert!(matches!(
            parse_timestamp("2026-03-08 02:30", &zone),
            Err(ParseError::NonexistentLocalTime(_, _))
        ));
    }
}
