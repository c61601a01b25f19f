// File: ./src/model/boundary.rs
// Minute-boundary correction for human-entered deadlines.
use chrono::{DateTime, Duration, TimeZone, Timelike};

/// Normalizes an ambiguous boundary time, in the instant's own local offset.
///
/// `HH:00` moves one second back so the whole preceding minute counts,
/// `HH:59` is pushed to `HH:59:59`. Any other minute is left alone.
pub fn correct<Tz: TimeZone>(instant: DateTime<Tz>) -> DateTime<Tz> {
    match instant.minute() {
        0 => instant - Duration::seconds(1),
        59 => instant.with_second(59).unwrap_or(instant),
        _ => instant,
    }
}
