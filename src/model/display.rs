// File: ./src/model/display.rs
use crate::model::entry::Entry;
use crate::model::parser::{TBA, Zone};
use chrono::{DateTime, Duration, FixedOffset, Utc};

pub const DEADLINE_TIME_FORMAT: &str = "%-d %b %Y, %-I:%M:%S %P";

pub trait EntryDisplay {
    fn timer_text(&self, now: DateTime<Utc>) -> String;
    fn deadline_text(&self, zone: &Zone) -> String;
    fn status_symbol(&self, now: DateTime<Utc>) -> &'static str;
}

impl EntryDisplay for Entry {
    /// Countdown while the deadline is ahead, relative past time afterwards.
    fn timer_text(&self, now: DateTime<Utc>) -> String {
        let Some(instant) = self.instant else {
            return TBA.to_string();
        };
        let diff = now.signed_duration_since(instant);
        if diff <= Duration::zero() {
            countdown(-diff)
        } else {
            relative_past(diff)
        }
    }

    fn deadline_text(&self, zone: &Zone) -> String {
        match &self.instant {
            Some(instant) => deadline_time(instant, zone),
            None => TBA.to_string(),
        }
    }

    fn status_symbol(&self, now: DateTime<Utc>) -> &'static str {
        match self.instant {
            None => "[?]",
            Some(_) if self.is_past(now) => "[✘]",
            Some(_) => "[ ]",
        }
    }
}

/// `DD days HHh MMm SSs`; days keep growing past two digits.
pub fn countdown(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{:02} days {:02}h {:02}m {:02}s", days, hours, minutes, seconds)
}

/// Humanized elapsed time ("3 hours ago").
///
/// Each unit is rounded before it is compared with its threshold, the way
/// relative-time libraries do: 44m40s rounds to 45 minutes and so reads
/// "an hour ago".
pub fn relative_past(elapsed: Duration) -> String {
    let millis = elapsed.num_milliseconds().max(0) as f64;
    let in_units = |unit_millis: f64| (millis / unit_millis).round() as i64;
    let seconds = in_units(1_000.0);
    let minutes = in_units(60_000.0);
    let hours = in_units(3_600_000.0);
    let days = in_units(86_400_000.0);
    // 400 Gregorian years hold 4800 months and 146097 days.
    let exact_months = millis / 86_400_000.0 * 4_800.0 / 146_097.0;
    let months = exact_months.round() as i64;
    let years = (exact_months / 12.0).round() as i64;

    let phrase = if seconds <= 44 {
        "a few seconds".to_string()
    } else if minutes <= 1 {
        "a minute".to_string()
    } else if minutes < 45 {
        format!("{} minutes", minutes)
    } else if hours <= 1 {
        "an hour".to_string()
    } else if hours < 22 {
        format!("{} hours", hours)
    } else if days <= 1 {
        "a day".to_string()
    } else if days < 26 {
        format!("{} days", days)
    } else if months <= 1 {
        "a month".to_string()
    } else if months < 11 {
        format!("{} months", months)
    } else if years <= 1 {
        "a year".to_string()
    } else {
        format!("{} years", years)
    };
    format!("{} ago", phrase)
}

/// Wall-clock rendering of an instant in the viewer's zone,
/// e.g. `15 Mar 2026, 11:59:59 pm`.
pub fn deadline_time(instant: &DateTime<FixedOffset>, zone: &Zone) -> String {
    zone.localize(instant)
        .format(DEADLINE_TIME_FORMAT)
        .to_string()
}
