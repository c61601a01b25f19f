// File: ./src/model/order.rs
// Chronological ordering of the unified collection.
use crate::model::entry::Entry;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Sort group of an entry relative to "now". The derive order is the
/// display order of the groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Classification {
    /// The deadline is now or in the future.
    Upcoming,
    Overdue,
    /// No known instant ("TBA").
    Unspecified,
}

pub fn classify(entry: &Entry, now: DateTime<Utc>) -> Classification {
    match entry.diff_millis(now) {
        Some(diff) if diff > 0 => Classification::Overdue,
        Some(_) => Classification::Upcoming,
        None => Classification::Unspecified,
    }
}

/// Upcoming before overdue, then larger `now - instant` first inside each
/// group. Unspecified entries compare equal among themselves and sort last.
pub fn compare(a: &Entry, b: &Entry, now: DateTime<Utc>) -> Ordering {
    let group = classify(a, now).cmp(&classify(b, now));
    if group != Ordering::Equal {
        return group;
    }
    match (a.diff_millis(now), b.diff_millis(now)) {
        (Some(diff_a), Some(diff_b)) => diff_b.cmp(&diff_a),
        _ => Ordering::Equal,
    }
}

/// Returns a read-only view of `entries` in display order.
///
/// The sort is stable, so entries that compare equal keep their insertion
/// order and the result only depends on `entries` and `now`.
pub fn order(entries: &[Entry], now: DateTime<Utc>) -> Vec<&Entry> {
    let mut view: Vec<&Entry> = entries.iter().collect();
    view.sort_by(|a, b| compare(a, b, now));
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::EntrySource;
    use chrono::{Duration, TimeZone};

    fn entry(id: &str, instant: Option<DateTime<Utc>>) -> Entry {
        Entry {
            id: id.to_string(),
            name: id.to_string(),
            details: None,
            instant: instant.map(|i| i.fixed_offset()),
            tags: Vec::new(),
            source: EntrySource::Catalog,
        }
    }

    fn ids(view: &[&Entry]) -> Vec<String> {
        view.iter().map(|e| e.id.clone()).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_upcoming_before_overdue() {
        let t = now();
        let a = entry("a", Some(t + Duration::hours(1)));
        let b = entry("b", Some(t - Duration::hours(1)));
        let entries = vec![b, a];
        assert_eq!(ids(&order(&entries, t)), vec!["a", "b"]);
    }

    #[test]
    fn test_groups_are_ascending_by_instant() {
        let t = now();
        let entries = vec![
            entry("past_recent", Some(t - Duration::hours(1))),
            entry("future_far", Some(t + Duration::days(30))),
            entry("past_old", Some(t - Duration::days(30))),
            entry("future_soon", Some(t + Duration::minutes(5))),
        ];
        assert_eq!(
            ids(&order(&entries, t)),
            vec!["future_soon", "future_far", "past_old", "past_recent"]
        );
    }

    #[test]
    fn test_unspecified_sorts_last_and_stable() {
        let t = now();
        let entries = vec![
            entry("tba1", None),
            entry("past", Some(t - Duration::days(1))),
            entry("tba2", None),
            entry("future", Some(t + Duration::days(1))),
            entry("tba3", None),
        ];
        assert_eq!(
            ids(&order(&entries, t)),
            vec!["future", "past", "tba1", "tba2", "tba3"]
        );
    }

    #[test]
    fn test_due_exactly_now_is_upcoming() {
        let t = now();
        let e = entry("now", Some(t));
        assert_eq!(classify(&e, t), Classification::Upcoming);
        assert!(!e.is_past(t));
        assert!(e.is_past(t + Duration::milliseconds(1)));
    }

    #[test]
    fn test_equal_instants_keep_insertion_order() {
        let t = now();
        let at = Some(t + Duration::hours(3));
        let entries = vec![entry("first", at), entry("second", at), entry("third", at)];
        assert_eq!(ids(&order(&entries, t)), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_order_is_reproducible() {
        let t = now();
        let entries = vec![
            entry("x", Some(t - Duration::hours(2))),
            entry("y", None),
            entry("z", Some(t + Duration::hours(2))),
        ];
        assert_eq!(ids(&order(&entries, t)), ids(&order(&entries, t)));
    }
}
