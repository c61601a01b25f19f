// Tests for the ordering and tag filter contracts on normalized entries.
use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use deadlines::model::filter::{TagSelection, is_visible, toggle, visible};
use deadlines::model::normalize::{normalize_catalog, normalize_catalog_all};
use deadlines::model::order::{Classification, classify, order};
use deadlines::model::record::OneOrMany;
use deadlines::model::{CatalogRecord, Entry, EntrySource};

fn entry(id: &str, instant: Option<DateTime<Utc>>, tags: &[&str]) -> Entry {
    Entry {
        id: id.to_string(),
        name: id.to_uppercase(),
        details: None,
        instant: instant.map(|i| i.fixed_offset()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        source: EntrySource::Catalog,
    }
}

fn record(name: &str, deadlines: &[&str], timezone: Option<&str>) -> CatalogRecord {
    CatalogRecord {
        name: name.to_string(),
        year: 2026,
        deadline: OneOrMany::Many(deadlines.iter().map(|d| d.to_string()).collect()),
        timezone: timezone.map(str::to_string),
        details: None,
        tags: OneOrMany::default(),
    }
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_not_due_sorts_before_overdue() {
    let t = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
    let a = entry("a", Some(t + Duration::hours(1)), &[]);
    let b = entry("b", Some(t - Duration::hours(1)), &[]);
    let entries = vec![b, a];
    let ids: Vec<&str> = order(&entries, t).iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_tba_entries_order_without_errors() {
    let now = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
    let tba = normalize_catalog(&record("Later", &["TBA"], None));
    assert_eq!(tba.len(), 1);
    assert!(tba[0].instant.is_none());
    assert_eq!(classify(&tba[0], now), Classification::Unspecified);

    let mut entries = normalize_catalog_all(&[
        record("Past", &["2026-01-01 10:30"], Some("UTC")),
        record("Later", &["TBA"], None),
        record("Soon", &["2026-05-01 10:30"], Some("UTC")),
    ]);
    entries.push(entry("tba2", None, &[]));

    let ids: Vec<&str> = order(&entries, now).iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["soon2026-0", "past2026-0", "later2026-0", "tba2"]);
}

#[test]
fn test_confx_normalizes_to_last_second_in_aoe() {
    let entries = normalize_catalog(&record("ConfX", &["2026-03-15T23:59"], None));
    let instant = entries[0].instant.unwrap();
    assert_eq!(instant.offset().local_minus_utc(), -12 * 3600);
    assert_eq!(
        instant.naive_local().to_string(),
        "2026-03-15 23:59:59"
    );
    assert_eq!(instant.second(), 59);
    assert_eq!(entries[0].id, "confx2026-0");
}

#[test]
fn test_is_visible_examples() {
    let all = tags(&["nlp", "vision"]);
    let nlp_only = TagSelection::from_selected(&all, &["nlp"]);
    assert!(is_visible(&tags(&["nlp"]), &nlp_only, &all));
    assert!(!is_visible(&tags(&["vision"]), &nlp_only, &all));

    let none = TagSelection::new(&all);
    assert!(is_visible(&tags(&["nlp"]), &none, &all));
    assert!(is_visible(&tags(&["vision"]), &none, &all));
}

#[test]
fn test_toggle_then_filter_ordered_view() {
    let now = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
    let all = tags(&["nlp", "vision"]);
    let entries = vec![
        entry("both", Some(now + Duration::days(3)), &["nlp", "vision"]),
        entry("nlp", Some(now + Duration::days(1)), &["nlp"]),
        entry("vision", Some(now + Duration::days(2)), &["vision"]),
    ];
    let ordered = order(&entries, now);

    let selection = toggle("nlp", TagSelection::new(&all));
    let ids: Vec<&str> = visible(&ordered, &selection, &all)
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ids, vec!["nlp", "both"]);

    let selection = toggle("vision", selection);
    let ids: Vec<&str> = visible(&ordered, &selection, &all)
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ids, vec!["both"]);
}
