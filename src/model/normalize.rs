// File: ./src/model/normalize.rs
// Builds canonical entries from raw catalog and dynamic records.
//
// Parse failures never abort a batch: the affected entry simply has no
// instant. Every instant that does come out of here is boundary-corrected.
use crate::model::boundary;
use crate::model::entry::{Entry, EntrySource, catalog_id, dynamic_id, normalize_tags};
use crate::model::parser::{self, TBA, Zone};
use crate::model::record::{CatalogRecord, DeadlineRecord};
use chrono::{DateTime, FixedOffset};

/// One entry per raw expression of the record, or a single unspecified
/// entry when the list starts with "TBA".
pub fn normalize_catalog(record: &CatalogRecord) -> Vec<Entry> {
    let name = match record.name.trim() {
        "" => "Untitled",
        trimmed => trimmed,
    };
    let tags = normalize_tags(record.tags.to_vec());
    let make = |index: usize, instant: Option<DateTime<FixedOffset>>| Entry {
        id: catalog_id(name, record.year, index),
        name: name.to_string(),
        details: record.details.clone(),
        instant,
        tags: tags.clone(),
        source: EntrySource::Catalog,
    };

    if record.deadline.first() == Some(TBA) {
        return vec![make(0, None)];
    }

    record
        .deadline
        .to_vec()
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let instant =
                match parser::parse(raw, record.year, record.timezone.as_deref()) {
                    Ok(parsed) => parsed.map(boundary::correct),
                    Err(e) => {
                        log::warn!(
                            "Deadline #{} of {} {} treated as TBA: {}",
                            index,
                            name,
                            record.year,
                            e
                        );
                        None
                    }
                };
            make(index, instant)
        })
        .collect()
}

pub fn normalize_catalog_all(records: &[CatalogRecord]) -> Vec<Entry> {
    records.iter().flat_map(normalize_catalog).collect()
}

/// Parses a user-submitted datetime, tolerating a value cut off after the
/// minutes. Returns `None` (unspecified) when nothing works.
pub fn parse_permissive(datetime: &str, zone: &Zone) -> Option<DateTime<FixedOffset>> {
    let attempt = parser::parse_timestamp(datetime, zone)
        .or_else(|_| parser::parse_timestamp(&format!("{}:00", datetime.trim()), zone));
    match attempt {
        Ok(instant) => Some(boundary::correct(instant)),
        Err(e) => {
            log::debug!("Unparseable datetime '{}': {}", datetime, e);
            None
        }
    }
}

/// Maps one remote or local record to exactly one entry.
pub fn normalize_dynamic(
    record: &DeadlineRecord,
    index: usize,
    zone: &Zone,
    source: EntrySource,
) -> Entry {
    let name = record.display_name();
    let datetime = record.datetime.as_deref().map(str::trim).unwrap_or("");
    let instant = if datetime.is_empty() {
        None
    } else {
        parse_permissive(datetime, zone)
    };
    let tags = match record.decode_tags() {
        Ok(tags) => normalize_tags(tags),
        Err(e) => {
            log::warn!("Ignoring tags of '{}': {}", name, e);
            Vec::new()
        }
    };
    let details = record
        .details
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(str::to_string);

    Entry {
        id: dynamic_id(name, datetime, index),
        name: name.to_string(),
        details,
        instant,
        tags,
        source,
    }
}

pub fn normalize_dynamic_all(
    records: &[DeadlineRecord],
    zone: &Zone,
    source: EntrySource,
) -> Vec<Entry> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_dynamic(record, index, zone, source))
        .collect()
}
