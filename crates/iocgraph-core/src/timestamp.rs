//! Timestamp parsing and chronological ordering of records.
//!
//! Records carry a free-text `time` attribute. Hierarchy levels and the
//! directional-error list are presented oldest first. The ordering is total
//! and stable:
//!
//! 1. records with a parsable time, ascending;
//! 2. records sharing a time keep their input order;
//! 3. records with a missing or unparsable time come last, in input order.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a free-text time attribute.
///
/// Accepts RFC 3339, RFC 2822, common naive date-times (read as UTC) and
/// bare `YYYY-MM-DD` dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse an optional time attribute; `None` stays `None`.
#[must_use]
pub fn parse_optional(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_timestamp)
}

/// Compare two parsed times: present before absent, then ascending.
#[must_use]
pub fn compare(a: Option<&DateTime<Utc>>, b: Option<&DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable chronological sort keyed by each item's time attribute.
///
/// Times are parsed once per item, not once per comparison.
pub fn sort_by_time<T, F>(items: &mut Vec<T>, time_of: F)
where
    F: Fn(&T) -> Option<&str>,
{
    let mut keyed: Vec<(Option<DateTime<Utc>>, T)> = items
        .drain(..)
        .map(|item| (parse_optional(time_of(&item)), item))
        .collect();
    // `sort_by` is stable, so equal keys keep input order.
    keyed.sort_by(|(a, _), (b, _)| compare(a.as_ref(), b.as_ref()));
    items.extend(keyed.into_iter().map(|(_, item)| item));
}
