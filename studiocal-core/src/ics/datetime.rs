//! Conversion between ISO-8601 timestamps and iCal DATE / DATE-TIME values.
//!
//! Everything leaves this module in UTC. Incoming values are parsed by shape
//! (`YYYYMMDD`, then an optional `T` followed by up to three two-digit fields,
//! then an optional `Z`) rather than by fixed offsets, so short or garbled
//! tokens are rejected instead of producing nonsense dates.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{StudioCalError, StudioCalResult};

const ICAL_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const ISO_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A DATE or DATE-TIME value as written in the document, before zone resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum IcalTime {
    Date(NaiveDate),
    DateTimeUtc(NaiveDateTime),
    DateTimeFloating(NaiveDateTime),
}

impl IcalTime {
    /// Resolve to UTC.
    ///
    /// Dates become midnight UTC. Floating times are interpreted in `tzid`
    /// when it names a known IANA zone, otherwise as UTC.
    pub fn to_utc(&self, tzid: Option<&str>) -> DateTime<Utc> {
        match self {
            IcalTime::Date(d) => d.and_time(NaiveTime::MIN).and_utc(),
            IcalTime::DateTimeUtc(dt) => dt.and_utc(),
            IcalTime::DateTimeFloating(dt) => match tzid {
                Some(tzid) => resolve_in_zone(dt, tzid),
                None => dt.and_utc(),
            },
        }
    }
}

fn resolve_in_zone(local: &NaiveDateTime, tzid: &str) -> DateTime<Utc> {
    let tz: Tz = match tzid.trim_matches('"').parse() {
        Ok(tz) => tz,
        Err(_) => {
            warn!(tzid, "Unknown TZID, treating time as UTC");
            return local.and_utc();
        }
    };

    if let Some(dt) = tz.from_local_datetime(local).earliest() {
        return dt.with_timezone(&Utc);
    }

    // Local time falls into a DST gap: use the offset from before the transition
    let shifted = *local + Duration::hours(1);
    match tz.from_local_datetime(&shifted).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => local.and_utc(),
    }
}

/// Format a UTC timestamp as `YYYYMMDDTHHMMSSZ`, dropping sub-second precision.
pub fn format_ical_utc(dt: &DateTime<Utc>) -> String {
    dt.format(ICAL_UTC_FORMAT).to_string()
}

/// Format a UTC timestamp as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_iso_utc(dt: &DateTime<Utc>) -> String {
    dt.format(ISO_UTC_FORMAT).to_string()
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339 with any offset, a naive `YYYY-MM-DDTHH:MM[:SS[.fff]]`
/// (taken as UTC) and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_iso(iso: &str) -> StudioCalResult<DateTime<Utc>> {
    let s = iso.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(StudioCalError::invalid_date(iso, "expected an ISO-8601 date or date-time"))
}

/// Convert an ISO-8601 timestamp to the iCal UTC basic form.
///
/// `"2025-03-01T10:30:00.000Z"` becomes `"20250301T103000Z"`.
pub fn format_to_ical_utc(iso: &str) -> StudioCalResult<String> {
    parse_iso(iso).map(|dt| format_ical_utc(&dt))
}

/// Parse a DATE or DATE-TIME token.
///
/// Missing hour, minute or second fields default to zero, so `20250301`,
/// `20250301T` and `20250301T10` are all accepted.
pub fn parse_ical_time(token: &str) -> StudioCalResult<IcalTime> {
    let token = token.trim();

    let (body, is_utc) = match token.strip_suffix('Z').or_else(|| token.strip_suffix('z')) {
        Some(body) => (body, true),
        None => (token, false),
    };

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };

    if date_part.len() != 8 || !is_ascii_digits(date_part) {
        return Err(StudioCalError::invalid_date(token, "expected YYYYMMDD"));
    }

    let year = date_part[..4].parse::<i32>().unwrap_or_default();
    let month = two_digits(&date_part[4..6]);
    let day = two_digits(&date_part[6..8]);
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| StudioCalError::invalid_date(token, "no such calendar date"))?;

    let Some(time_part) = time_part else {
        return Ok(IcalTime::Date(date));
    };

    if time_part.len() > 6 || time_part.len() % 2 != 0 || !time_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StudioCalError::invalid_date(token, "expected HHMMSS after 'T'"));
    }

    let field = |i: usize| time_part.get(i..i + 2).map(two_digits).unwrap_or(0);
    let time = NaiveTime::from_hms_opt(field(0), field(2), field(4))
        .ok_or_else(|| StudioCalError::invalid_date(token, "time of day out of range"))?;

    let datetime = date.and_time(time);
    Ok(if is_utc {
        IcalTime::DateTimeUtc(datetime)
    } else {
        IcalTime::DateTimeFloating(datetime)
    })
}

/// Parse a DTSTART/DTEND style value into UTC.
///
/// `value_is_date` reflects a `VALUE=DATE` parameter; such values must not
/// carry a time component.
pub fn parse_ical_datetime(
    value: &str,
    tzid: Option<&str>,
    value_is_date: bool,
) -> StudioCalResult<DateTime<Utc>> {
    let time = parse_ical_time(value)?;

    if value_is_date && !matches!(time, IcalTime::Date(_)) {
        return Err(StudioCalError::invalid_date(value, "VALUE=DATE with a time component"));
    }

    Ok(time.to_utc(tzid))
}

/// Convert an iCal DATE / DATE-TIME token to `YYYY-MM-DDTHH:MM:SSZ`.
///
/// `"20250301T103000Z"` becomes `"2025-03-01T10:30:00Z"` and `"20250301"`
/// becomes `"2025-03-01T00:00:00Z"`.
pub fn parse_ical_date_to_iso(token: &str) -> StudioCalResult<String> {
    parse_ical_time(token).map(|t| format_iso_utc(&t.to_utc(None)))
}

fn is_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// Callers guarantee two ASCII digits
fn two_digits(s: &str) -> u32 {
    s.parse().unwrap_or_default()
}
