//! ICS parsing into event drafts.
//!
//! The parser walks content lines once. Only the properties an import needs
//! are read; everything else is skipped. A VEVENT that ends without a title,
//! start and end is dropped without raising an error.

use chrono::{DateTime, Utc};
use icalendar::parser::unfold;
use tracing::debug;

use crate::event::{CalendarEventDraft, EventStatus};
use crate::ics::datetime::parse_ical_datetime;
use crate::ics::text::unescape_text;

/// One logical `NAME;PARAM=VALUE:VALUE` line
struct ContentLine<'a> {
    name: String,
    params: Vec<(String, String)>,
    value: &'a str,
}

impl ContentLine<'_> {
    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Split `s` on `sep`, ignoring separators inside double quotes.
fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);

    parts
}

fn split_content_line(line: &str) -> Option<ContentLine<'_>> {
    let mut in_quotes = false;
    let colon = line.char_indices().find_map(|(i, c)| match c {
        '"' => {
            in_quotes = !in_quotes;
            None
        }
        ':' if !in_quotes => Some(i),
        _ => None,
    })?;

    let (key, value) = (&line[..colon], &line[colon + 1..]);
    let mut parts = split_unquoted(key, ';').into_iter();
    let name = parts.next()?.trim().to_ascii_uppercase();

    let params = parts
        .filter_map(|part| {
            let (k, v) = part.split_once('=')?;
            Some((
                k.trim().to_ascii_uppercase(),
                v.trim().trim_matches('"').to_string(),
            ))
        })
        .collect();

    Some(ContentLine {
        name,
        params,
        value,
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_date_property(line: &ContentLine) -> Option<DateTime<Utc>> {
    let value_is_date = line
        .param("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE"));

    match parse_ical_datetime(line.value, line.param("TZID"), value_is_date) {
        Ok(dt) => Some(dt),
        Err(e) => {
            debug!(property = %line.name, error = %e, "Ignoring unparseable date");
            None
        }
    }
}

/// Fields collected while inside a VEVENT
#[derive(Default)]
struct DraftBuilder {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    uid: Option<String>,
    recurrence_id: Option<DateTime<Utc>>,
    status: Option<EventStatus>,
    recurrence_rule: Option<String>,
}

impl DraftBuilder {
    fn apply(&mut self, line: &ContentLine) {
        match line.name.as_str() {
            "SUMMARY" => self.title = non_empty(unescape_text(line.value)),
            "DESCRIPTION" => self.description = non_empty(unescape_text(line.value)),
            "LOCATION" => self.location = non_empty(unescape_text(line.value)),
            "DTSTART" => self.start_time = parse_date_property(line),
            "DTEND" => self.end_time = parse_date_property(line),
            "UID" => self.uid = non_empty(line.value.trim().to_string()),
            "RECURRENCE-ID" => self.recurrence_id = parse_date_property(line),
            "STATUS" => self.status = EventStatus::from_ics_str(line.value),
            "RRULE" => self.recurrence_rule = non_empty(line.value.trim().to_string()),
            _ => {}
        }
    }

    fn build(self) -> Option<CalendarEventDraft> {
        Some(CalendarEventDraft {
            title: self.title?,
            description: self.description,
            location: self.location,
            start_time: self.start_time?,
            end_time: self.end_time?,
            uid: self.uid,
            recurrence_id: self.recurrence_id,
            status: self.status,
            recurrence_rule: self.recurrence_rule,
        })
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
}

/// Parse ICS text into event drafts, in document order.
///
/// Lines may end in CRLF or bare LF, and folded lines are joined first.
/// Properties are matched on their name alone, so `DTSTART;TZID=...` is
/// read as `DTSTART`. Properties of components nested inside a VEVENT
/// (such as VALARM) are ignored.
pub fn parse_ical(ical_text: &str) -> Vec<CalendarEventDraft> {
    let unfolded = unfold(ical_text);

    let mut drafts = Vec::new();
    // Some while inside a VEVENT
    let mut current: Option<DraftBuilder> = None;
    let mut nested_depth = 0usize;

    for raw in unfolded.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.eq_ignore_ascii_case("BEGIN:VEVENT") {
            if current.is_some() {
                debug!("Discarding VEVENT that was never closed");
            }
            current = Some(DraftBuilder::default());
            nested_depth = 0;
            continue;
        }

        if trimmed.eq_ignore_ascii_case("END:VEVENT") {
            if let Some(builder) = current.take() {
                match builder.build() {
                    Some(draft) => drafts.push(draft),
                    None => debug!("Dropping VEVENT without title, start or end"),
                }
            }
            continue;
        }

        let Some(builder) = current.as_mut() else {
            continue;
        };

        if starts_with_ignore_case(trimmed, "BEGIN:") {
            nested_depth += 1;
            continue;
        }
        if starts_with_ignore_case(trimmed, "END:") {
            nested_depth = nested_depth.saturating_sub(1);
            continue;
        }
        if nested_depth > 0 {
            continue;
        }

        if let Some(content_line) = split_content_line(line) {
            builder.apply(&content_line);
        }
    }

    if current.is_some() {
        debug!("Discarding VEVENT that was never closed");
    }

    drafts
}
