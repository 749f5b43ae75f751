//! ICS document generation.

use crate::event::CalendarEvent;
use crate::ics::datetime::format_ical_utc;
use crate::ics::text::{escape_text, fold_line, quote_param_value};

/// Product identifier written into every exported calendar
pub const PRODID: &str = "-//Studio CRM//Calendar Export//EN";

/// Accumulates content lines, folding long ones and terminating each with CRLF.
struct IcsWriter {
    out: String,
}

impl IcsWriter {
    fn new() -> Self {
        IcsWriter { out: String::new() }
    }

    fn line(&mut self, line: &str) {
        self.out.push_str(&fold_line(line));
        self.out.push_str("\r\n");
    }

    fn prop(&mut self, name: &str, value: &str) {
        self.line(&format!("{name}:{value}"));
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Render events as a complete VCALENDAR document.
///
/// Events are written in the given order, one VEVENT each. TEXT values are
/// escaped; RRULE bodies are written as stored.
pub fn export_to_ical(events: &[CalendarEvent]) -> String {
    let mut w = IcsWriter::new();

    w.line("BEGIN:VCALENDAR");
    w.prop("VERSION", "2.0");
    w.prop("PRODID", PRODID);
    w.prop("CALSCALE", "GREGORIAN");
    w.prop("METHOD", "PUBLISH");

    for event in events {
        write_event(&mut w, event);
    }

    w.line("END:VCALENDAR");
    w.finish()
}

fn write_event(w: &mut IcsWriter, event: &CalendarEvent) {
    w.line("BEGIN:VEVENT");
    w.prop("UID", &event.ical_uid);
    // DTSTAMP is required by RFC 5545; the last modification is the stable choice
    w.prop("DTSTAMP", &format_ical_utc(&event.updated_at));
    w.prop("DTSTART", &format_ical_utc(&event.start_time));
    w.prop("DTEND", &format_ical_utc(&event.end_time));

    if let Some(ref recurrence_id) = event.recurrence_id {
        w.prop("RECURRENCE-ID", &format_ical_utc(recurrence_id));
    }

    w.prop("SUMMARY", &escape_text(&event.title));

    if let Some(ref desc) = event.description {
        w.prop("DESCRIPTION", &escape_text(desc));
    }

    if let Some(ref loc) = event.location {
        w.prop("LOCATION", &escape_text(loc));
    }

    w.prop("STATUS", event.status.as_ics_str());
    w.prop("CREATED", &format_ical_utc(&event.created_at));
    w.prop("LAST-MODIFIED", &format_ical_utc(&event.updated_at));

    for attendee in &event.attendees {
        w.line(&format!(
            "ATTENDEE;CN={};ROLE={};PARTSTAT={}:mailto:{}",
            quote_param_value(attendee.display_name()),
            attendee.role.as_ics_str(),
            attendee.status.as_ics_str(),
            attendee.email
        ));
    }

    if event.is_recurring {
        if let Some(rule) = event.recurrence_rule.as_deref().filter(|r| !r.is_empty()) {
            w.prop("RRULE", rule);
        }
    }

    w.line("END:VEVENT");
}
