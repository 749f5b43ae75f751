//! Calendar event types.
//!
//! `CalendarEvent` is the persisted record owned by an [`EventStore`](crate::store::EventStore).
//! `CalendarEventDraft` is what the iCal parser produces: a transient record that
//! only lives for the duration of one import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub ical_uid: String,
    pub calendar_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Start of the series instance this event overrides (RECURRENCE-ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    /// Raw RRULE body, e.g. `FREQ=WEEKLY;BYDAY=MO`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

/// An event attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: AttendeeRole,
    #[serde(default)]
    pub status: AttendeeStatus,
}

impl Attendee {
    /// Common name for the `CN` parameter, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            EventStatus::Confirmed => "CONFIRMED",
            EventStatus::Tentative => "TENTATIVE",
            EventStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_ics_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONFIRMED" => Some(EventStatus::Confirmed),
            "TENTATIVE" => Some(EventStatus::Tentative),
            "CANCELLED" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeRole {
    Organizer,
    #[default]
    Attendee,
    Optional,
}

impl AttendeeRole {
    /// Value written to the ROLE parameter
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            AttendeeRole::Organizer => "ORGANIZER",
            AttendeeRole::Attendee => "ATTENDEE",
            AttendeeRole::Optional => "OPTIONAL",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Tentative,
}

impl AttendeeStatus {
    /// Value written to the PARTSTAT parameter
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            AttendeeStatus::Pending => "PENDING",
            AttendeeStatus::Accepted => "ACCEPTED",
            AttendeeStatus::Declined => "DECLINED",
            AttendeeStatus::Tentative => "TENTATIVE",
        }
    }
}

/// An event parsed from iCal text, not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEventDraft {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(with = "iso_utc")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "iso_utc")]
    pub end_time: DateTime<Utc>,
    pub uid: Option<String>,
    pub recurrence_id: Option<DateTime<Utc>>,
    pub status: Option<EventStatus>,
    pub recurrence_rule: Option<String>,
}

impl CalendarEventDraft {
    /// Build the creation request for this draft in the given calendar.
    pub fn into_create_data(self, calendar_id: &str) -> CreateEventData {
        CreateEventData {
            title: self.title,
            start_time: self.start_time,
            end_time: self.end_time,
            calendar_id: calendar_id.to_string(),
            description: self.description,
            location: self.location,
            status: self.status,
            ical_uid: self.uid,
            recurrence_id: self.recurrence_id,
            user_id: None,
            is_recurring: self.recurrence_rule.is_some(),
            recurrence_rule: self.recurrence_rule,
            attendees: Vec::new(),
        }
    }
}

/// Request to create a new event in a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventData {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub calendar_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    /// Keep an existing iCal UID instead of generating one
    #[serde(default)]
    pub ical_uid: Option<String>,
    #[serde(default)]
    pub recurrence_id: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_rule: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

impl CreateEventData {
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        calendar_id: impl Into<String>,
    ) -> Self {
        CreateEventData {
            title: title.into(),
            start_time,
            end_time,
            calendar_id: calendar_id.into(),
            description: None,
            location: None,
            status: None,
            ical_uid: None,
            recurrence_id: None,
            user_id: None,
            is_recurring: false,
            recurrence_rule: None,
            attendees: Vec::new(),
        }
    }
}

/// Drafts serialize their times the way the iCal date parser reports them.
mod iso_utc {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&crate::ics::format_iso_utc(dt))
    }
}
