//! Event filtering for listing and export.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{StudioCalError, StudioCalResult};
use crate::event::CalendarEvent;

/// Date range for filtering events.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Parse YYYY-MM-DD bounds. `from` starts at midnight, `to` runs to the end of its day.
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> StudioCalResult<Self> {
        Ok(DateRange {
            from: from.map(parse_date_start).transpose()?,
            to: to.map(parse_date_end).transpose()?,
        })
    }

    /// Whether an event overlaps this range.
    pub fn overlaps(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> bool {
        let after_from = self.from.is_none_or(|from| *end >= from);
        let before_to = self.to.is_none_or(|to| *start <= to);
        after_from && before_to
    }
}

fn parse_date(s: &str) -> StudioCalResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| StudioCalError::InvalidDate {
        value: s.to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date_start(s: &str) -> StudioCalResult<DateTime<Utc>> {
    Ok(parse_date(s)?.and_time(NaiveTime::MIN).and_utc())
}

/// Parse YYYY-MM-DD as end of day in UTC
fn parse_date_end(s: &str) -> StudioCalResult<DateTime<Utc>> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    Ok(parse_date(s)?.and_time(end_of_day).and_utc())
}

/// Which events a listing or export should include.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub calendar_id: Option<String>,
    pub user_id: Option<String>,
    pub range: DateRange,
}

impl EventFilter {
    pub fn for_calendar(calendar_id: impl Into<String>) -> Self {
        EventFilter {
            calendar_id: Some(calendar_id.into()),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn matches(&self, event: &CalendarEvent) -> bool {
        if let Some(ref calendar_id) = self.calendar_id {
            if &event.calendar_id != calendar_id {
                return false;
            }
        }

        if let Some(ref user_id) = self.user_id {
            if event.user_id.as_ref() != Some(user_id) {
                return false;
            }
        }

        self.range.overlaps(&event.start_time, &event.end_time)
    }
}
