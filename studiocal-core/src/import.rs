//! Import of iCal text into a calendar.
//!
//! Drafts are created one at a time, in document order. A failing event is
//! recorded in the summary and the import moves on to the next one; nothing
//! is rolled back.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{StudioCalError, StudioCalResult};
use crate::event::{CalendarEvent, CreateEventData};
use crate::filter::EventFilter;
use crate::ics::parse_ical;
use crate::store::EventStore;

pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity of an event instance: the UID plus RECURRENCE-ID for overrides
type InstanceKey = (String, Option<DateTime<Utc>>);

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Skip drafts whose UID and RECURRENCE-ID already exist in the target calendar
    pub skip_duplicates: bool,
    /// Upper bound for a single create call.
    ///
    /// The create future is dropped when the limit is hit. A store that has
    /// already persisted the event by then still reports a failure, and the
    /// event's UID is not treated as known for the rest of the batch.
    pub create_timeout: Duration,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            skip_duplicates: true,
            create_timeout: DEFAULT_CREATE_TIMEOUT,
        }
    }
}

/// Outcome of one import call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Parse `ical_text` and create every complete VEVENT in `calendar_id`.
///
/// Incomplete VEVENTs are dropped by the parser and do not show up in the
/// summary. Store failures become entries in `errors`.
pub async fn import_from_ical<S: EventStore + ?Sized>(
    store: &S,
    ical_text: &str,
    calendar_id: &str,
    options: &ImportOptions,
) -> ImportSummary {
    let drafts = parse_ical(ical_text);
    debug!(calendar_id, drafts = drafts.len(), "Parsed iCal text");

    let mut summary = ImportSummary::default();
    let mut known = if options.skip_duplicates {
        existing_instances(store, calendar_id).await
    } else {
        HashSet::new()
    };

    for draft in drafts {
        let key = draft.uid.clone().map(|uid| (uid, draft.recurrence_id));

        if options.skip_duplicates {
            if let Some(ref key) = key {
                if known.contains(key) {
                    debug!(uid = %key.0, "Skipping duplicate event");
                    summary.skipped += 1;
                    continue;
                }
            }
        }

        let title = draft.title.clone();
        match create_with_timeout(store, draft.into_create_data(calendar_id), options.create_timeout)
            .await
        {
            Ok(event) => {
                debug!(id = %event.id, title = %event.title, "Imported event");
                summary.imported += 1;
                if let Some(key) = key {
                    known.insert(key);
                }
            }
            Err(e) => {
                warn!(title = %title, error = %e, "Failed to import event");
                summary
                    .errors
                    .push(format!("Failed to import event \"{title}\": {e}"));
            }
        }
    }

    info!(
        calendar_id,
        imported = summary.imported,
        skipped = summary.skipped,
        errors = summary.errors.len(),
        "Finished iCal import"
    );

    summary
}

async fn existing_instances<S: EventStore + ?Sized>(
    store: &S,
    calendar_id: &str,
) -> HashSet<InstanceKey> {
    match store.list_events(&EventFilter::for_calendar(calendar_id)).await {
        Ok(events) => events
            .into_iter()
            .map(|e| (e.ical_uid, e.recurrence_id))
            .collect(),
        Err(e) => {
            warn!(calendar_id, error = %e, "Could not list existing events, duplicates will not be skipped");
            HashSet::new()
        }
    }
}

async fn create_with_timeout<S: EventStore + ?Sized>(
    store: &S,
    data: CreateEventData,
    limit: Duration,
) -> StudioCalResult<CalendarEvent> {
    timeout(limit, store.create_event(data))
        .await
        .map_err(|_| StudioCalError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// In-memory store that can be told to fail or stall on specific titles
    #[derive(Default)]
    struct MockStore {
        existing: Vec<CalendarEvent>,
        fail_titles: HashSet<String>,
        slow_titles: HashSet<String>,
        fail_listing: bool,
        created: Mutex<Vec<CreateEventData>>,
    }

    impl MockStore {
        fn created_titles(&self) -> Vec<String> {
            self.created
                .lock()
                .unwrap()
                .iter()
                .map(|d| d.title.clone())
                .collect()
        }
    }

    fn to_event(data: CreateEventData) -> CalendarEvent {
        let now = Utc::now();
        CalendarEvent {
            id: format!("id-{}", data.title),
            ical_uid: data.ical_uid.unwrap_or_else(|| format!("{}@mock", data.title)),
            calendar_id: data.calendar_id,
            user_id: data.user_id,
            title: data.title,
            description: data.description,
            location: data.location,
            start_time: data.start_time,
            end_time: data.end_time,
            recurrence_id: data.recurrence_id,
            status: data.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            is_recurring: data.is_recurring,
            recurrence_rule: data.recurrence_rule,
            attendees: data.attendees,
        }
    }

    #[async_trait]
    impl EventStore for MockStore {
        async fn create_event(&self, data: CreateEventData) -> StudioCalResult<CalendarEvent> {
            if self.slow_titles.contains(&data.title) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.fail_titles.contains(&data.title) {
                return Err(StudioCalError::Store("database unavailable".into()));
            }
            self.created.lock().unwrap().push(data.clone());
            Ok(to_event(data))
        }

        async fn list_events(&self, filter: &EventFilter) -> StudioCalResult<Vec<CalendarEvent>> {
            if self.fail_listing {
                return Err(StudioCalError::Store("listing unavailable".into()));
            }
            Ok(self
                .existing
                .iter()
                .filter(|e| filter.matches(e))
                .cloned()
                .collect())
        }
    }

    fn vevent(title: &str, uid: Option<&str>, day: u32) -> String {
        let uid_line = uid.map(|u| format!("UID:{u}\r\n")).unwrap_or_default();
        format!(
            "BEGIN:VEVENT\r\n{uid_line}SUMMARY:{title}\r\nDTSTART:202503{day:02}T100000Z\r\nDTEND:202503{day:02}T110000Z\r\nEND:VEVENT\r\n"
        )
    }

    fn calendar(events: &[String]) -> String {
        format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n{}END:VCALENDAR\r\n", events.concat())
    }

    #[tokio::test]
    async fn test_all_events_imported_when_store_succeeds() {
        let store = MockStore::default();
        let ics = calendar(&(1..=5).map(|d| vevent(&format!("Shoot {d}"), None, d)).collect::<Vec<_>>());

        let summary = import_from_ical(&store, &ics, "cal-1", &ImportOptions::default()).await;

        assert_eq!(summary, ImportSummary { imported: 5, skipped: 0, errors: vec![] });
        assert_eq!(
            store.created_titles(),
            ["Shoot 1", "Shoot 2", "Shoot 3", "Shoot 4", "Shoot 5"]
        );
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_batch() {
        let store = MockStore {
            fail_titles: HashSet::from(["Shoot 2".to_string()]),
            ..Default::default()
        };
        let ics = calendar(&[vevent("Shoot 1", None, 1), vevent("Shoot 2", None, 2), vevent("Shoot 3", None, 3)]);

        let summary = import_from_ical(&store, &ics, "cal-1", &ImportOptions::default()).await;

        assert_eq!(summary.imported, 2);
        assert_eq!(
            summary.errors,
            ["Failed to import event \"Shoot 2\": Event store error: database unavailable"]
        );
        assert_eq!(store.created_titles(), ["Shoot 1", "Shoot 3"]);
    }

    #[tokio::test]
    async fn test_incomplete_block_is_dropped_silently() {
        let store = MockStore::default();
        let incomplete = "BEGIN:VEVENT\r\nSUMMARY:No end\r\nDTSTART:20250302T100000Z\r\nEND:VEVENT\r\n".to_string();
        let ics = calendar(&[vevent("Complete", None, 1), incomplete]);

        let summary = import_from_ical(&store, &ics, "cal-1", &ImportOptions::default()).await;

        assert_eq!(summary.imported, 1);
        assert!(summary.errors.is_empty());

        let created = store.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].calendar_id, "cal-1");
    }

    #[tokio::test]
    async fn test_duplicate_uids_are_skipped() {
        let mut existing = to_event(CreateEventData::new("Old", Utc::now(), Utc::now(), "cal-1"));
        existing.ical_uid = "known@example.com".to_string();
        let store = MockStore {
            existing: vec![existing],
            ..Default::default()
        };

        let ics = calendar(&[
            vevent("Known", Some("known@example.com"), 1),
            vevent("New", Some("new@example.com"), 2),
            vevent("New again", Some("new@example.com"), 3),
            vevent("No uid", None, 4),
        ]);

        let summary = import_from_ical(&store, &ics, "cal-1", &ImportOptions::default()).await;

        assert_eq!(summary, ImportSummary { imported: 2, skipped: 2, errors: vec![] });
        assert_eq!(store.created_titles(), ["New", "No uid"]);
    }

    #[tokio::test]
    async fn test_duplicates_in_other_calendars_are_not_skipped() {
        let mut existing = to_event(CreateEventData::new("Old", Utc::now(), Utc::now(), "cal-2"));
        existing.ical_uid = "known@example.com".to_string();
        let store = MockStore {
            existing: vec![existing],
            ..Default::default()
        };

        let ics = calendar(&[vevent("Known", Some("known@example.com"), 1)]);
        let summary = import_from_ical(&store, &ics, "cal-1", &ImportOptions::default()).await;

        assert_eq!(summary.imported, 1);
    }

    #[tokio::test]
    async fn test_allow_duplicates() {
        let store = MockStore::default();
        let ics = calendar(&[vevent("A", Some("same@example.com"), 1), vevent("B", Some("same@example.com"), 2)]);
        let options = ImportOptions {
            skip_duplicates: false,
            ..Default::default()
        };

        let summary = import_from_ical(&store, &ics, "cal-1", &options).await;
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 0);
    }

    #[tokio::test]
    async fn test_failed_uid_can_be_retried_later_in_batch() {
        let store = MockStore {
            fail_titles: HashSet::from(["First try".to_string()]),
            ..Default::default()
        };
        let ics = calendar(&[
            vevent("First try", Some("retry@example.com"), 1),
            vevent("Second try", Some("retry@example.com"), 1),
        ]);

        let summary = import_from_ical(&store, &ics, "cal-1", &ImportOptions::default()).await;
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_still_imports() {
        let store = MockStore {
            fail_listing: true,
            ..Default::default()
        };
        let ics = calendar(&[vevent("Shoot", Some("a@example.com"), 1)]);

        let summary = import_from_ical(&store, &ics, "cal-1", &ImportOptions::default()).await;
        assert_eq!(summary.imported, 1);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_create_times_out() {
        let store = MockStore {
            slow_titles: HashSet::from(["Stuck".to_string()]),
            ..Default::default()
        };
        let ics = calendar(&[vevent("Stuck", None, 1), vevent("Fine", None, 2)]);
        let options = ImportOptions {
            create_timeout: Duration::from_secs(5),
            ..Default::default()
        };

        let summary = import_from_ical(&store, &ics, "cal-1", &options).await;

        assert_eq!(summary.imported, 1);
        assert_eq!(
            summary.errors,
            ["Failed to import event \"Stuck\": Event creation timed out after 5s"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeout_is_reported_in_millis() {
        let store = MockStore {
            slow_titles: HashSet::from(["Stuck".to_string()]),
            ..Default::default()
        };
        let options = ImportOptions {
            create_timeout: Duration::from_millis(500),
            ..Default::default()
        };

        let summary = import_from_ical(&store, &calendar(&[vevent("Stuck", None, 1)]), "cal-1", &options).await;
        assert_eq!(
            summary.errors,
            ["Failed to import event \"Stuck\": Event creation timed out after 500ms"]
        );
    }

    fn series_with_override() -> String {
        let master = "BEGIN:VEVENT\r\nUID:series@google.com\r\nSUMMARY:Mini sessions\r\nDTSTART:20250301T100000Z\r\nDTEND:20250301T110000Z\r\nRRULE:FREQ=WEEKLY\r\nEND:VEVENT\r\n";
        let moved = "BEGIN:VEVENT\r\nUID:series@google.com\r\nRECURRENCE-ID:20250308T100000Z\r\nSUMMARY:Mini sessions (moved)\r\nDTSTART:20250308T120000Z\r\nDTEND:20250308T130000Z\r\nEND:VEVENT\r\n";
        calendar(&[master.to_string(), moved.to_string()])
    }

    #[tokio::test]
    async fn test_recurrence_override_is_not_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::store::JsonFileStore::new(dir.path());

        let summary = import_from_ical(&store, &series_with_override(), "cal-1", &ImportOptions::default()).await;
        assert_eq!(summary, ImportSummary { imported: 2, skipped: 0, errors: vec![] });

        let events = store.list_events(&EventFilter::for_calendar("cal-1")).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.ical_uid == "series@google.com"));
        assert_eq!(events[0].recurrence_id, None);
        assert_eq!(events[1].recurrence_id.map(|t| t.to_rfc3339()).as_deref(), Some("2025-03-08T10:00:00+00:00"));
    }

    #[tokio::test]
    async fn test_reimported_series_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::store::JsonFileStore::new(dir.path());

        import_from_ical(&store, &series_with_override(), "cal-1", &ImportOptions::default()).await;
        let summary = import_from_ical(&store, &series_with_override(), "cal-1", &ImportOptions::default()).await;

        assert_eq!(summary, ImportSummary { imported: 0, skipped: 2, errors: vec![] });
    }

    #[tokio::test]
    async fn test_empty_input() {
        let store = MockStore::default();
        let summary = import_from_ical(&store, "", "cal-1", &ImportOptions::default()).await;
        assert_eq!(summary, ImportSummary::default());
    }
}
