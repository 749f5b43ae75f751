//! Events stored as a JSON array in a single file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::EventStore;
use crate::error::{StudioCalError, StudioCalResult};
use crate::event::{CalendarEvent, CreateEventData};
use crate::filter::EventFilter;

static EVENTS_FILE_NAME: &str = "events.json";

/// File-backed event store at `<data_dir>/events.json`.
///
/// Writes are serialized through an async mutex and land via rename, so
/// readers never see a half-written file.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        JsonFileStore {
            path: data_dir.as_ref().join(EVENTS_FILE_NAME),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StudioCalResult<Vec<CalendarEvent>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StudioCalError::Store(format!("Could not parse {}: {e}", self.path.display()))
        })
    }

    async fn save(&self, events: &[CalendarEvent]) -> StudioCalResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(events)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }
}

fn validate(data: &CreateEventData) -> StudioCalResult<()> {
    if data.title.trim().is_empty() {
        return Err(StudioCalError::InvalidEvent("title is required".into()));
    }
    if data.calendar_id.trim().is_empty() {
        return Err(StudioCalError::InvalidEvent("calendar_id is required".into()));
    }
    if data.end_time < data.start_time {
        return Err(StudioCalError::InvalidEvent(format!(
            "end time {} is before start time {}",
            data.end_time.to_rfc3339(),
            data.start_time.to_rfc3339()
        )));
    }
    Ok(())
}

#[async_trait]
impl EventStore for JsonFileStore {
    async fn create_event(&self, data: CreateEventData) -> StudioCalResult<CalendarEvent> {
        validate(&data)?;

        let _guard = self.write_lock.lock().await;
        let mut events = self.load().await?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let ical_uid = data
            .ical_uid
            .filter(|uid| !uid.trim().is_empty())
            .unwrap_or_else(|| format!("{id}@studiocal"));

        let event = CalendarEvent {
            id,
            ical_uid,
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
        };

        events.push(event.clone());
        self.save(&events).await?;

        debug!(id = %event.id, calendar_id = %event.calendar_id, "Created event");
        Ok(event)
    }

    async fn list_events(&self, filter: &EventFilter) -> StudioCalResult<Vec<CalendarEvent>> {
        let mut events: Vec<CalendarEvent> = self
            .load()
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();

        events.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(events)
    }
}
