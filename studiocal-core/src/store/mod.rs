//! Event persistence.
//!
//! Import and export never touch storage directly. They go through
//! [`EventStore`], which the CRM backend implements. [`JsonFileStore`] is a
//! small file-backed implementation used by the CLI and the server.

mod json;

pub use json::JsonFileStore;

use async_trait::async_trait;

use crate::error::StudioCalResult;
use crate::event::{CalendarEvent, CreateEventData};
use crate::filter::EventFilter;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new event and return the stored record.
    async fn create_event(&self, data: CreateEventData) -> StudioCalResult<CalendarEvent>;

    /// List events matching `filter`, ordered by start time.
    async fn list_events(&self, filter: &EventFilter) -> StudioCalResult<Vec<CalendarEvent>>;
}
