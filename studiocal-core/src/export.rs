//! Export of stored events as an iCal feed.

use tracing::debug;

use crate::error::StudioCalResult;
use crate::filter::EventFilter;
use crate::ics::export_to_ical;
use crate::store::EventStore;

/// MIME type for exported documents
pub const ICAL_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// List the events matching `filter` and render them as one VCALENDAR document.
///
/// Store errors are returned as-is; there is no partial document.
pub async fn export_calendar<S: EventStore + ?Sized>(
    store: &S,
    filter: &EventFilter,
) -> StudioCalResult<String> {
    let events = store.list_events(filter).await?;
    debug!(
        calendar_id = filter.calendar_id.as_deref(),
        events = events.len(),
        "Exporting events"
    );
    Ok(export_to_ical(&events))
}
