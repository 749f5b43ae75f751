//! Calendar feed, import and event endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use studiocal_core::{
    CalendarEvent, DateRange, EventFilter, ICAL_CONTENT_TYPE, ImportSummary, export_calendar,
    import_from_ical,
};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export.ics", get(export_feed))
        .route("/calendars/{id}/export.ics", get(export_calendar_feed))
        .route("/calendars/{id}/events", get(list_events))
        .route("/calendars/{id}/import", post(import_events))
}

/// Query parameters for feed and listing endpoints
#[derive(Deserialize, Default)]
pub struct FeedQuery {
    pub calendar_id: Option<String>,
    pub user_id: Option<String>,
    /// YYYY-MM-DD
    pub from: Option<String>,
    /// YYYY-MM-DD
    pub to: Option<String>,
}

impl FeedQuery {
    fn range(&self) -> Result<DateRange, AppError> {
        Ok(DateRange::from_args(self.from.as_deref(), self.to.as_deref())?)
    }
}

/// GET /export.ics - Feed of all events, optionally filtered by calendar and user
async fn export_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    let filter = EventFilter {
        range: query.range()?,
        calendar_id: query.calendar_id,
        user_id: query.user_id,
    };

    ics_response(&state, &filter, "calendar").await
}

/// GET /calendars/:id/export.ics - Feed of a single calendar
async fn export_calendar_feed(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    let filter = EventFilter::for_calendar(&calendar_id)
        .with_user(query.user_id.clone())
        .with_range(query.range()?);

    ics_response(&state, &filter, &calendar_id).await
}

async fn ics_response(state: &AppState, filter: &EventFilter, name: &str) -> Result<Response, AppError> {
    let ics = export_calendar(state.store(), filter).await?;

    let headers = [
        (header::CONTENT_TYPE, ICAL_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.ics\"", safe_filename(name)),
        ),
    ];

    Ok((headers, ics).into_response())
}

fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// GET /calendars/:id/events - List events for a calendar
async fn list_events(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let filter = EventFilter::for_calendar(&calendar_id).with_range(query.range()?);
    let events = state.store().list_events(&filter).await?;

    Ok(Json(events))
}

/// POST /calendars/:id/import - Import raw iCal text from the request body
async fn import_events(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    body: String,
) -> Json<ImportSummary> {
    let summary = import_from_ical(state.store(), &body, &calendar_id, state.import_options()).await;
    Json(summary)
}
