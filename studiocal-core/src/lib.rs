//! iCal interchange for the studio CRM calendar.
//!
//! This crate provides what both studiocal-cli and studiocal-server use:
//! - `event` types for persisted events and parsed drafts
//! - `ics` for reading and writing iCal documents
//! - `import` / `export` to move events between a store and iCal text
//! - `store` with the `EventStore` seam and a JSON file store

pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod filter;
pub mod ics;
pub mod import;
pub mod store;

pub use error::{StudioCalError, StudioCalResult};
pub use event::*;
pub use export::{ICAL_CONTENT_TYPE, export_calendar};
pub use filter::{DateRange, EventFilter};
pub use import::{ImportOptions, ImportSummary, import_from_ical};
pub use store::{EventStore, JsonFileStore};
