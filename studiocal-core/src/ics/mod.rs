//! ICS generation and parsing.
//!
//! This module handles reading and writing iCal documents according to RFC 5545.

mod datetime;
mod generate;
mod parse;
mod text;

pub use datetime::{
    IcalTime, format_ical_utc, format_iso_utc, format_to_ical_utc, parse_ical_date_to_iso,
    parse_ical_datetime, parse_ical_time, parse_iso,
};
pub use generate::{PRODID, export_to_ical};
pub use parse::parse_ical;
pub use text::{escape_text, fold_line, unescape_text};
