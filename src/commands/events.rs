use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use studiocal_core::{EventFilter, EventStatus, EventStore, JsonFileStore};

pub async fn run(store: &JsonFileStore, filter: &EventFilter) -> Result<()> {
    let events = store.list_events(filter).await?;

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group events by day and print
    let mut current_date: Option<String> = None;

    for event in &events {
        let date_label = format_date_label(&event.start_time);

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label.bold());
            current_date = Some(date_label);
        }

        let time = format!(
            "{}-{}",
            event.start_time.with_timezone(&Local).format("%H:%M"),
            event.end_time.with_timezone(&Local).format("%H:%M")
        );
        let title = match event.status {
            EventStatus::Cancelled => event.title.strikethrough().to_string(),
            EventStatus::Tentative => format!("{} (tentative)", event.title),
            EventStatus::Confirmed => event.title.clone(),
        };
        let cal_tag = format!("[{}]", event.calendar_id);

        println!("  {} {} {}", time, title, cal_tag.dimmed());
    }

    Ok(())
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(time: &DateTime<Utc>) -> String {
    let today = Local::now().date_naive();
    let date = time.with_timezone(&Local).date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}
