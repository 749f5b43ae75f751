use anyhow::Result;
use owo_colors::OwoColorize;
use studiocal_core::{ImportOptions, JsonFileStore, import_from_ical};

use crate::source;

pub async fn run(
    store: &JsonFileStore,
    source: &str,
    calendar_id: &str,
    options: &ImportOptions,
) -> Result<()> {
    let ical_text = source::read(source).await?;
    let summary = import_from_ical(store, &ical_text, calendar_id, options).await;

    println!(
        "{} Imported {} event(s) into {}",
        "✓".green(),
        summary.imported,
        calendar_id.bold()
    );

    if summary.skipped > 0 {
        println!(
            "{}",
            format!("  {} duplicate(s) skipped", summary.skipped).dimmed()
        );
    }

    if !summary.errors.is_empty() {
        println!("{} {} warning(s):", "!".yellow(), summary.errors.len());
        for error in &summary.errors {
            println!("  {}", error.dimmed());
        }
    }

    Ok(())
}
