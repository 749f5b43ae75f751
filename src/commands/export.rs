use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use studiocal_core::{EventFilter, JsonFileStore, export_calendar};

pub async fn run(store: &JsonFileStore, filter: &EventFilter, output: Option<&Path>) -> Result<()> {
    let ics = export_calendar(store, filter)
        .await
        .context("Failed to export events")?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &ics)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;

            let count = ics.matches("\r\nBEGIN:VEVENT\r\n").count();
            eprintln!(
                "{} Exported {} event(s) to {}",
                "✓".green(),
                count,
                path.display()
            );
        }
        None => print!("{ics}"),
    }

    Ok(())
}
