mod commands;
mod source;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use studiocal_core::config::StudioCalConfig;
use studiocal_core::{DateRange, EventFilter, JsonFileStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "studiocal")]
#[command(about = "Import and export studio calendar events as iCal (.ics)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write events as an .ics document
    Export {
        /// Only export this calendar
        #[arg(short, long)]
        calendar: Option<String>,

        /// Only export events owned by this user
        #[arg(short, long)]
        user: Option<String>,

        /// Export events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Export events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import events from an .ics file or a feed URL
    Import {
        /// Path to an .ics file, or an http(s):// or webcal:// URL
        source: String,

        /// Calendar to import into
        #[arg(short, long)]
        calendar: String,

        /// Create events even if their UID already exists in the calendar
        #[arg(long)]
        allow_duplicates: bool,
    },
    /// List stored events
    Events {
        #[arg(short, long)]
        calendar: Option<String>,

        /// Show events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
}

/// Logs go to stderr so `export` can stream the document on stdout.
fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = StudioCalConfig::load()?;
    let store = JsonFileStore::new(config.data_path());

    match cli.command {
        Commands::Export {
            calendar,
            user,
            from,
            to,
            output,
        } => {
            let filter = EventFilter {
                calendar_id: calendar,
                user_id: user,
                range: DateRange::from_args(from.as_deref(), to.as_deref())?,
            };
            commands::export::run(&store, &filter, output.as_deref()).await
        }
        Commands::Import {
            source,
            calendar,
            allow_duplicates,
        } => {
            let mut options = config.import_options()?;
            if allow_duplicates {
                options.skip_duplicates = false;
            }
            commands::import::run(&store, &source, &calendar, &options).await
        }
        Commands::Events { calendar, from, to } => {
            let filter = EventFilter {
                calendar_id: calendar,
                user_id: None,
                range: DateRange::from_args(from.as_deref(), to.as_deref())?,
            };
            commands::events::run(&store, &filter).await
        }
    }
}
