mod cli;

use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use log::error;

use events_ical::cache::EventCache;
use events_ical::ics::{self, CalendarMeta};
use events_ical::server::{self, AppState};
use events_ical::source::Source;

use crate::cli::Mode;

fn setup_logging() {
    if env::var("LOG").is_err() {
        env::set_var("LOG", "events_ical=info");
    }

    pretty_env_logger::init_custom_env("LOG");
}

async fn generate(source: &Source, output: &Path) -> Result<()> {
    let events = source.load().await;

    println!("Found {} events", events.len());
    for event in &events {
        println!(
            "  • {} - {} at {}",
            event.title.as_deref().unwrap_or("<untitled>"),
            event.date.as_deref().unwrap_or("<no date>"),
            event
                .schedule
                .as_ref()
                .map_or("<no time>", |schedule| schedule.start()),
        );
    }

    let meta = CalendarMeta::default();
    let calendar = ics::to_ics(&events, &meta, Utc::now().naive_utc());

    if let Err(err) = ics::save(output, &calendar).await {
        error!("Error generating calendar: {err}");
        return Err(err).context("calendar was not written");
    }

    println!("Calendar saved to {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let args = cli::parse(env::args().skip(1).collect());

    match args.mode {
        Mode::Generate { output } => generate(&args.source, &output).await,
        Mode::Serve {
            address,
            cache,
            feed_url,
        } => {
            let state = Arc::new(AppState {
                source: args.source,
                meta: CalendarMeta::default(),
                feed_url,
                cache: EventCache::new(cache),
            });

            server::serve(address, state)
                .await
                .with_context(|| format!("failed to serve on {address}"))
        }
    }
}
