use anyhow::Result;
use luach_core::{ProgressionEngine, RetryPolicy};
use luach_provider_google::GoogleCalendar;

use crate::commands::current_hebrew_year;
use crate::{config, output};

pub async fn run(token: Option<String>, json: bool) -> Result<()> {
    let token = config::access_token(token)?;
    let store = config::open_store()?;
    let service = GoogleCalendar::new();
    let retry = RetryPolicy::default();
    let engine = ProgressionEngine::new(&service, &store, &retry);

    let result = engine
        .process_user_progression(config::OWNER_ID, &token, current_hebrew_year())
        .await;

    match result {
        Ok(summary) => output::success(json, summary, None, |summary| {
            println!(
                "{} events, {} needed an update, {} updated, {} failed",
                summary.total_events,
                summary.events_needing_update,
                summary.events_updated,
                summary.events_failed
            );
            for error in &summary.errors {
                println!("  error: {}", error);
            }
        }),
        Err(err) => output::failure(json, err),
    }
}
