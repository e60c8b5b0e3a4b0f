use anyhow::Result;
use luach_core::{LuachError, ProgressionEngine, RetryPolicy};
use luach_provider_google::GoogleCalendar;

use crate::commands::current_hebrew_year;
use crate::{config, output};

pub fn run(event_id: String, json: bool) -> Result<()> {
    let store = config::open_store()?;
    let service = GoogleCalendar::new();
    let retry = RetryPolicy::default();
    let engine = ProgressionEngine::new(&service, &store, &retry);

    match engine.check_progression(&event_id, config::OWNER_ID, current_hebrew_year()) {
        Ok(Some(status)) => output::success(json, status, None, |status| {
            if status.needs_update {
                println!(
                    "{} years need syncing: {:?}",
                    status.years_needing_sync.len(),
                    status.years_needing_sync
                );
            } else {
                println!("Up to date.");
            }
        }),
        Ok(None) => output::failure(json, LuachError::NotFound(format!("event {}", event_id))),
        Err(err) => output::failure(json, err),
    }
}
