use anyhow::Result;
use luach_core::{EventChanges, LuachError, Reconciler, RetryPolicy};
use luach_provider_google::GoogleCalendar;

use crate::{config, output};

pub async fn run(
    event_id: String,
    title: Option<String>,
    description: Option<String>,
    token: Option<String>,
    json: bool,
) -> Result<()> {
    let changes = EventChanges { title, description };
    if changes.is_empty() {
        return output::failure(
            json,
            LuachError::Validation("nothing to change; pass --title or --description".into()),
        );
    }

    let token = config::access_token(token)?;
    let store = config::open_store()?;
    let service = GoogleCalendar::new();
    let retry = RetryPolicy::default();
    let reconciler = Reconciler::new(&service, &store, &retry);

    let result = reconciler
        .update_event(&event_id, config::OWNER_ID, &token, changes)
        .await;

    match result {
        Ok(report) => output::success(json, report, None, |report| {
            println!(
                "{} occurrences updated, {} failed",
                report.occurrences_updated, report.occurrences_failed
            );
        }),
        Err(err) => output::failure(json, err),
    }
}
