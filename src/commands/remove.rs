use anyhow::Result;
use luach_core::{Reconciler, RetryPolicy};
use luach_provider_google::GoogleCalendar;

use crate::{config, output};

pub async fn run(event_id: String, token: Option<String>, json: bool) -> Result<()> {
    let token = config::access_token(token)?;
    let store = config::open_store()?;
    let service = GoogleCalendar::new();
    let retry = RetryPolicy::default();
    let reconciler = Reconciler::new(&service, &store, &retry);

    let result = reconciler
        .delete_event(&event_id, config::OWNER_ID, &token)
        .await;

    match result {
        Ok(report) => {
            let warning = report.warning.clone();
            output::success(json, report, warning, |report| {
                println!(
                    "Removed event and {} occurrences",
                    report.occurrences_deleted
                );
            })
        }
        Err(err) => output::failure(json, err),
    }
}
