use anyhow::Result;
use luach_core::{HebrewDate, HebrewMonth, NewEvent, Reconciler, RetryPolicy};
use luach_provider_google::GoogleCalendar;
use serde::Serialize;

use crate::commands::current_hebrew_year;
use crate::{config, output};

#[derive(Serialize)]
struct AddResult {
    event: luach_core::RecurringEvent,
    report: luach_core::SyncReport,
}

pub async fn run(
    title: String,
    day: u8,
    month: String,
    year: i32,
    description: Option<String>,
    token: Option<String>,
    json: bool,
) -> Result<()> {
    let month: HebrewMonth = match month.parse() {
        Ok(month) => month,
        Err(err) => return output::failure(json, err),
    };
    let anchor = match HebrewDate::new(year, month, day) {
        Ok(anchor) => anchor,
        Err(err) => return output::failure(json, err),
    };

    let token = config::access_token(token)?;
    let store = config::open_store()?;
    let service = GoogleCalendar::new();
    let retry = RetryPolicy::default();
    let reconciler = Reconciler::new(&service, &store, &retry);

    let result = reconciler
        .create_event(
            config::OWNER_ID,
            &token,
            NewEvent {
                title,
                description,
                anchor,
            },
            current_hebrew_year(),
        )
        .await;

    match result {
        Ok((event, report)) => output::success(
            json,
            AddResult { event, report },
            None,
            |result| {
                println!("Added '{}' ({})", result.event.title, result.event.id);
                println!(
                    "  anchor: {}  occurrences created: {}",
                    result.event.anchor,
                    result.report.years_synced.len()
                );
                if !result.report.failed_years.is_empty() {
                    println!(
                        "  {} years failed and will be retried on the next sync",
                        result.report.failed_years.len()
                    );
                }
            },
        ),
        Err(err) => output::failure(json, err),
    }
}
