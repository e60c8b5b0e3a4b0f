//! Year progression: detecting and filling missing occurrence years.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LuachError, LuachResult};
use crate::event::{EventOccurrence, RecurringEvent};
use crate::retry::RetryPolicy;
use crate::service::CalendarService;
use crate::store::Store;
use crate::sync::{BindingResolver, Materializer};
use crate::window::sync_window;

/// Result of a progression check for one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionStatus {
    pub years_needing_sync: Vec<i32>,
    pub needs_update: bool,
}

/// Result of one progression sync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub years_synced: Vec<i32>,
    pub failed_years: Vec<i32>,
}

/// Aggregated result of a user-wide progression pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProgressionSummary {
    pub total_events: usize,
    pub events_needing_update: usize,
    pub events_updated: usize,
    /// Events that failed outright. Per-occurrence partial failures do not
    /// fail an event; an unresolvable calendar binding does.
    pub events_failed: usize,
    pub errors: Vec<String>,
}

/// Drives occurrence materialization per event as time advances.
pub struct ProgressionEngine<'a, S, St> {
    service: &'a S,
    store: &'a St,
    retry: &'a RetryPolicy,
}

impl<'a, S: CalendarService, St: Store> ProgressionEngine<'a, S, St> {
    pub fn new(service: &'a S, store: &'a St, retry: &'a RetryPolicy) -> Self {
        ProgressionEngine {
            service,
            store,
            retry,
        }
    }

    /// Report which years of the policy window are missing an occurrence.
    ///
    /// Returns `None` when the event does not exist or is not owned by the
    /// caller. Missing years are derived from the occurrence rows, not from
    /// `last_synced_year`: the high-water mark is only a cache, and a year
    /// lost to a partial failure must show up here again.
    pub fn check_progression(
        &self,
        event_id: &str,
        owner_id: &str,
        current_year: i32,
    ) -> LuachResult<Option<ProgressionStatus>> {
        let Some(event) = self.owned_event(event_id, owner_id)? else {
            return Ok(None);
        };
        let missing = self.missing_years(&event, current_year)?;
        Ok(Some(ProgressionStatus {
            needs_update: !missing.is_empty(),
            years_needing_sync: missing,
        }))
    }

    /// Materialize every missing year of the policy window and advance the
    /// high-water mark. Re-running with nothing missing is a no-op that
    /// reports zero years synced.
    pub async fn sync_new_years(
        &self,
        event_id: &str,
        owner_id: &str,
        token: &str,
        calendar_id: &str,
        current_year: i32,
    ) -> LuachResult<SyncReport> {
        validate_request(event_id, token, calendar_id)?;

        let mut event = self
            .owned_event(event_id, owner_id)?
            .ok_or_else(|| LuachError::NotFound(format!("event {}", event_id)))?;

        let missing = self.missing_years(&event, current_year)?;
        if missing.is_empty() {
            debug!(event_id, "no years need syncing");
            return Ok(SyncReport::default());
        }

        let materializer = Materializer::new(self.service, self.retry);
        let outcome = materializer
            .materialize(&event, &missing, calendar_id, token)
            .await;

        if outcome.created.is_empty() {
            return Err(LuachError::Sync(format!(
                "no occurrences could be materialized for event {} ({} years failed)",
                event_id,
                outcome.failed_years.len()
            )));
        }

        let mut years_synced = Vec::with_capacity(outcome.created.len());
        for materialized in outcome.created {
            let occurrence = EventOccurrence::new(
                &event.id,
                materialized.year,
                materialized.date,
                materialized.remote_event_id,
            );
            match self.store.insert_occurrence(&occurrence) {
                Ok(()) => years_synced.push(materialized.year),
                // A concurrent sync recorded this year first; the row wins.
                Err(LuachError::Conflict(_)) => {
                    debug!(event_id, year = materialized.year, "duplicate year suppressed");
                }
                Err(err) => return Err(err),
            }
        }

        let window = sync_window(event.anchor.year, current_year);
        if window.end > event.last_synced_year {
            event.last_synced_year = window.end;
            self.store.update_event(&event)?;
        }

        info!(
            event_id,
            synced = years_synced.len(),
            failed = outcome.failed_years.len(),
            "progression sync finished"
        );
        Ok(SyncReport {
            years_synced,
            failed_years: outcome.failed_years,
        })
    }

    /// Run progression over every event a user owns, resolving the calendar
    /// binding once up front.
    pub async fn process_user_progression(
        &self,
        owner_id: &str,
        token: &str,
        current_year: i32,
    ) -> LuachResult<UserProgressionSummary> {
        let events = self.store.events_for_owner(owner_id)?;
        let mut summary = UserProgressionSummary {
            total_events: events.len(),
            ..UserProgressionSummary::default()
        };
        if events.is_empty() {
            return Ok(summary);
        }

        let resolver = BindingResolver::new(self.service, self.store, self.retry);
        let known = self.store.binding(owner_id)?;
        let calendar_id = resolver
            .resolve(owner_id, token, known.as_ref().map(|b| b.calendar_id.as_str()))
            .await;

        for event in events {
            let missing = self.missing_years(&event, current_year)?;
            if missing.is_empty() {
                continue;
            }
            summary.events_needing_update += 1;

            match &calendar_id {
                Err(binding_err) => {
                    summary.events_failed += 1;
                    summary
                        .errors
                        .push(format!("event {}: {}", event.id, binding_err));
                }
                Ok(calendar_id) => {
                    match self
                        .sync_new_years(&event.id, owner_id, token, calendar_id, current_year)
                        .await
                    {
                        Ok(_) => summary.events_updated += 1,
                        Err(err) => {
                            warn!(event_id = %event.id, error = %err, "progression failed for event");
                            summary.events_failed += 1;
                            summary.errors.push(format!("event {}: {}", event.id, err));
                        }
                    }
                }
            }
        }

        info!(
            owner_id,
            total = summary.total_events,
            needing_update = summary.events_needing_update,
            updated = summary.events_updated,
            failed = summary.events_failed,
            "user progression processed"
        );
        Ok(summary)
    }

    fn owned_event(&self, event_id: &str, owner_id: &str) -> LuachResult<Option<RecurringEvent>> {
        Ok(self
            .store
            .event(event_id)?
            .filter(|e| e.owner_id == owner_id))
    }

    fn missing_years(&self, event: &RecurringEvent, current_year: i32) -> LuachResult<Vec<i32>> {
        let window = sync_window(event.anchor.year, current_year);
        let existing: HashSet<i32> = self
            .store
            .occurrences_for_event(&event.id)?
            .iter()
            .map(|o| o.year)
            .collect();
        Ok(window.years().filter(|y| !existing.contains(y)).collect())
    }
}

fn validate_request(event_id: &str, token: &str, calendar_id: &str) -> LuachResult<()> {
    if event_id.is_empty() {
        return Err(LuachError::Validation("event id must not be empty".into()));
    }
    if token.is_empty() {
        return Err(LuachError::Validation(
            "access token must not be empty".into(),
        ));
    }
    if calendar_id.is_empty() {
        return Err(LuachError::Validation(
            "calendar id must not be empty".into(),
        ));
    }
    Ok(())
}
