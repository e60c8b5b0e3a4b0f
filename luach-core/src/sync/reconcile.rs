//! Reconciliation: propagating edits and deletions to every occurrence.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ErrorKind, LuachError, LuachResult};
use crate::event::RecurringEvent;
use crate::hebrew::HebrewDate;
use crate::retry::{self, RetryPolicy};
use crate::service::{CalendarService, EventPatch};
use crate::store::Store;
use crate::sync::{BindingResolver, ProgressionEngine, SyncReport};

/// Fields for a new recurring event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub anchor: HebrewDate,
}

/// Title/description edit. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Result of propagating an edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateReport {
    pub occurrences_updated: usize,
    pub occurrences_failed: usize,
}

/// Result of deleting an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteReport {
    pub occurrences_deleted: usize,
    pub remote_failures: usize,
    /// Set when deletion had to fall back to local-only cleanup or left
    /// remote orphans behind. The operation still counts as a success.
    pub warning: Option<String>,
}

/// Create/update/delete operations over a recurring event and its
/// materialized occurrences.
pub struct Reconciler<'a, S, St> {
    service: &'a S,
    store: &'a St,
    retry: &'a RetryPolicy,
}

impl<'a, S: CalendarService, St: Store> Reconciler<'a, S, St> {
    pub fn new(service: &'a S, store: &'a St, retry: &'a RetryPolicy) -> Self {
        Reconciler {
            service,
            store,
            retry,
        }
    }

    /// Create a recurring event and materialize its initial window.
    pub async fn create_event(
        &self,
        owner_id: &str,
        token: &str,
        new_event: NewEvent,
        current_year: i32,
    ) -> LuachResult<(RecurringEvent, SyncReport)> {
        if new_event.title.trim().is_empty() {
            return Err(LuachError::Validation("title must not be empty".into()));
        }
        if token.is_empty() {
            return Err(LuachError::Validation(
                "access token must not be empty".into(),
            ));
        }

        let event = RecurringEvent::new(
            owner_id,
            new_event.title,
            new_event.description,
            new_event.anchor,
        );
        self.store.insert_event(&event)?;

        let calendar_id = self.resolve_binding(owner_id, token).await?;
        let engine = ProgressionEngine::new(self.service, self.store, self.retry);
        let report = engine
            .sync_new_years(&event.id, owner_id, token, &calendar_id, current_year)
            .await?;

        // Re-read for the advanced high-water mark.
        let event = self.store.event(&event.id)?.unwrap_or(event);
        info!(event_id = %event.id, synced = report.years_synced.len(), "event created");
        Ok((event, report))
    }

    /// Apply a title/description edit and patch every occurrence.
    ///
    /// A not-found patch response means the cached calendar id may be stale:
    /// the binding is re-resolved once (fresh search/create) and that single
    /// occurrence is retried before giving up on it.
    pub async fn update_event(
        &self,
        event_id: &str,
        owner_id: &str,
        token: &str,
        changes: EventChanges,
    ) -> LuachResult<UpdateReport> {
        let mut event = self
            .owned_event(event_id, owner_id)?
            .ok_or_else(|| LuachError::NotFound(format!("event {}", event_id)))?;

        if let Some(title) = changes.title {
            if title.trim().is_empty() {
                return Err(LuachError::Validation("title must not be empty".into()));
            }
            event.title = title;
        }
        if let Some(description) = changes.description {
            event.description = if description.is_empty() {
                None
            } else {
                Some(description)
            };
        }
        self.store.update_event(&event)?;

        let occurrences = self.store.occurrences_for_event(event_id)?;
        let mut report = UpdateReport::default();
        if occurrences.is_empty() {
            return Ok(report);
        }

        let resolver = BindingResolver::new(self.service, self.store, self.retry);
        let known = self.store.binding(owner_id)?;
        let mut calendar_id = resolver
            .resolve(owner_id, token, known.as_ref().map(|b| b.calendar_id.as_str()))
            .await?;

        for occurrence in &occurrences {
            let patch = EventPatch {
                summary: Some(event.display_title(occurrence.year)),
                // An empty string clears a removed description remotely.
                description: Some(event.description.clone().unwrap_or_default()),
            };

            let result = retry::execute(self.retry, "patch event", || {
                self.service
                    .patch_event(token, &calendar_id, &occurrence.remote_event_id, &patch)
            })
            .await;

            match result {
                Ok(()) => report.occurrences_updated += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    warn!(
                        occurrence_id = %occurrence.id,
                        "patch hit not-found, re-resolving calendar binding"
                    );
                    match resolver.resolve_fresh(owner_id, token).await {
                        Ok(fresh_id) => {
                            calendar_id = fresh_id;
                            let retried = retry::execute(self.retry, "patch event (rebound)", || {
                                self.service.patch_event(
                                    token,
                                    &calendar_id,
                                    &occurrence.remote_event_id,
                                    &patch,
                                )
                            })
                            .await;
                            match retried {
                                Ok(()) => report.occurrences_updated += 1,
                                Err(err) => {
                                    warn!(occurrence_id = %occurrence.id, error = %err, "patch retry failed");
                                    report.occurrences_failed += 1;
                                }
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "binding re-resolution failed");
                            report.occurrences_failed += 1;
                        }
                    }
                }
                Err(err) => {
                    warn!(occurrence_id = %occurrence.id, error = %err, "patch failed");
                    report.occurrences_failed += 1;
                }
            }
        }

        info!(
            event_id,
            updated = report.occurrences_updated,
            failed = report.occurrences_failed,
            "edit propagated"
        );
        Ok(report)
    }

    /// Delete an event, its occurrence rows, and (best-effort) its remote
    /// entries. Local state is always cleaned up, even when remote deletes
    /// fail; leftover remote entries are reported in the warning, not as an
    /// overall failure.
    pub async fn delete_event(
        &self,
        event_id: &str,
        owner_id: &str,
        token: &str,
    ) -> LuachResult<DeleteReport> {
        let event = self
            .owned_event(event_id, owner_id)?
            .ok_or_else(|| LuachError::NotFound(format!("event {}", event_id)))?;

        let occurrences = self.store.occurrences_for_event(event_id)?;
        let mut report = DeleteReport::default();

        if occurrences.is_empty() {
            self.store.delete_event(event_id)?;
            return Ok(report);
        }

        let resolver = BindingResolver::new(self.service, self.store, self.retry);
        let calendar_id = match self.store.binding(owner_id)? {
            None => None,
            Some(binding) => match resolver.verify_exists(token, &binding.calendar_id).await {
                Ok(true) => Some(binding.calendar_id),
                Ok(false) => None,
                Err(err) => {
                    warn!(error = %err, "calendar probe failed, deleting locally only");
                    None
                }
            },
        };

        match calendar_id {
            None => {
                report.warning =
                    Some("remote calendar not found; removed local data only".to_string());
            }
            Some(calendar_id) => {
                for occurrence in &occurrences {
                    let result = retry::execute(self.retry, "delete event", || {
                        self.service
                            .delete_event(token, &calendar_id, &occurrence.remote_event_id)
                    })
                    .await;
                    match result {
                        Ok(()) => {}
                        // Already gone remotely: nothing left to delete.
                        Err(err) if err.kind() == ErrorKind::NotFound => {}
                        Err(err) => {
                            warn!(
                                occurrence_id = %occurrence.id,
                                error = %err,
                                "remote delete failed, continuing"
                            );
                            report.remote_failures += 1;
                        }
                    }
                }
                if report.remote_failures > 0 {
                    report.warning = Some(format!(
                        "{} remote entries could not be deleted and were left behind",
                        report.remote_failures
                    ));
                }
            }
        }

        self.store.delete_occurrences_for_event(event_id)?;
        self.store.delete_event(event_id)?;
        report.occurrences_deleted = occurrences.len();

        info!(
            event_id = %event.id,
            deleted = report.occurrences_deleted,
            remote_failures = report.remote_failures,
            "event deleted"
        );
        Ok(report)
    }

    async fn resolve_binding(&self, owner_id: &str, token: &str) -> LuachResult<String> {
        let resolver = BindingResolver::new(self.service, self.store, self.retry);
        let known = self.store.binding(owner_id)?;
        resolver
            .resolve(owner_id, token, known.as_ref().map(|b| b.calendar_id.as_str()))
            .await
    }

    fn owned_event(&self, event_id: &str, owner_id: &str) -> LuachResult<Option<RecurringEvent>> {
        Ok(self
            .store
            .event(event_id)?
            .filter(|e| e.owner_id == owner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::CalendarBinding;
    use crate::hebrew::HebrewMonth;
    use crate::service::APP_CALENDAR_NAME;
    use crate::store::MemoryStore;
    use crate::testutil::FakeService;

    fn anchor(year: i32) -> HebrewDate {
        HebrewDate::new(year, HebrewMonth::Sivan, 12).unwrap()
    }

    fn fixture() -> (FakeService, MemoryStore, RetryPolicy) {
        let service = FakeService::new();
        service.add_calendar("cal-1", APP_CALENDAR_NAME);
        let store = MemoryStore::new();
        store
            .put_binding(&CalendarBinding::new("user-1", "cal-1"))
            .unwrap();
        (service, store, RetryPolicy::no_backoff())
    }

    #[tokio::test]
    async fn create_materializes_the_initial_window() {
        let (service, store, retry) = fixture();
        let reconciler = Reconciler::new(&service, &store, &retry);

        let (event, report) = reconciler
            .create_event(
                "user-1",
                "tok",
                NewEvent {
                    title: "Bar mitzvah".into(),
                    description: None,
                    anchor: anchor(5770),
                },
                5760,
            )
            .await
            .unwrap();

        assert_eq!(report.years_synced.len(), 11);
        assert_eq!(event.last_synced_year, 5780);
        assert_eq!(store.occurrences_for_event(&event.id).unwrap().len(), 11);
        assert_eq!(service.events_in("cal-1").len(), 11);
    }

    #[tokio::test]
    async fn update_repatches_every_occurrence_with_new_titles() {
        let (service, store, retry) = fixture();
        let reconciler = Reconciler::new(&service, &store, &retry);
        let (event, _) = reconciler
            .create_event(
                "user-1",
                "tok",
                NewEvent {
                    title: "Wedding".into(),
                    description: None,
                    anchor: anchor(5778),
                },
                5780,
            )
            .await
            .unwrap();

        let report = reconciler
            .update_event(
                &event.id,
                "user-1",
                "tok",
                EventChanges {
                    title: Some("Anniversary".into()),
                    description: Some("Dinner reservation".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(report.occurrences_failed, 0);
        assert_eq!(
            report.occurrences_updated,
            store.occurrences_for_event(&event.id).unwrap().len()
        );

        let remote = service.events_in("cal-1");
        assert!(remote.iter().any(|e| e.payload.summary == "Anniversary"));
        assert!(remote.iter().any(|e| e.payload.summary == "(2) Anniversary"));
        assert!(
            remote
                .iter()
                .all(|e| e.payload.description.as_deref() == Some("Dinner reservation"))
        );
        assert_eq!(
            store.event(&event.id).unwrap().unwrap().title,
            "Anniversary"
        );
    }

    #[tokio::test]
    async fn update_rebinds_once_when_calendar_vanished() {
        let (service, store, retry) = fixture();
        let reconciler = Reconciler::new(&service, &store, &retry);
        let (event, _) = reconciler
            .create_event(
                "user-1",
                "tok",
                NewEvent {
                    title: "Wedding".into(),
                    description: None,
                    anchor: anchor(5779),
                },
                5780,
            )
            .await
            .unwrap();

        // The bound calendar disappears externally; patches will 404 and the
        // resolver will create a replacement calendar.
        service.remove_calendar("cal-1");

        let report = reconciler
            .update_event(
                &event.id,
                "user-1",
                "tok",
                EventChanges {
                    title: Some("Renamed".into()),
                    description: None,
                },
            )
            .await
            .unwrap();

        // The occurrences themselves are gone with the old calendar, so the
        // per-occurrence repatch still fails, but the binding has healed.
        let occurrences = store.occurrences_for_event(&event.id).unwrap().len();
        assert_eq!(report.occurrences_failed, occurrences);
        let binding = store.binding("user-1").unwrap().unwrap();
        assert_ne!(binding.calendar_id, "cal-1");
        assert_eq!(
            service.calendar_summary(&binding.calendar_id).as_deref(),
            Some(APP_CALENDAR_NAME)
        );
    }

    #[tokio::test]
    async fn delete_removes_remote_and_local_state() {
        let (service, store, retry) = fixture();
        let reconciler = Reconciler::new(&service, &store, &retry);
        let (event, _) = reconciler
            .create_event(
                "user-1",
                "tok",
                NewEvent {
                    title: "Wedding".into(),
                    description: None,
                    anchor: anchor(5778),
                },
                5780,
            )
            .await
            .unwrap();

        let report = reconciler
            .delete_event(&event.id, "user-1", "tok")
            .await
            .unwrap();

        assert!(report.warning.is_none());
        assert_eq!(report.remote_failures, 0);
        assert!(service.events_in("cal-1").is_empty());
        assert!(store.event(&event.id).unwrap().is_none());
        assert!(store.occurrences_for_event(&event.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_with_missing_calendar_cleans_up_locally_with_warning() {
        let (service, store, retry) = fixture();
        let reconciler = Reconciler::new(&service, &store, &retry);
        let (event, _) = reconciler
            .create_event(
                "user-1",
                "tok",
                NewEvent {
                    title: "Wedding".into(),
                    description: None,
                    anchor: anchor(5778),
                },
                5780,
            )
            .await
            .unwrap();

        service.remove_calendar("cal-1");
        let calls_before = service.calls();

        let report = reconciler
            .delete_event(&event.id, "user-1", "tok")
            .await
            .unwrap();

        assert!(report.warning.is_some());
        assert!(store.event(&event.id).unwrap().is_none());
        assert!(store.occurrences_for_event(&event.id).unwrap().is_empty());
        // One existence probe, then straight to local cleanup: no cascade of
        // per-occurrence 404s.
        assert_eq!(service.calls(), calls_before + 1);
    }

    #[tokio::test]
    async fn delete_tolerates_individual_remote_failures() {
        let (service, store, retry) = fixture();
        let reconciler = Reconciler::new(&service, &store, &retry);
        let (event, _) = reconciler
            .create_event(
                "user-1",
                "tok",
                NewEvent {
                    title: "Wedding".into(),
                    description: None,
                    anchor: anchor(5777),
                },
                5780,
            )
            .await
            .unwrap();

        // One remote delete fails through its whole retry budget.
        service.fail_next_delete(500, 4);

        let report = reconciler
            .delete_event(&event.id, "user-1", "tok")
            .await
            .unwrap();

        assert_eq!(report.remote_failures, 1);
        assert!(report.warning.is_some());
        // Local rows are gone regardless.
        assert!(store.event(&event.id).unwrap().is_none());
        assert!(store.occurrences_for_event(&event.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_without_occurrences_is_local_only() {
        let (service, store, retry) = fixture();
        let reconciler = Reconciler::new(&service, &store, &retry);
        let event = RecurringEvent::new("user-1", "Wedding", None, anchor(5790));
        store.insert_event(&event).unwrap();
        let calls_before = service.calls();

        let report = reconciler
            .delete_event(&event.id, "user-1", "tok")
            .await
            .unwrap();

        assert_eq!(report.occurrences_deleted, 0);
        assert!(report.warning.is_none());
        assert_eq!(service.calls(), calls_before);
        assert!(store.event(&event.id).unwrap().is_none());
    }
}
