//! Occurrence materialization.

use chrono::NaiveDate;
use tracing::warn;

use crate::error::LuachResult;
use crate::event::RecurringEvent;
use crate::retry::{self, RetryPolicy};
use crate::service::{CalendarService, EventPayload};

/// A successfully materialized year, ready to be persisted by the caller.
#[derive(Debug, Clone)]
pub struct MaterializedOccurrence {
    pub year: i32,
    pub date: NaiveDate,
    pub remote_event_id: String,
}

/// Accumulated result of a materialization batch. Per-year failures are
/// collected, not thrown, so callers can retry just the failed subset later.
#[derive(Debug, Default)]
pub struct MaterializeOutcome {
    pub created: Vec<MaterializedOccurrence>,
    pub failed_years: Vec<i32>,
}

/// Creates one external all-day entry per target year.
pub struct Materializer<'a, S> {
    service: &'a S,
    retry: &'a RetryPolicy,
}

impl<'a, S: CalendarService> Materializer<'a, S> {
    pub fn new(service: &'a S, retry: &'a RetryPolicy) -> Self {
        Materializer { service, retry }
    }

    /// Materialize `years` for `event` into `calendar_id`.
    ///
    /// Years are processed independently and sequentially; one year's
    /// failure never aborts the rest of the batch. The caller is
    /// responsible for passing only years that are not already present and
    /// for persisting the returned occurrences.
    pub async fn materialize(
        &self,
        event: &RecurringEvent,
        years: &[i32],
        calendar_id: &str,
        token: &str,
    ) -> MaterializeOutcome {
        let mut outcome = MaterializeOutcome::default();

        for &year in years {
            match self.materialize_year(event, year, calendar_id, token).await {
                Ok(occurrence) => outcome.created.push(occurrence),
                Err(err) => {
                    warn!(
                        event_id = %event.id,
                        year,
                        error = %err,
                        "failed to materialize year, continuing"
                    );
                    outcome.failed_years.push(year);
                }
            }
        }

        outcome
    }

    async fn materialize_year(
        &self,
        event: &RecurringEvent,
        year: i32,
        calendar_id: &str,
        token: &str,
    ) -> LuachResult<MaterializedOccurrence> {
        let date = event.anchor.anniversary_in(year).to_gregorian();
        let payload = EventPayload::all_day(
            event.display_title(year),
            event.description.clone(),
            date,
            &event.id,
        );

        let remote_event_id = retry::execute(self.retry, "insert event", || {
            self.service.insert_event(token, calendar_id, &payload)
        })
        .await?;

        Ok(MaterializedOccurrence {
            year,
            date,
            remote_event_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hebrew::{HebrewDate, HebrewMonth};
    use crate::service::EVENT_ID_PROPERTY;
    use crate::testutil::FakeService;

    fn sample_event() -> RecurringEvent {
        let anchor = HebrewDate::new(5770, HebrewMonth::Sivan, 12).unwrap();
        RecurringEvent::new("user-1", "Wedding", Some("Chuppah day".into()), anchor)
    }

    #[tokio::test]
    async fn materializes_each_year_with_anniversary_titles() {
        let service = FakeService::new();
        service.add_calendar("cal-1", "Hebrew Anniversaries");
        let retry = RetryPolicy::no_backoff();
        let materializer = Materializer::new(&service, &retry);
        let event = sample_event();

        let outcome = materializer
            .materialize(&event, &[5770, 5771, 5772], "cal-1", "tok")
            .await;

        assert_eq!(outcome.created.len(), 3);
        assert!(outcome.failed_years.is_empty());

        let stored = service.events_in("cal-1");
        assert_eq!(stored[0].payload.summary, "Wedding");
        assert_eq!(stored[1].payload.summary, "(1) Wedding");
        assert_eq!(stored[2].payload.summary, "(2) Wedding");
        assert_eq!(
            stored[0].payload.private_properties.get(EVENT_ID_PROPERTY),
            Some(&event.id)
        );

        // 12 Sivan 5771 is 2011-06-14.
        assert_eq!(
            outcome.created[1].date,
            NaiveDate::from_ymd_opt(2011, 6, 14).unwrap()
        );
    }

    #[tokio::test]
    async fn single_year_failure_does_not_abort_the_batch() {
        let service = FakeService::new();
        service.add_calendar("cal-1", "Hebrew Anniversaries");
        let retry = RetryPolicy::no_backoff();
        let materializer = Materializer::new(&service, &retry);
        let event = sample_event();

        // Second year fails through all retry attempts (4 per call).
        service.fail_inserts_at(&[2, 3, 4, 5]);

        let years: Vec<i32> = (5770..=5774).collect();
        let outcome = materializer
            .materialize(&event, &years, "cal-1", "tok")
            .await;

        assert_eq!(outcome.failed_years, vec![5771]);
        let created: Vec<i32> = outcome.created.iter().map(|o| o.year).collect();
        assert_eq!(created, vec![5770, 5772, 5773, 5774]);
    }
}
