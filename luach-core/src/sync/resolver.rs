//! Calendar binding resolution.

use tracing::{debug, info};

use crate::binding::CalendarBinding;
use crate::error::{LuachError, LuachResult};
use crate::retry::{self, RetryPolicy};
use crate::service::{APP_CALENDAR_NAME, CalendarService};
use crate::store::Store;

/// Resolves, lazily creates, and verifies the single external calendar
/// bound to a user. The binding is mutable: when the remote calendar was
/// deleted behind our back, a fresh resolve replaces it.
pub struct BindingResolver<'a, S, St> {
    service: &'a S,
    store: &'a St,
    retry: &'a RetryPolicy,
}

impl<'a, S: CalendarService, St: Store> BindingResolver<'a, S, St> {
    pub fn new(service: &'a S, store: &'a St, retry: &'a RetryPolicy) -> Self {
        BindingResolver {
            service,
            store,
            retry,
        }
    }

    /// Resolve the calendar id for `owner_id`.
    ///
    /// A `known_id` is trusted as-is (fast path, no external call); callers
    /// only omit it when no cached id exists or the cached one is already
    /// known to be invalid.
    pub async fn resolve(
        &self,
        owner_id: &str,
        token: &str,
        known_id: Option<&str>,
    ) -> LuachResult<String> {
        if let Some(id) = known_id {
            return Ok(id.to_owned());
        }
        self.resolve_fresh(owner_id, token).await
    }

    /// Search for the application calendar by its well-known display name,
    /// creating it if absent, and persist the result against the owner.
    /// Ignores any cached binding.
    pub async fn resolve_fresh(&self, owner_id: &str, token: &str) -> LuachResult<String> {
        let calendars = retry::execute(self.retry, "list calendars", || {
            self.service.list_calendars(token)
        })
        .await
        .map_err(calendar_error)?;

        if let Some(calendar) = calendars
            .into_iter()
            .find(|c| c.summary == APP_CALENDAR_NAME)
        {
            debug!(owner_id, calendar_id = %calendar.id, "found existing anniversary calendar");
            self.store
                .put_binding(&CalendarBinding::new(owner_id, &calendar.id))?;
            return Ok(calendar.id);
        }

        let calendar_id = retry::execute(self.retry, "create calendar", || {
            self.service.create_calendar(token, APP_CALENDAR_NAME)
        })
        .await
        .map_err(calendar_error)?;

        info!(owner_id, calendar_id = %calendar_id, "created anniversary calendar");
        self.store
            .put_binding(&CalendarBinding::new(owner_id, &calendar_id))?;
        Ok(calendar_id)
    }

    /// Lightweight existence probe, used before bulk operations to
    /// short-circuit to local-only cleanup when the remote calendar is
    /// already gone.
    pub async fn verify_exists(&self, token: &str, calendar_id: &str) -> LuachResult<bool> {
        retry::execute(self.retry, "verify calendar", || {
            self.service.calendar_exists(token, calendar_id)
        })
        .await
    }
}

/// Binding resolution failures surface as `CALENDAR_ERROR`, except auth
/// failures, which must keep their own kind.
fn calendar_error(err: LuachError) -> LuachError {
    match err {
        LuachError::Auth(_) => err,
        other => LuachError::Calendar(format!("could not resolve calendar binding: {}", other)),
    }
}
