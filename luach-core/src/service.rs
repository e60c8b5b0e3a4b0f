//! The external calendar service seam.
//!
//! Providers implement `CalendarService` against their API and convert
//! responses into these provider-neutral types. The engine works exclusively
//! through this trait, so tests can script the service without any network.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Display name of the calendar this application owns on the remote side.
pub const APP_CALENDAR_NAME: &str = "Hebrew Anniversaries";

/// Private extended-property key linking a remote entry back to the
/// internal event it was materialized from. Provenance only; lookups go
/// through the occurrence rows.
pub const EVENT_ID_PROPERTY: &str = "luachEventId";

/// A calendar as listed by the external service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCalendar {
    pub id: String,
    pub summary: String,
}

/// Payload for one all-day occurrence entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub summary: String,
    pub description: Option<String>,
    /// All-day start date.
    pub start: NaiveDate,
    /// All-day end date, exclusive.
    pub end: NaiveDate,
    /// Private extended properties attached to the entry.
    pub private_properties: BTreeMap<String, String>,
}

impl EventPayload {
    /// A single-day all-day payload carrying the provenance property.
    pub fn all_day(
        summary: impl Into<String>,
        description: Option<String>,
        date: NaiveDate,
        source_event_id: &str,
    ) -> Self {
        let mut private_properties = BTreeMap::new();
        private_properties.insert(EVENT_ID_PROPERTY.to_string(), source_event_id.to_string());
        EventPayload {
            summary: summary.into(),
            description,
            start: date,
            // All-day entries use an exclusive end date.
            end: date + Days::new(1),
            private_properties,
        }
    }
}

/// Partial update for an existing entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    pub summary: Option<String>,
    pub description: Option<String>,
}

/// A failed service call, carrying the HTTP status when one was received.
/// `status: None` means the request never produced a response (transport
/// failure), which the retry layer treats as transient.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    pub status: Option<u16>,
    pub message: String,
}

impl ServiceError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ServiceError {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ServiceError {
            status: None,
            message: message.into(),
        }
    }
}

/// Event CRUD surface of the external calendar service.
#[allow(async_fn_in_trait)]
pub trait CalendarService {
    async fn list_calendars(&self, token: &str) -> Result<Vec<RemoteCalendar>, ServiceError>;

    /// Create a calendar with the given display name, returning its id.
    async fn create_calendar(&self, token: &str, summary: &str) -> Result<String, ServiceError>;

    /// Lightweight existence probe. A clean "gone" answer is `Ok(false)`,
    /// not an error.
    async fn calendar_exists(&self, token: &str, calendar_id: &str)
    -> Result<bool, ServiceError>;

    /// Insert an entry, returning the id the service assigned.
    async fn insert_event(
        &self,
        token: &str,
        calendar_id: &str,
        payload: &EventPayload,
    ) -> Result<String, ServiceError>;

    async fn patch_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<(), ServiceError>;

    async fn delete_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), ServiceError>;
}
