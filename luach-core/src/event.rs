//! Anniversary event types.
//!
//! A `RecurringEvent` is the user-defined anniversary anchored to a Hebrew
//! date; an `EventOccurrence` is one materialized Gregorian instance of it,
//! mirrored as a single all-day entry in the external calendar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::hebrew::HebrewDate;

/// A user-defined recurring anniversary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringEvent {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Hebrew date of the first occurrence.
    pub anchor: HebrewDate,
    pub recurrence: Recurrence,
    /// Highest Hebrew year a sync has been attempted for. Monotone cache;
    /// occurrence rows are the source of truth for what actually exists.
    pub last_synced_year: i32,
}

impl RecurringEvent {
    pub fn new(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
        anchor: HebrewDate,
    ) -> Self {
        RecurringEvent {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            title: title.into(),
            description,
            anchor,
            recurrence: Recurrence::YearlyAnniversary,
            last_synced_year: anchor.year - 1,
        }
    }

    /// Display title for the occurrence in a given Hebrew year: the ordinal
    /// anniversary count is prefixed once it is greater than zero.
    pub fn display_title(&self, year: i32) -> String {
        let count = year - self.anchor.year;
        if count > 0 {
            format!("({}) {}", count, self.title)
        } else {
            self.title.clone()
        }
    }
}

/// How an event recurs. Only yearly anniversaries are supported today; the
/// field exists so stored events keep deserializing when more kinds appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    YearlyAnniversary,
}

/// One materialized instance of a recurring event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOccurrence {
    pub id: String,
    pub event_id: String,
    /// Hebrew year this occurrence belongs to.
    pub year: i32,
    /// Materialized Gregorian date (derived, never edited directly).
    pub date: NaiveDate,
    /// Id assigned by the external calendar service.
    pub remote_event_id: String,
}

impl EventOccurrence {
    pub fn new(
        event_id: impl Into<String>,
        year: i32,
        date: NaiveDate,
        remote_event_id: impl Into<String>,
    ) -> Self {
        EventOccurrence {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            year,
            date,
            remote_event_id: remote_event_id.into(),
        }
    }
}
