//! Wire types for the Google Calendar v3 API.
//!
//! Only the fields this provider reads are modeled; everything else in the
//! responses is ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarList {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatedCalendar {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
}
