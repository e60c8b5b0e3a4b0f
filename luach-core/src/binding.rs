//! The owner-to-calendar binding.

use serde::{Deserialize, Serialize};

/// Associates an application user with their authoritative external
/// calendar. One binding per owner; the id is replaced (not appended to)
/// when the remote calendar turns out to have been deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarBinding {
    pub owner_id: String,
    pub calendar_id: String,
}

impl CalendarBinding {
    pub fn new(owner_id: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        CalendarBinding {
            owner_id: owner_id.into(),
            calendar_id: calendar_id.into(),
        }
    }
}
