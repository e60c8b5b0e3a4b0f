//! Persistence for events, occurrences and calendar bindings.
//!
//! The engine only needs keyed read/write access, expressed by the [`Store`]
//! trait. [`MemoryStore`] backs tests and embedding; [`JsonStore`] is the
//! CLI's single-file persistence.

mod file;
mod memory;

pub use file::JsonStore;
pub use memory::MemoryStore;

use crate::binding::CalendarBinding;
use crate::error::LuachResult;
use crate::event::{EventOccurrence, RecurringEvent};

/// Keyed CRUD over the three row kinds.
///
/// `insert_occurrence` must reject a second occurrence for the same
/// `(event_id, year)` with a `Conflict` error; that constraint is what keeps
/// two racing progression syncs from double-materializing a year.
pub trait Store {
    fn event(&self, event_id: &str) -> LuachResult<Option<RecurringEvent>>;
    fn events_for_owner(&self, owner_id: &str) -> LuachResult<Vec<RecurringEvent>>;
    fn insert_event(&self, event: &RecurringEvent) -> LuachResult<()>;
    fn update_event(&self, event: &RecurringEvent) -> LuachResult<()>;
    fn delete_event(&self, event_id: &str) -> LuachResult<()>;

    fn occurrences_for_event(&self, event_id: &str) -> LuachResult<Vec<EventOccurrence>>;
    fn insert_occurrence(&self, occurrence: &EventOccurrence) -> LuachResult<()>;
    fn delete_occurrences_for_event(&self, event_id: &str) -> LuachResult<()>;

    fn binding(&self, owner_id: &str) -> LuachResult<Option<CalendarBinding>>;
    fn put_binding(&self, binding: &CalendarBinding) -> LuachResult<()>;
    fn clear_binding(&self, owner_id: &str) -> LuachResult<()>;
}
