//! In-memory store.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::binding::CalendarBinding;
use crate::error::{LuachError, LuachResult};
use crate::event::{EventOccurrence, RecurringEvent};
use crate::store::Store;

/// Mutex-guarded maps. Used by tests and by embedders that handle their own
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    events: HashMap<String, RecurringEvent>,
    occurrences: Vec<EventOccurrence>,
    bindings: HashMap<String, CalendarBinding>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn lock(&self) -> LuachResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| LuachError::Storage("store mutex poisoned".into()))
    }
}

impl Store for MemoryStore {
    fn event(&self, event_id: &str) -> LuachResult<Option<RecurringEvent>> {
        Ok(self.lock()?.events.get(event_id).cloned())
    }

    fn events_for_owner(&self, owner_id: &str) -> LuachResult<Vec<RecurringEvent>> {
        let inner = self.lock()?;
        let mut events: Vec<RecurringEvent> = inner
            .events
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(events)
    }

    fn insert_event(&self, event: &RecurringEvent) -> LuachResult<()> {
        let mut inner = self.lock()?;
        if inner.events.contains_key(&event.id) {
            return Err(LuachError::Conflict(format!(
                "event {} already exists",
                event.id
            )));
        }
        inner.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    fn update_event(&self, event: &RecurringEvent) -> LuachResult<()> {
        let mut inner = self.lock()?;
        if !inner.events.contains_key(&event.id) {
            return Err(LuachError::NotFound(format!("event {}", event.id)));
        }
        inner.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    fn delete_event(&self, event_id: &str) -> LuachResult<()> {
        self.lock()?.events.remove(event_id);
        Ok(())
    }

    fn occurrences_for_event(&self, event_id: &str) -> LuachResult<Vec<EventOccurrence>> {
        let inner = self.lock()?;
        let mut occurrences: Vec<EventOccurrence> = inner
            .occurrences
            .iter()
            .filter(|o| o.event_id == event_id)
            .cloned()
            .collect();
        occurrences.sort_by_key(|o| o.year);
        Ok(occurrences)
    }

    fn insert_occurrence(&self, occurrence: &EventOccurrence) -> LuachResult<()> {
        let mut inner = self.lock()?;
        if inner
            .occurrences
            .iter()
            .any(|o| o.event_id == occurrence.event_id && o.year == occurrence.year)
        {
            return Err(LuachError::Conflict(format!(
                "occurrence for event {} year {} already exists",
                occurrence.event_id, occurrence.year
            )));
        }
        inner.occurrences.push(occurrence.clone());
        Ok(())
    }

    fn delete_occurrences_for_event(&self, event_id: &str) -> LuachResult<()> {
        self.lock()?.occurrences.retain(|o| o.event_id != event_id);
        Ok(())
    }

    fn binding(&self, owner_id: &str) -> LuachResult<Option<CalendarBinding>> {
        Ok(self.lock()?.bindings.get(owner_id).cloned())
    }

    fn put_binding(&self, binding: &CalendarBinding) -> LuachResult<()> {
        self.lock()?
            .bindings
            .insert(binding.owner_id.clone(), binding.clone());
        Ok(())
    }

    fn clear_binding(&self, owner_id: &str) -> LuachResult<()> {
        self.lock()?.bindings.remove(owner_id);
        Ok(())
    }
}
