//! Single-file JSON persistence.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::binding::CalendarBinding;
use crate::error::{LuachError, LuachResult};
use crate::event::{EventOccurrence, RecurringEvent};
use crate::store::Store;

/// All rows in one pretty-printed JSON document, rewritten atomically
/// (temp file + rename) after every mutation. Plenty for a per-user event
/// list; a relational store slots in behind the same trait.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: Mutex<Data>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Data {
    events: Vec<RecurringEvent>,
    occurrences: Vec<EventOccurrence>,
    bindings: Vec<CalendarBinding>,
}

impl JsonStore {
    /// Open the store at `path`, creating an empty one if the file does not
    /// exist yet.
    pub fn open(path: impl Into<PathBuf>) -> LuachResult<Self> {
        let path = path.into();
        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                LuachError::Storage(format!("failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&contents).map_err(|e| {
                LuachError::Storage(format!("failed to parse {}: {}", path.display(), e))
            })?
        } else {
            Data::default()
        };
        Ok(JsonStore {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> LuachResult<std::sync::MutexGuard<'_, Data>> {
        self.data
            .lock()
            .map_err(|_| LuachError::Storage("store mutex poisoned".into()))
    }

    /// Mutate under the lock, then persist the whole document.
    fn mutate<R>(&self, f: impl FnOnce(&mut Data) -> LuachResult<R>) -> LuachResult<R> {
        let mut data = self.lock()?;
        let result = f(&mut data)?;
        save(&self.path, &data)?;
        Ok(result)
    }
}

fn save(path: &Path, data: &Data) -> LuachResult<()> {
    let contents = serde_json::to_string_pretty(data)
        .map_err(|e| LuachError::Storage(format!("failed to serialize store: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            LuachError::Storage(format!("failed to create {}: {}", parent.display(), e))
        })?;
    }

    // Write to a temp file first, then rename (atomic on the same filesystem).
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, contents).map_err(|e| {
        LuachError::Storage(format!("failed to write {}: {}", temp_path.display(), e))
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| {
        LuachError::Storage(format!("failed to rename into {}: {}", path.display(), e))
    })?;

    Ok(())
}

impl Store for JsonStore {
    fn event(&self, event_id: &str) -> LuachResult<Option<RecurringEvent>> {
        Ok(self
            .lock()?
            .events
            .iter()
            .find(|e| e.id == event_id)
            .cloned())
    }

    fn events_for_owner(&self, owner_id: &str) -> LuachResult<Vec<RecurringEvent>> {
        Ok(self
            .lock()?
            .events
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn insert_event(&self, event: &RecurringEvent) -> LuachResult<()> {
        self.mutate(|data| {
            if data.events.iter().any(|e| e.id == event.id) {
                return Err(LuachError::Conflict(format!(
                    "event {} already exists",
                    event.id
                )));
            }
            data.events.push(event.clone());
            Ok(())
        })
    }

    fn update_event(&self, event: &RecurringEvent) -> LuachResult<()> {
        self.mutate(|data| {
            let slot = data
                .events
                .iter_mut()
                .find(|e| e.id == event.id)
                .ok_or_else(|| LuachError::NotFound(format!("event {}", event.id)))?;
            *slot = event.clone();
            Ok(())
        })
    }

    fn delete_event(&self, event_id: &str) -> LuachResult<()> {
        self.mutate(|data| {
            data.events.retain(|e| e.id != event_id);
            Ok(())
        })
    }

    fn occurrences_for_event(&self, event_id: &str) -> LuachResult<Vec<EventOccurrence>> {
        let data = self.lock()?;
        let mut occurrences: Vec<EventOccurrence> = data
            .occurrences
            .iter()
            .filter(|o| o.event_id == event_id)
            .cloned()
            .collect();
        occurrences.sort_by_key(|o| o.year);
        Ok(occurrences)
    }

    fn insert_occurrence(&self, occurrence: &EventOccurrence) -> LuachResult<()> {
        self.mutate(|data| {
            if data
                .occurrences
                .iter()
                .any(|o| o.event_id == occurrence.event_id && o.year == occurrence.year)
            {
                return Err(LuachError::Conflict(format!(
                    "occurrence for event {} year {} already exists",
                    occurrence.event_id, occurrence.year
                )));
            }
            data.occurrences.push(occurrence.clone());
            Ok(())
        })
    }

    fn delete_occurrences_for_event(&self, event_id: &str) -> LuachResult<()> {
        self.mutate(|data| {
            data.occurrences.retain(|o| o.event_id != event_id);
            Ok(())
        })
    }

    fn binding(&self, owner_id: &str) -> LuachResult<Option<CalendarBinding>> {
        Ok(self
            .lock()?
            .bindings
            .iter()
            .find(|b| b.owner_id == owner_id)
            .cloned())
    }

    fn put_binding(&self, binding: &CalendarBinding) -> LuachResult<()> {
        self.mutate(|data| {
            data.bindings.retain(|b| b.owner_id != binding.owner_id);
            data.bindings.push(binding.clone());
            Ok(())
        })
    }

    fn clear_binding(&self, owner_id: &str) -> LuachResult<()> {
        self.mutate(|data| {
            data.bindings.retain(|b| b.owner_id != owner_id);
            Ok(())
        })
    }
}
