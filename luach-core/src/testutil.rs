//! Scripted in-memory calendar service for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::service::{
    CalendarService, EventPatch, EventPayload, RemoteCalendar, ServiceError,
};

/// A fake external calendar service. Calendars and events live in memory;
/// failures are scripted per operation so tests can simulate rate limits,
/// expired tokens and externally deleted calendars.
#[derive(Default)]
pub struct FakeService {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    calendars: Vec<RemoteCalendar>,
    events: HashMap<String, Vec<StoredEvent>>,
    seq: u32,
    calls: u32,
    insert_calls: u32,
    fail_inserts_at: HashSet<u32>,
    fail_list: Option<(u16, u32)>,
    fail_create: Option<(u16, u32)>,
    fail_patch: Option<(u16, u32)>,
    fail_delete: Option<(u16, u32)>,
}

#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub id: String,
    pub payload: EventPayload,
}

impl FakeService {
    pub fn new() -> Self {
        FakeService::default()
    }

    pub fn add_calendar(&self, id: &str, summary: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.calendars.push(RemoteCalendar {
            id: id.to_string(),
            summary: summary.to_string(),
        });
        inner.events.entry(id.to_string()).or_default();
    }

    /// Simulate external deletion of a calendar (and everything in it).
    pub fn remove_calendar(&self, id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.calendars.retain(|c| c.id != id);
        inner.events.remove(id);
    }

    /// Total service calls made so far.
    pub fn calls(&self) -> u32 {
        self.inner.lock().unwrap().calls
    }

    pub fn calendar_summary(&self, id: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .calendars
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.summary.clone())
    }

    pub fn events_in(&self, calendar_id: &str) -> Vec<StoredEvent> {
        let inner = self.inner.lock().unwrap();
        inner.events.get(calendar_id).cloned().unwrap_or_default()
    }

    /// Fail insert calls with the given 1-based indices (status 503).
    pub fn fail_inserts_at(&self, indices: &[u32]) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_inserts_at = indices.iter().copied().collect();
    }

    pub fn fail_next_list_calendars(&self, status: u16, count: u32) {
        self.inner.lock().unwrap().fail_list = Some((status, count));
    }

    pub fn fail_next_create_calendar(&self, status: u16, count: u32) {
        self.inner.lock().unwrap().fail_create = Some((status, count));
    }

    pub fn fail_next_patch(&self, status: u16, count: u32) {
        self.inner.lock().unwrap().fail_patch = Some((status, count));
    }

    pub fn fail_next_delete(&self, status: u16, count: u32) {
        self.inner.lock().unwrap().fail_delete = Some((status, count));
    }
}

fn take_failure(slot: &mut Option<(u16, u32)>) -> Option<ServiceError> {
    match slot.take() {
        Some((status, remaining)) if remaining > 0 => {
            if remaining > 1 {
                *slot = Some((status, remaining - 1));
            }
            Some(ServiceError::http(
                status,
                format!("scripted failure ({})", status),
            ))
        }
        other => {
            *slot = other;
            None
        }
    }
}

impl CalendarService for FakeService {
    async fn list_calendars(&self, _token: &str) -> Result<Vec<RemoteCalendar>, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        if let Some(err) = take_failure(&mut inner.fail_list) {
            return Err(err);
        }
        Ok(inner.calendars.clone())
    }

    async fn create_calendar(&self, _token: &str, summary: &str) -> Result<String, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        if let Some(err) = take_failure(&mut inner.fail_create) {
            return Err(err);
        }
        inner.seq += 1;
        let id = format!("cal-{}", inner.seq);
        inner.calendars.push(RemoteCalendar {
            id: id.clone(),
            summary: summary.to_string(),
        });
        inner.events.entry(id.clone()).or_default();
        Ok(id)
    }

    async fn calendar_exists(
        &self,
        _token: &str,
        calendar_id: &str,
    ) -> Result<bool, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        Ok(inner.calendars.iter().any(|c| c.id == calendar_id))
    }

    async fn insert_event(
        &self,
        _token: &str,
        calendar_id: &str,
        payload: &EventPayload,
    ) -> Result<String, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        inner.insert_calls += 1;
        if inner.fail_inserts_at.contains(&inner.insert_calls) {
            return Err(ServiceError::http(503, "scripted insert failure"));
        }
        if !inner.calendars.iter().any(|c| c.id == calendar_id) {
            return Err(ServiceError::http(404, "calendar not found"));
        }
        inner.seq += 1;
        let id = format!("remote-{}", inner.seq);
        inner
            .events
            .entry(calendar_id.to_string())
            .or_default()
            .push(StoredEvent {
                id: id.clone(),
                payload: payload.clone(),
            });
        Ok(id)
    }

    async fn patch_event(
        &self,
        _token: &str,
        calendar_id: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        if let Some(err) = take_failure(&mut inner.fail_patch) {
            return Err(err);
        }
        if !inner.calendars.iter().any(|c| c.id == calendar_id) {
            return Err(ServiceError::http(404, "calendar not found"));
        }
        let stored = inner
            .events
            .get_mut(calendar_id)
            .and_then(|events| events.iter_mut().find(|e| e.id == event_id))
            .ok_or_else(|| ServiceError::http(404, "event not found"))?;
        if let Some(summary) = &patch.summary {
            stored.payload.summary = summary.clone();
        }
        if let Some(description) = &patch.description {
            stored.payload.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        Ok(())
    }

    async fn delete_event(
        &self,
        _token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        if let Some(err) = take_failure(&mut inner.fail_delete) {
            return Err(err);
        }
        let Some(events) = inner.events.get_mut(calendar_id) else {
            return Err(ServiceError::http(404, "calendar not found"));
        };
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(ServiceError::http(404, "event not found"));
        }
        Ok(())
    }
}
