//! Core types and the sync engine for the luach ecosystem.
//!
//! This crate provides everything the shells build on:
//! - `hebrew` for Hebrew-calendar dates and Gregorian conversion
//! - `event`/`binding` domain rows and the `store` persistence seam
//! - `window` for the year-window policy
//! - `service` for the external calendar seam and `retry` for the
//!   failure-classifying executor wrapped around it
//! - `sync` for binding resolution, occurrence materialization, year
//!   progression and reconciliation
//! - `api` for the boundary envelopes

pub mod api;
pub mod binding;
pub mod error;
pub mod event;
pub mod hebrew;
pub mod retry;
pub mod service;
pub mod store;
pub mod sync;
pub mod window;

#[cfg(test)]
mod testutil;

pub use api::ApiResponse;
pub use binding::CalendarBinding;
pub use error::{ErrorKind, LuachError, LuachResult};
pub use event::{EventOccurrence, Recurrence, RecurringEvent};
pub use hebrew::{HebrewDate, HebrewMonth};
pub use retry::RetryPolicy;
pub use service::{
    APP_CALENDAR_NAME, CalendarService, EventPatch, EventPayload, RemoteCalendar, ServiceError,
};
pub use store::{JsonStore, MemoryStore, Store};
pub use sync::{
    BindingResolver, DeleteReport, EventChanges, Materializer, NewEvent, ProgressionEngine,
    ProgressionStatus, Reconciler, SyncReport, UpdateReport, UserProgressionSummary,
};
pub use window::{SyncWindow, sync_window};
