//! The occurrence materialization and synchronization engine.
//!
//! Everything here works against the [`CalendarService`](crate::service::CalendarService)
//! and [`Store`](crate::store::Store) seams, with ambient state (owner,
//! access token, current Hebrew year) threaded in as explicit parameters.

mod materialize;
mod progression;
mod reconcile;
mod resolver;

pub use materialize::{MaterializeOutcome, MaterializedOccurrence, Materializer};
pub use progression::{ProgressionEngine, ProgressionStatus, SyncReport, UserProgressionSummary};
pub use reconcile::{DeleteReport, EventChanges, NewEvent, Reconciler, UpdateReport};
pub use resolver::BindingResolver;
