pub mod add;
pub mod check;
pub mod edit;
pub mod list;
pub mod occurrences;
pub mod remove;
pub mod sync;

use luach_core::hebrew;

/// The current Hebrew year, derived from the local date.
pub fn current_hebrew_year() -> i32 {
    hebrew::year_of(chrono::Local::now().date_naive())
}
