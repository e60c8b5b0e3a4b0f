//! Sync window policy.
//!
//! Computes the inclusive range of Hebrew years that should have a
//! materialized occurrence. Both the progression check and the progression
//! sync derive the window through this one function, so they always agree.

use serde::{Deserialize, Serialize};

/// How many years of buffer the window keeps around "now" (or around a
/// future anchor).
pub const WINDOW_BUFFER_YEARS: i32 = 10;

/// A closed interval of Hebrew years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWindow {
    pub start: i32,
    pub end: i32,
}

impl SyncWindow {
    /// Iterate the years of the window, inclusive on both ends.
    pub fn years(self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    pub fn contains(self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

/// The window of years to materialize for an anchor year, given the current
/// Hebrew year.
///
/// Anchors more than `WINDOW_BUFFER_YEARS` in the past only keep a trailing
/// buffer around now (decades of past occurrences are never backfilled);
/// recent and current anchors cover everything from the anchor onward; a
/// future anchor gets its forward buffer from its own first year rather
/// than from now.
pub fn sync_window(anchor_year: i32, current_year: i32) -> SyncWindow {
    if anchor_year < current_year - WINDOW_BUFFER_YEARS {
        SyncWindow {
            start: current_year - WINDOW_BUFFER_YEARS,
            end: current_year + WINDOW_BUFFER_YEARS,
        }
    } else if anchor_year <= current_year {
        SyncWindow {
            start: anchor_year,
            end: current_year + WINDOW_BUFFER_YEARS,
        }
    } else {
        SyncWindow {
            start: anchor_year,
            end: anchor_year + WINDOW_BUFFER_YEARS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distant_past_anchor_keeps_a_fixed_buffer() {
        let window = sync_window(5700, 5784);
        assert_eq!(window, SyncWindow { start: 5774, end: 5794 });
    }

    #[test]
    fn recent_anchor_starts_at_the_anchor() {
        let window = sync_window(5780, 5784);
        assert_eq!(window, SyncWindow { start: 5780, end: 5794 });

        // Anchor equal to the current year behaves the same way.
        let window = sync_window(5784, 5784);
        assert_eq!(window, SyncWindow { start: 5784, end: 5794 });
    }

    #[test]
    fn future_anchor_buffers_from_itself() {
        let window = sync_window(5790, 5784);
        assert_eq!(window, SyncWindow { start: 5790, end: 5800 });
    }

    #[test]
    fn distant_past_boundary_is_strict() {
        // At exactly ten years back the window is [current - 10, current + 10]
        // either way; one year to each side tells the branches apart.
        let window = sync_window(5774, 5784);
        assert_eq!(window, SyncWindow { start: 5774, end: 5794 });

        let window = sync_window(5773, 5784);
        assert_eq!(window, SyncWindow { start: 5774, end: 5794 });

        let window = sync_window(5775, 5784);
        assert_eq!(window, SyncWindow { start: 5775, end: 5794 });
    }

    #[test]
    fn years_iterates_inclusively() {
        let years: Vec<i32> = SyncWindow { start: 5770, end: 5780 }.years().collect();
        assert_eq!(years.len(), 11);
        assert_eq!(years.first(), Some(&5770));
        assert_eq!(years.last(), Some(&5780));
    }
}
