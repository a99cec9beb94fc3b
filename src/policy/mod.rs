//! Eligibility gates: which readings may be dragged right now.
//!
//! The reducer consults a [`DragPolicy`] before any mutation. Eligibility
//! only gates future moves. A reading that is already in a tier and later
//! becomes ineligible stays where it is.

pub mod finished;

pub use finished::{FinishedReadings, ReadingClock};

use crate::types::ReadingId;

/// Decides whether a reading may start or complete a drag.
pub trait DragPolicy: Send + Sync {
    /// `true` if `reading_id` may be moved.
    fn can_drag(&self, reading_id: &ReadingId) -> bool;
}

impl<F> DragPolicy for F
where
    F: Fn(&ReadingId) -> bool + Send + Sync,
{
    fn can_drag(&self, reading_id: &ReadingId) -> bool {
        self(reading_id)
    }
}

/// Every reading is draggable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlocked;

impl DragPolicy for Unlocked {
    fn can_drag(&self, _reading_id: &ReadingId) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_policy() {
        let policy = |id: &ReadingId| id.as_str() != "r9";
        assert!(policy.can_drag(&ReadingId::new("r1")));
        assert!(!policy.can_drag(&ReadingId::new("r9")));
    }

    #[test]
    fn test_unlocked_allows_everything() {
        assert!(Unlocked.can_drag(&ReadingId::new("anything")));
    }
}
