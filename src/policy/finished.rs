//! "Finished readings only" gate.
//!
//! A reading is finished once its span has ended before the current month:
//!
//! - earlier club years are always finished
//! - later club years never are
//! - in the current year, `end_month < current_month`

use std::collections::HashSet;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::types::{Reading, ReadingId};
use super::DragPolicy;

/// The "current period" a finished check is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingClock {
    /// Current calendar year.
    pub year: i32,
    /// Current month, 1-based.
    pub month: u32,
}

impl ReadingClock {
    /// Fixed clock, mainly for tests.
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Clock at the local wall-clock month.
    pub fn now() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Whether `reading` has ended before this period.
    pub fn is_finished(&self, reading: &Reading) -> bool {
        if reading.year != self.year {
            return reading.year < self.year;
        }
        reading.end_month < self.month
    }
}

impl Default for ReadingClock {
    fn default() -> Self {
        Self::now()
    }
}

/// Allows dragging only readings that were finished when the gate was built.
///
/// Unknown ids are locked.
#[derive(Debug, Clone, Default)]
pub struct FinishedReadings {
    finished: HashSet<ReadingId>,
}

impl FinishedReadings {
    /// Evaluate every reading against `clock` once.
    pub fn new<'a>(readings: impl IntoIterator<Item = &'a Reading>, clock: ReadingClock) -> Self {
        let finished = readings
            .into_iter()
            .filter(|r| clock.is_finished(r))
            .map(|r| r.id.clone())
            .collect();
        Self { finished }
    }

    /// Number of draggable readings.
    pub fn len(&self) -> usize {
        self.finished.len()
    }

    /// Whether nothing is draggable.
    pub fn is_empty(&self) -> bool {
        self.finished.is_empty()
    }
}

impl DragPolicy for FinishedReadings {
    fn can_drag(&self, reading_id: &ReadingId) -> bool {
        self.finished.contains(reading_id)
    }
}
