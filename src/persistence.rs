//! Translation between the tier model and persisted rating rows.
//!
//! ## Round trip
//!
//! `initialize(eligible, &flatten(&model))` reproduces `model`'s tier
//! assignment and in-tier order. The bench is rebuilt from "not in any
//! row", so its order follows `eligible`, not the previous session.
//!
//! ## Orphaned rows
//!
//! Historical rows may reference readings that were since removed. Such rows
//! are dropped during initialization and reported in an [`IntegrityReport`];
//! they never fail the load.

use std::collections::HashSet;

use serde::Serialize;

use crate::canonical::canonical_hash_hex;
use crate::types::{Bucket, RatingRow, ReadingId, Tier, TierModel};

/// A saved row that was not placed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// The row's reading is not in the eligible set.
    #[error("Rating row references unknown reading {reading_id} (tier {tier})")]
    UnknownReading {
        /// Orphaned reading.
        reading_id: ReadingId,
        /// Tier the row claimed.
        tier: Tier,
    },
    /// The reading was already placed by an earlier row.
    #[error("Duplicate rating row for reading {reading_id} (tier {tier})")]
    DuplicateReading {
        /// Repeated reading.
        reading_id: ReadingId,
        /// Tier of the dropped duplicate.
        tier: Tier,
    },
}

/// Rows dropped while building a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Every dropped row, in tier then position order.
    pub dropped: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    /// Whether every saved row was placed.
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Build a board from the eligible readings and previously saved rows.
///
/// Orphaned rows are dropped; use [`initialize_with_report`] to see them.
pub fn initialize(eligible: &[ReadingId], saved: &[RatingRow]) -> TierModel {
    initialize_with_report(eligible, saved).0
}

/// Build a board and report which saved rows were dropped.
///
/// 1. Rows are grouped by tier and sorted by `position` (stable, so ties
///    keep store order).
/// 2. A row is placed only if its reading is eligible and not yet placed.
///    The first placement in S..F order wins.
/// 3. Every eligible reading not placed goes to the bench, in `eligible`
///    order.
pub fn initialize_with_report(
    eligible: &[ReadingId],
    saved: &[RatingRow],
) -> (TierModel, IntegrityReport) {
    let eligible_set: HashSet<&ReadingId> = eligible.iter().collect();
    let mut placed: HashSet<&ReadingId> = HashSet::with_capacity(saved.len());
    let mut model = TierModel::new();
    let mut report = IntegrityReport::default();

    for tier in Tier::ALL {
        let mut rows: Vec<&RatingRow> = saved.iter().filter(|r| r.tier == tier).collect();
        rows.sort_by_key(|r| r.position);

        let items = model.items_mut(Bucket::Ranked(tier));
        for row in rows {
            if !eligible_set.contains(&row.reading_id) {
                report.dropped.push(IntegrityIssue::UnknownReading {
                    reading_id: row.reading_id.clone(),
                    tier,
                });
            } else if !placed.insert(&row.reading_id) {
                report.dropped.push(IntegrityIssue::DuplicateReading {
                    reading_id: row.reading_id.clone(),
                    tier,
                });
            } else {
                items.push(row.reading_id.clone());
            }
        }
    }

    let bench = model.items_mut(Bucket::Unrated);
    for id in eligible {
        if placed.insert(id) {
            bench.push(id.clone());
        }
    }

    if !report.is_clean() {
        tracing::warn!(
            dropped = report.dropped.len(),
            saved = saved.len(),
            "Dropped orphaned rating rows while building board"
        );
        for issue in &report.dropped {
            tracing::debug!(issue = %issue, "Orphaned rating row");
        }
    }

    (model, report)
}

/// Flatten a board into rating rows.
///
/// Tiers are emitted S, A, B, C, D, F; each item gets its zero-based index.
/// The bench produces no rows.
pub fn flatten(model: &TierModel) -> Vec<RatingRow> {
    Tier::ALL
        .iter()
        .flat_map(|tier| {
            model
                .items(*tier)
                .iter()
                .enumerate()
                .map(move |(position, id)| RatingRow::new(id.clone(), *tier, position as u32))
        })
        .collect()
}

/// Fingerprint of a board's persisted form.
///
/// Two boards with the same fingerprint save identical rows, so bench
/// order does not affect it.
pub fn fingerprint(model: &TierModel) -> String {
    canonical_hash_hex(&flatten(model))
}
