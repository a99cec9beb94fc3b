//! # tier-board
//!
//! Tier-ranking boards for a reading club.
//!
//! Members rank the books they read by dragging cards between seven buckets:
//! the tiers S, A, B, C, D, F and an UNRATED bench. One board exists per club
//! year plus one all-time board.
//!
//! ## Core Contract
//!
//! 1. Every reading on a board sits in exactly one bucket, exactly once
//! 2. A drop is a pure transition `(model, active, target) -> model`
//! 3. Saving fully replaces a board's rows; the bench is never persisted
//!
//! ## Architecture
//!
//! ```text
//! RatingStore ──load──► initialize ──► TierModel ◄──► apply_move (DragPolicy)
//!      ▲                                  │
//!      └────────replace_ratings◄── flatten┘
//! ```
//!
//! [`BoardSession`] ties these together for one editing session and
//! [`BoardView`] renders it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod reducer;
pub mod persistence;
pub mod canonical;
pub mod store;
pub mod session;
pub mod view;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    Book, BookId, Bucket, RatingRow, RatingScope, Reading, ReadingId, Tier, TierModel,
    InvalidScope, UnknownBucket, ALL_TIME_LABEL,
};
pub use policy::{DragPolicy, FinishedReadings, ReadingClock, Unlocked};
pub use reducer::{apply_move, try_move, AppliedMove, DropTarget, MoveRejection, CONTAINER_PREFIX};
pub use persistence::{
    fingerprint, flatten, initialize, initialize_with_report, IntegrityIssue, IntegrityReport,
};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use store::{InMemoryRatingStore, RatingStore};
#[cfg(feature = "postgres")]
pub use store::PostgresRatingStore;
pub use session::{BoardSession, MoveOutcome, PendingSave, SessionError};
pub use view::{BoardView, BucketRow, Card, NO_COVER_URL};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState, SessionConfig};

/// Schema version for the persisted rating rows and wire types.
/// Increment on breaking changes to any schema type.
pub const TIER_BOARD_SCHEMA_VERSION: &str = "1.0.0";
