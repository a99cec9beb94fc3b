//! Core types for the tier board.

pub mod reading;
pub mod tier;
pub mod board;
pub mod rating;

pub use reading::{ReadingId, BookId, Reading, Book};
pub use tier::{Tier, Bucket, UnknownBucket};
pub use board::TierModel;
pub use rating::{RatingRow, RatingScope, InvalidScope, ALL_TIME_LABEL};
