//! Rating storage backends.
//!
//! The store is the board's external collaborator: it supplies the universe
//! of readings for a scope and the previously saved rows, and it performs
//! the full replace on save.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use crate::types::{Book, BookId, RatingRow, RatingScope, Reading};

/// Trait for rating storage backends.
///
/// Implementations must return readings in schedule order (year, start
/// month, end month, id) so the bench is stable across loads.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Distinct club years that have readings, newest first.
    async fn list_years(&self) -> Result<Vec<i32>, Self::Error>;

    /// Readings belonging to a board: one year, or every year for all-time.
    async fn load_readings(&self, scope: RatingScope) -> Result<Vec<Reading>, Self::Error>;

    /// Books by id. Unknown ids are skipped.
    async fn load_books(&self, ids: &[BookId]) -> Result<Vec<Book>, Self::Error>;

    /// Saved rows for a board.
    async fn load_ratings(&self, scope: RatingScope) -> Result<Vec<RatingRow>, Self::Error>;

    /// Delete every row in `scope` and insert `rows`, atomically where the
    /// backend allows.
    async fn replace_ratings(&self, scope: RatingScope, rows: &[RatingRow]) -> Result<(), Self::Error>;

    /// Whether the backend is reachable.
    async fn is_healthy(&self) -> bool {
        true
    }
}

pub use memory::InMemoryRatingStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresRatingStore;
