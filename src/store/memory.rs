//! In-memory rating store for tests and demos.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::types::{Book, BookId, RatingRow, RatingScope, Reading, ReadingId};
use super::RatingStore;

/// Error type for the in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Writes were switched off with [`InMemoryRatingStore::fail_writes`].
    #[error("Store is rejecting writes")]
    WritesRejected,
}

#[derive(Debug, Default)]
struct Tables {
    readings: BTreeMap<ReadingId, Reading>,
    books: BTreeMap<BookId, Book>,
    ratings: BTreeMap<RatingScope, Vec<RatingRow>>,
}

/// In-memory rating store.
///
/// A single lock covers all tables, so a replace is atomic to readers.
/// Removing a reading also removes its rating rows in every scope.
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    tables: RwLock<Tables>,
    reject_writes: AtomicBool,
}

impl InMemoryRatingStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a book.
    pub fn add_book(&self, book: Book) {
        self.tables.write().books.insert(book.id.clone(), book);
    }

    /// Add or replace a reading.
    pub fn add_reading(&self, reading: Reading) {
        self.tables.write().readings.insert(reading.id.clone(), reading);
    }

    /// Remove a reading and every rating row that references it.
    pub fn remove_reading(&self, id: &ReadingId) -> Option<Reading> {
        let mut tables = self.tables.write();
        let removed = tables.readings.remove(id);
        for rows in tables.ratings.values_mut() {
            rows.retain(|row| &row.reading_id != id);
        }
        removed
    }

    /// Seed rows without going through the replace path.
    ///
    /// Rows are stored as given, including ones that reference unknown
    /// readings, so loaders can be tested against historical data.
    pub fn insert_ratings(&self, scope: RatingScope, rows: impl IntoIterator<Item = RatingRow>) {
        self.tables.write().ratings.entry(scope).or_default().extend(rows);
    }

    /// Make every subsequent write fail until switched back.
    pub fn fail_writes(&self, fail: bool) {
        self.reject_writes.store(fail, Ordering::SeqCst);
    }

    /// Rows currently stored for a scope.
    pub fn ratings(&self, scope: RatingScope) -> Vec<RatingRow> {
        self.tables.read().ratings.get(&scope).cloned().unwrap_or_default()
    }

    /// Number of readings.
    pub fn num_readings(&self) -> usize {
        self.tables.read().readings.len()
    }
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    type Error = InMemoryError;

    async fn list_years(&self) -> Result<Vec<i32>, Self::Error> {
        let years: BTreeSet<i32> = self.tables.read().readings.values().map(|r| r.year).collect();
        Ok(years.into_iter().rev().collect())
    }

    async fn load_readings(&self, scope: RatingScope) -> Result<Vec<Reading>, Self::Error> {
        let tables = self.tables.read();
        let mut readings: Vec<Reading> = tables
            .readings
            .values()
            .filter(|r| scope.year().map_or(true, |year| r.year == year))
            .cloned()
            .collect();
        readings.sort_by(|a, b| a.schedule_key().cmp(&b.schedule_key()));
        Ok(readings)
    }

    async fn load_books(&self, ids: &[BookId]) -> Result<Vec<Book>, Self::Error> {
        let tables = self.tables.read();
        Ok(ids.iter()
            .filter_map(|id| tables.books.get(id).cloned())
            .collect())
    }

    async fn load_ratings(&self, scope: RatingScope) -> Result<Vec<RatingRow>, Self::Error> {
        let mut rows = self.ratings(scope);
        rows.sort_by_key(|r| (r.tier, r.position));
        Ok(rows)
    }

    async fn replace_ratings(&self, scope: RatingScope, rows: &[RatingRow]) -> Result<(), Self::Error> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(InMemoryError::WritesRejected);
        }

        let mut tables = self.tables.write();
        let replaced = tables.ratings.insert(scope, rows.to_vec()).map_or(0, |old| old.len());

        tracing::debug!(
            scope = %scope,
            deleted = replaced,
            inserted = rows.len(),
            "Replaced rating rows"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tier;

    fn seeded() -> InMemoryRatingStore {
        let store = InMemoryRatingStore::new();
        store.add_book(Book::new("b1", "Hamlet", "William Shakespeare"));
        store.add_book(Book::new("b2", "East of Eden", "John Steinbeck"));
        store.add_reading(Reading::new("r2", "b2", 2022, 5, 5));
        store.add_reading(Reading::new("r1", "b1", 2022, 1, 1));
        store.add_reading(Reading::new("r3", "b1", 2023, 2, 3));
        store
    }

    #[tokio::test]
    async fn test_list_years_newest_first() {
        let store = seeded();
        assert_eq!(store.list_years().await.unwrap(), vec![2023, 2022]);
    }

    #[tokio::test]
    async fn test_load_readings_by_scope() {
        let store = seeded();

        let year: Vec<_> = store.load_readings(RatingScope::Year(2022)).await.unwrap()
            .into_iter().map(|r| r.id).collect();
        assert_eq!(year, vec![ReadingId::new("r1"), ReadingId::new("r2")]);

        let all = store.load_readings(RatingScope::AllTime).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].id, ReadingId::new("r3"));
    }

    #[tokio::test]
    async fn test_load_books_skips_unknown() {
        let store = seeded();
        let books = store.load_books(&[BookId::new("b2"), BookId::new("nope")]).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "East of Eden");
    }

    #[tokio::test]
    async fn test_replace_is_scoped() {
        let store = seeded();
        store.insert_ratings(RatingScope::AllTime, vec![RatingRow::new("r3", Tier::A, 0)]);

        store
            .replace_ratings(RatingScope::Year(2022), &[RatingRow::new("r1", Tier::S, 0)])
            .await
            .unwrap();
        store
            .replace_ratings(RatingScope::Year(2022), &[RatingRow::new("r2", Tier::B, 0)])
            .await
            .unwrap();

        assert_eq!(
            store.load_ratings(RatingScope::Year(2022)).await.unwrap(),
            vec![RatingRow::new("r2", Tier::B, 0)]
        );
        assert_eq!(store.ratings(RatingScope::AllTime).len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_rows() {
        let store = seeded();
        store.insert_ratings(RatingScope::Year(2022), vec![RatingRow::new("r1", Tier::S, 0)]);
        store.fail_writes(true);

        let result = store.replace_ratings(RatingScope::Year(2022), &[]).await;
        assert!(matches!(result, Err(InMemoryError::WritesRejected)));
        assert_eq!(store.ratings(RatingScope::Year(2022)).len(), 1);
    }

    #[test]
    fn test_remove_reading_cascades() {
        let store = seeded();
        store.insert_ratings(RatingScope::Year(2022), vec![
            RatingRow::new("r1", Tier::S, 0),
            RatingRow::new("r2", Tier::S, 1),
        ]);
        store.insert_ratings(RatingScope::AllTime, vec![RatingRow::new("r1", Tier::C, 0)]);

        assert!(store.remove_reading(&ReadingId::new("r1")).is_some());
        assert_eq!(store.ratings(RatingScope::Year(2022)), vec![RatingRow::new("r2", Tier::S, 1)]);
        assert!(store.ratings(RatingScope::AllTime).is_empty());
        assert_eq!(store.num_readings(), 2);
    }
}
