//! The tier model: one ordered sequence of reading ids per bucket.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::reading::ReadingId;
use super::tier::Bucket;

/// Ordered reading ids for every bucket on a board.
///
/// ## Invariants
///
/// - Every eligible reading appears in exactly one bucket, once.
/// - Order within a bucket is the only ranking signal.
/// - [`Bucket::Unrated`] holds everything not placed in a tier.
///
/// The model is a plain value. Editing sessions own it and replace it with
/// the value returned by [`crate::reducer::apply_move`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierModel {
    buckets: [Vec<ReadingId>; Bucket::COUNT],
}

impl TierModel {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper that replaces one bucket's contents.
    pub fn with_bucket<I, T>(mut self, bucket: impl Into<Bucket>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ReadingId>,
    {
        self.buckets[bucket.into().index()] = items.into_iter().map(Into::into).collect();
        self
    }

    /// Items in a bucket, in rank order.
    pub fn items(&self, bucket: impl Into<Bucket>) -> &[ReadingId] {
        &self.buckets[bucket.into().index()]
    }

    pub(crate) fn items_mut(&mut self, bucket: Bucket) -> &mut Vec<ReadingId> {
        &mut self.buckets[bucket.index()]
    }

    /// Items on the bench.
    pub fn unrated(&self) -> &[ReadingId] {
        self.items(Bucket::Unrated)
    }

    /// Every bucket with its items, tiers first.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[ReadingId])> + '_ {
        Bucket::ALL
            .iter()
            .map(move |bucket| (*bucket, self.buckets[bucket.index()].as_slice()))
    }

    /// Which bucket holds `reading_id`.
    ///
    /// Scans buckets in [`Bucket::ALL`] order and returns the first hit.
    /// `None` means the item is not on the board; callers treat that as a
    /// no-op rather than an error.
    pub fn locate(&self, reading_id: &ReadingId) -> Option<Bucket> {
        self.position(reading_id).map(|(bucket, _)| bucket)
    }

    /// Bucket and index of `reading_id`.
    pub fn position(&self, reading_id: &ReadingId) -> Option<(Bucket, usize)> {
        Bucket::ALL.iter().find_map(|bucket| {
            self.buckets[bucket.index()]
                .iter()
                .position(|id| id == reading_id)
                .map(|index| (*bucket, index))
        })
    }

    /// Whether the reading is anywhere on the board.
    pub fn contains(&self, reading_id: &ReadingId) -> bool {
        self.position(reading_id).is_some()
    }

    /// Total number of items across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Whether the board has no items at all.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Number of items placed in ranked tiers.
    pub fn ranked_len(&self) -> usize {
        self.len() - self.unrated().len()
    }
}

impl Serialize for TierModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Bucket::COUNT))?;
        for (bucket, items) in self.iter() {
            map.serialize_entry(bucket.as_str(), items)?;
        }
        map.end()
    }
}
