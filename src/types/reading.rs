//! Reading and book types supplied by the club catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a reading (one book read in one period).
///
/// Identifiers come from the catalog and are treated as immutable keys.
/// Ordering is lexical and only used for deterministic tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingId(String);

impl ReadingId {
    /// Create a reading id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReadingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ReadingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque identifier of a catalog book.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Create a book id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BookId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A scheduled reading of a book within a club year.
///
/// Months are 1-based (January = 1). A reading spans
/// `start_month..=end_month` of `year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Stable identifier.
    pub id: ReadingId,
    /// The book being read.
    pub book_id: BookId,
    /// Club year the reading belongs to.
    pub year: i32,
    /// First month of the reading span.
    pub start_month: u32,
    /// Last month of the reading span.
    pub end_month: u32,
    /// Free-form notes from the organizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Reading {
    /// Create a reading without notes.
    pub fn new(
        id: impl Into<ReadingId>,
        book_id: impl Into<BookId>,
        year: i32,
        start_month: u32,
        end_month: u32,
    ) -> Self {
        Self {
            id: id.into(),
            book_id: book_id.into(),
            year,
            start_month,
            end_month,
            notes: None,
        }
    }

    /// Attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sort key used by every store: chronological, then id.
    pub(crate) fn schedule_key(&self) -> (i32, u32, u32, &ReadingId) {
        (self.year, self.start_month, self.end_month, &self.id)
    }
}

/// A catalog book, used only for rendering cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Stable identifier.
    pub id: BookId,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Public cover URL. Empty when no cover was uploaded.
    #[serde(default)]
    pub image_url: String,
    /// Optional blurb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Book {
    /// Create a book with no cover or description.
    pub fn new(id: impl Into<BookId>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            image_url: String::new(),
            description: None,
        }
    }

    /// Set the cover URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }
}
