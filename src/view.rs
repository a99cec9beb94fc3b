//! Serializable snapshot of a board for rendering.

use serde::Serialize;

use crate::session::BoardSession;
use crate::types::{BookId, Bucket, RatingScope, ReadingId, Tier};

/// Cover shown when a book has no image.
pub const NO_COVER_URL: &str = "/no_cover_available.png";

/// Colour key for a bucket's row.
pub fn bucket_color(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::Ranked(Tier::S) => "red",
        Bucket::Ranked(Tier::A) => "orange",
        Bucket::Ranked(Tier::B) => "yellow",
        Bucket::Ranked(Tier::C) => "green",
        Bucket::Ranked(Tier::D) => "blue",
        Bucket::Ranked(Tier::F) => "gray",
        Bucket::Unrated => "muted",
    }
}

/// One card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Reading the card stands for.
    pub reading_id: ReadingId,
    /// Book read.
    pub book_id: BookId,
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
    /// Cover image, or [`NO_COVER_URL`].
    pub cover_url: String,
    /// Whether the card can't be dragged.
    pub locked: bool,
}

/// One bucket's row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRow {
    /// Bucket label (`"S"` .. `"F"`, `"UNRATED"`).
    pub label: Bucket,
    /// Colour key.
    pub color: &'static str,
    /// Cards in rank order.
    pub cards: Vec<Card>,
}

/// Everything a client needs to draw the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    /// Board scope.
    pub scope: RatingScope,
    /// Rows in display order, UNRATED last.
    pub rows: Vec<BucketRow>,
    /// Reading being dragged.
    pub dragging: Option<ReadingId>,
    /// Bucket under the pointer.
    pub hovered: Option<Bucket>,
    /// Unsaved edits exist.
    pub dirty: bool,
    /// A save is in flight.
    pub saving: bool,
}

impl BoardView {
    /// Render a session.
    ///
    /// Readings whose reading or book record is missing are not drawn.
    pub fn render(session: &BoardSession) -> Self {
        let rows = session
            .model()
            .iter()
            .map(|(bucket, items)| BucketRow {
                label: bucket,
                color: bucket_color(bucket),
                cards: items.iter().filter_map(|id| card(session, id)).collect(),
            })
            .collect();

        Self {
            scope: session.scope(),
            rows,
            dragging: session.dragging().cloned(),
            hovered: session.hovered(),
            dirty: session.is_dirty(),
            saving: session.is_saving(),
        }
    }

    /// Row for a bucket.
    pub fn row(&self, bucket: impl Into<Bucket>) -> Option<&BucketRow> {
        let bucket = bucket.into();
        self.rows.iter().find(|row| row.label == bucket)
    }
}

fn card(session: &BoardSession, id: &ReadingId) -> Option<Card> {
    let reading = session.reading(id)?;
    let book = session.book(&reading.book_id)?;
    let cover_url = if book.image_url.trim().is_empty() {
        NO_COVER_URL.to_string()
    } else {
        book.image_url.clone()
    };

    Some(Card {
        reading_id: id.clone(),
        book_id: book.id.clone(),
        title: book.title.clone(),
        author: book.author.clone(),
        cover_url,
        locked: !session.can_drag(id),
    })
}
