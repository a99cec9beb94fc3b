//! Board editing session.
//!
//! A session owns one board's model for as long as it is being edited. The
//! model is only ever replaced by the value returned from the reducer, and
//! the transient drag state (`dragging`, `hovered`) is visual feedback that
//! never feeds into a move.
//!
//! ## Save
//!
//! Saving flattens the board and hands the rows to the store for a full
//! replace of the scope. A failed save keeps the board as it is so the user
//! can retry. Moves are refused while a save is in flight.
//!
//! Two sessions for the same scope do not see each other; the last save to
//! complete wins.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::persistence::{fingerprint, flatten, initialize_with_report, IntegrityReport};
use crate::policy::{DragPolicy, FinishedReadings, ReadingClock};
use crate::reducer::{try_move, DropTarget, MoveRejection};
use crate::store::RatingStore;
use crate::types::{Book, BookId, Bucket, RatingRow, RatingScope, Reading, ReadingId, TierModel};

/// Error type for session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The store failed to load or save.
    #[error("Store error: {0}")]
    Store(String),
    /// `begin_save` was called while a save was pending.
    #[error("A save is already in progress")]
    SaveInProgress,
}

impl SessionError {
    /// Create a store error from any error type.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::Store(e.to_string())
    }
}

/// Result of a drop gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The board changed.
    Moved {
        /// Bucket the reading left.
        from: Bucket,
        /// Bucket it landed in.
        to: Bucket,
        /// Final index within `to`.
        index: usize,
    },
    /// The gesture was ignored; the board is unchanged.
    Ignored(MoveRejection),
}

impl MoveOutcome {
    /// Whether the board changed.
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Rows captured by [`BoardSession::begin_save`], waiting for the store.
#[derive(Debug, Clone)]
pub struct PendingSave {
    /// Board being saved.
    pub scope: RatingScope,
    /// Flattened board.
    pub rows: Vec<RatingRow>,
    fingerprint: String,
}

/// One user's editing session for one board.
pub struct BoardSession {
    scope: RatingScope,
    model: TierModel,
    readings: BTreeMap<ReadingId, Reading>,
    books: BTreeMap<BookId, Book>,
    policy: Arc<dyn DragPolicy>,
    integrity: IntegrityReport,
    saved_fingerprint: String,
    dragging: Option<ReadingId>,
    hovered: Option<Bucket>,
    saving: bool,
}

impl BoardSession {
    /// Build a session from already loaded data.
    ///
    /// `readings` is the board's universe in bench order.
    pub fn new(
        scope: RatingScope,
        readings: Vec<Reading>,
        books: Vec<Book>,
        saved: &[RatingRow],
        policy: Arc<dyn DragPolicy>,
    ) -> Self {
        let eligible: Vec<ReadingId> = readings.iter().map(|r| r.id.clone()).collect();
        let (model, integrity) = initialize_with_report(&eligible, saved);
        let saved_fingerprint = fingerprint(&model);

        Self {
            scope,
            model,
            readings: readings.into_iter().map(|r| (r.id.clone(), r)).collect(),
            books: books.into_iter().map(|b| (b.id.clone(), b)).collect(),
            policy,
            integrity,
            saved_fingerprint,
            dragging: None,
            hovered: None,
            saving: false,
        }
    }

    /// Load a board from the store, gating on finished readings.
    pub async fn open<S: RatingStore>(
        store: &S,
        scope: RatingScope,
        clock: ReadingClock,
    ) -> Result<Self, SessionError> {
        let readings = store.load_readings(scope).await.map_err(SessionError::from_store)?;
        let policy = Arc::new(FinishedReadings::new(&readings, clock));
        Self::open_with_readings(store, scope, readings, policy).await
    }

    /// Load a board from the store with a caller-supplied gate.
    pub async fn open_with_policy<S: RatingStore>(
        store: &S,
        scope: RatingScope,
        policy: Arc<dyn DragPolicy>,
    ) -> Result<Self, SessionError> {
        let readings = store.load_readings(scope).await.map_err(SessionError::from_store)?;
        Self::open_with_readings(store, scope, readings, policy).await
    }

    async fn open_with_readings<S: RatingStore>(
        store: &S,
        scope: RatingScope,
        readings: Vec<Reading>,
        policy: Arc<dyn DragPolicy>,
    ) -> Result<Self, SessionError> {
        let book_ids: Vec<BookId> = readings
            .iter()
            .map(|r| r.book_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let books = store.load_books(&book_ids).await.map_err(SessionError::from_store)?;
        let saved = store.load_ratings(scope).await.map_err(SessionError::from_store)?;

        let session = Self::new(scope, readings, books, &saved, policy);
        tracing::info!(
            scope = %scope,
            readings = session.model.len(),
            ranked = session.model.ranked_len(),
            dropped_rows = session.integrity.dropped.len(),
            "Opened board"
        );
        Ok(session)
    }

    /// Board scope.
    pub fn scope(&self) -> RatingScope {
        self.scope
    }

    /// Current board.
    pub fn model(&self) -> &TierModel {
        &self.model
    }

    /// Rows dropped when the board was loaded.
    pub fn integrity(&self) -> &IntegrityReport {
        &self.integrity
    }

    /// Look up a reading on this board.
    pub fn reading(&self, id: &ReadingId) -> Option<&Reading> {
        self.readings.get(id)
    }

    /// Look up a book for a card.
    pub fn book(&self, id: &BookId) -> Option<&Book> {
        self.books.get(id)
    }

    /// Reading being dragged, if any.
    pub fn dragging(&self) -> Option<&ReadingId> {
        self.dragging.as_ref()
    }

    /// Bucket under the pointer, if any.
    pub fn hovered(&self) -> Option<Bucket> {
        self.hovered
    }

    /// Whether a save is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Whether the gate allows moving `id`.
    pub fn can_drag(&self, id: &ReadingId) -> bool {
        self.policy.can_drag(id)
    }

    /// Whether the board would save different rows than were last loaded
    /// or saved.
    pub fn is_dirty(&self) -> bool {
        fingerprint(&self.model) != self.saved_fingerprint
    }

    /// Rows a save would write right now.
    pub fn rows(&self) -> Vec<RatingRow> {
        flatten(&self.model)
    }

    /// Pointer-down on a card. Locked or unknown readings do not start a drag.
    pub fn begin_drag(&mut self, id: &ReadingId) -> bool {
        if self.saving || !self.policy.can_drag(id) || !self.model.contains(id) {
            return false;
        }
        self.dragging = Some(id.clone());
        self.hovered = None;
        true
    }

    /// Pointer moved over a target, or off every target.
    pub fn hover(&mut self, target: Option<&DropTarget>) {
        if self.dragging.is_none() {
            return;
        }
        self.hovered = match target {
            Some(DropTarget::Container(bucket)) => Some(*bucket),
            Some(DropTarget::Item(id)) => self.model.locate(id),
            None => None,
        };
    }

    /// Abandon the current drag without moving anything.
    pub fn cancel_drag(&mut self) {
        self.dragging = None;
        self.hovered = None;
    }

    /// Release the current drag over `target`.
    pub fn end_drag(&mut self, target: Option<&DropTarget>) -> MoveOutcome {
        let active = self.dragging.take();
        self.hovered = None;

        match (active, target) {
            (None, _) => MoveOutcome::Ignored(MoveRejection::NotDragging),
            (Some(_), None) => MoveOutcome::Ignored(MoveRejection::NoTarget),
            (Some(active), Some(target)) => self.apply(&active, target),
        }
    }

    /// Apply a complete drag-end event.
    pub fn apply(&mut self, active: &ReadingId, target: &DropTarget) -> MoveOutcome {
        if self.saving {
            return MoveOutcome::Ignored(MoveRejection::Saving);
        }

        match try_move(&self.model, active, target, self.policy.as_ref()) {
            Ok(applied) => {
                tracing::debug!(
                    scope = %self.scope,
                    reading_id = %active,
                    from = %applied.from,
                    to = %applied.to,
                    index = applied.index,
                    "Moved reading"
                );
                self.model = applied.model;
                MoveOutcome::Moved {
                    from: applied.from,
                    to: applied.to,
                    index: applied.index,
                }
            }
            Err(rejection) => {
                tracing::trace!(
                    scope = %self.scope,
                    reading_id = %active,
                    target = %target,
                    reason = %rejection,
                    "Ignored drop"
                );
                MoveOutcome::Ignored(rejection)
            }
        }
    }

    /// Capture the rows to save and lock the board until [`finish_save`].
    ///
    /// [`finish_save`]: BoardSession::finish_save
    pub fn begin_save(&mut self) -> Result<PendingSave, SessionError> {
        if self.saving {
            return Err(SessionError::SaveInProgress);
        }
        self.saving = true;
        self.cancel_drag();

        Ok(PendingSave {
            scope: self.scope,
            rows: flatten(&self.model),
            fingerprint: fingerprint(&self.model),
        })
    }

    /// Record the store's answer for a pending save.
    ///
    /// On success the board becomes clean. On failure it is kept as is and
    /// the error is returned for display.
    pub fn finish_save(
        &mut self,
        pending: PendingSave,
        result: Result<(), SessionError>,
    ) -> Result<usize, SessionError> {
        self.saving = false;
        match result {
            Ok(()) => {
                self.saved_fingerprint = pending.fingerprint;
                tracing::info!(scope = %self.scope, rows = pending.rows.len(), "Saved board");
                Ok(pending.rows.len())
            }
            Err(e) => {
                tracing::error!(scope = %self.scope, error = %e, "Failed to save board; keeping edits");
                Err(e)
            }
        }
    }

    /// Flatten and fully replace the scope's rows in `store`.
    pub async fn save<S: RatingStore>(&mut self, store: &S) -> Result<usize, SessionError> {
        let pending = self.begin_save()?;
        let result = store
            .replace_ratings(pending.scope, &pending.rows)
            .await
            .map_err(SessionError::from_store);
        self.finish_save(pending, result)
    }
}

impl fmt::Debug for BoardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardSession")
            .field("scope", &self.scope)
            .field("model", &self.model)
            .field("dragging", &self.dragging)
            .field("hovered", &self.hovered)
            .field("saving", &self.saving)
            .finish_non_exhaustive()
    }
}
