//! Drag/drop reducer.
//!
//! A pure state transition: given a board, the dragged reading and where it
//! was dropped, compute the next board. The input is never mutated.
//!
//! ## Drop semantics
//!
//! | Target | Same bucket | Other bucket |
//! |--------|-------------|--------------|
//! | `Container(b)` | no-op | remove, append to end of `b` |
//! | `Item(t)` | array-move to `t`'s index | remove, insert at `t`'s index |
//!
//! A bare container drop on the item's own bucket carries no ordering
//! information and leaves the board untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::policy::DragPolicy;
use crate::types::{Bucket, ReadingId, TierModel, UnknownBucket};

/// Prefix used by legacy drag ids to name a container (`"tier:S"`).
pub const CONTAINER_PREFIX: &str = "tier:";

/// Where a dragged reading was released.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DropTarget {
    /// Empty space inside a bucket.
    Container(Bucket),
    /// Another reading's card.
    Item(ReadingId),
}

impl DropTarget {
    /// Target a bucket.
    pub fn container(bucket: impl Into<Bucket>) -> Self {
        Self::Container(bucket.into())
    }

    /// Target a card.
    pub fn item(reading_id: impl Into<ReadingId>) -> Self {
        Self::Item(reading_id.into())
    }

    /// Resolve a raw drag id from a drag-and-drop frontend.
    ///
    /// `"tier:<LABEL>"` names a container; anything else is a reading id.
    pub fn parse(raw: &str) -> Result<Self, UnknownBucket> {
        match raw.strip_prefix(CONTAINER_PREFIX) {
            Some(label) => Bucket::from_str(label)
                .map(Self::Container)
                .ok_or_else(|| UnknownBucket(label.to_string())),
            None => Ok(Self::Item(ReadingId::new(raw))),
        }
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container(bucket) => write!(f, "{}{}", CONTAINER_PREFIX, bucket),
            Self::Item(id) => write!(f, "{}", id),
        }
    }
}

/// Why a gesture left the board unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    /// The eligibility gate refused the dragged reading.
    #[error("Reading is locked: {0}")]
    Locked(ReadingId),
    /// The dragged reading is not on the board.
    #[error("Reading not on board: {0}")]
    UnknownItem(ReadingId),
    /// The drop target card is not on the board.
    #[error("Drop target not on board: {0}")]
    UnknownTarget(ReadingId),
    /// The drop resolves to the reading's current place.
    #[error("Drop does not change the board")]
    Unchanged,
    /// Released outside any container.
    #[error("Drop had no target")]
    NoTarget,
    /// A drag ended without having started.
    #[error("No drag in progress")]
    NotDragging,
    /// The session is waiting for a save to finish.
    #[error("Board is saving")]
    Saving,
}

impl MoveRejection {
    /// Machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Locked(_) => "locked",
            Self::UnknownItem(_) => "unknown_item",
            Self::UnknownTarget(_) => "unknown_target",
            Self::Unchanged => "unchanged",
            Self::NoTarget => "no_target",
            Self::NotDragging => "not_dragging",
            Self::Saving => "saving",
        }
    }
}

/// A move that changed the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// The next board.
    pub model: TierModel,
    /// Bucket the reading left.
    pub from: Bucket,
    /// Bucket the reading landed in.
    pub to: Bucket,
    /// Final index within `to`.
    pub index: usize,
}

/// Apply a drop, returning the next board.
///
/// Rejected gestures return an unchanged clone of `model`. See [`try_move`]
/// for the reason.
pub fn apply_move<P>(
    model: &TierModel,
    active: &ReadingId,
    target: &DropTarget,
    policy: &P,
) -> TierModel
where
    P: DragPolicy + ?Sized,
{
    match try_move(model, active, target, policy) {
        Ok(applied) => applied.model,
        Err(_) => model.clone(),
    }
}

/// Apply a drop, reporting why it was ignored if nothing changed.
pub fn try_move<P>(
    model: &TierModel,
    active: &ReadingId,
    target: &DropTarget,
    policy: &P,
) -> Result<AppliedMove, MoveRejection>
where
    P: DragPolicy + ?Sized,
{
    if !policy.can_drag(active) {
        return Err(MoveRejection::Locked(active.clone()));
    }

    let (from, old_index) = model
        .position(active)
        .ok_or_else(|| MoveRejection::UnknownItem(active.clone()))?;

    match target {
        DropTarget::Container(to) => {
            if *to == from {
                return Err(MoveRejection::Unchanged);
            }
            let mut next = model.clone();
            next.items_mut(from).remove(old_index);
            let dest = next.items_mut(*to);
            dest.push(active.clone());
            let index = dest.len() - 1;
            Ok(AppliedMove { model: next, from, to: *to, index })
        }
        DropTarget::Item(over) => {
            let (to, over_index) = model
                .position(over)
                .ok_or_else(|| MoveRejection::UnknownTarget(over.clone()))?;

            let mut next = model.clone();
            if to == from {
                if old_index == over_index {
                    return Err(MoveRejection::Unchanged);
                }
                let items = next.items_mut(from);
                let moved = items.remove(old_index);
                items.insert(over_index, moved);
            } else {
                next.items_mut(from).remove(old_index);
                next.items_mut(to).insert(over_index, active.clone());
            }
            Ok(AppliedMove { model: next, from, to, index: over_index })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Unlocked;
    use crate::types::Tier;

    fn id(s: &str) -> ReadingId {
        ReadingId::new(s)
    }

    #[test]
    fn test_container_drop_appends() {
        let model = TierModel::new()
            .with_bucket(Tier::S, ["r0"])
            .with_bucket(Bucket::Unrated, ["r1", "r2", "r3"]);

        let applied = try_move(&model, &id("r2"), &DropTarget::container(Tier::S), &Unlocked).unwrap();

        assert_eq!(applied.model.items(Tier::S), &[id("r0"), id("r2")]);
        assert_eq!(applied.model.unrated(), &[id("r1"), id("r3")]);
        assert_eq!(applied.from, Bucket::Unrated);
        assert_eq!(applied.to, Bucket::Ranked(Tier::S));
        assert_eq!(applied.index, 1);
    }

    #[test]
    fn test_container_drop_on_own_bucket_is_noop() {
        let model = TierModel::new().with_bucket(Tier::A, ["r1", "r2"]);

        let result = try_move(&model, &id("r1"), &DropTarget::container(Tier::A), &Unlocked);
        assert_eq!(result, Err(MoveRejection::Unchanged));
        assert_eq!(apply_move(&model, &id("r1"), &DropTarget::container(Tier::A), &Unlocked), model);
    }

    #[test]
    fn test_same_bucket_reorder_forward_and_back() {
        let model = TierModel::new().with_bucket(Tier::B, ["r1", "r2", "r3", "r4"]);

        let forward = apply_move(&model, &id("r1"), &DropTarget::item("r3"), &Unlocked);
        assert_eq!(forward.items(Tier::B), &[id("r2"), id("r3"), id("r1"), id("r4")]);

        let back = apply_move(&model, &id("r4"), &DropTarget::item("r2"), &Unlocked);
        assert_eq!(back.items(Tier::B), &[id("r1"), id("r4"), id("r2"), id("r3")]);
    }

    #[test]
    fn test_drop_on_self_is_noop() {
        let model = TierModel::new().with_bucket(Tier::C, ["r1", "r2"]);
        let result = try_move(&model, &id("r2"), &DropTarget::item("r2"), &Unlocked);
        assert_eq!(result, Err(MoveRejection::Unchanged));
    }

    #[test]
    fn test_cross_bucket_inserts_before_target() {
        let model = TierModel::new()
            .with_bucket(Tier::S, ["r1"])
            .with_bucket(Tier::A, ["r2", "r3"]);

        let next = apply_move(&model, &id("r1"), &DropTarget::item("r3"), &Unlocked);
        assert!(next.items(Tier::S).is_empty());
        assert_eq!(next.items(Tier::A), &[id("r2"), id("r1"), id("r3")]);
    }

    #[test]
    fn test_other_buckets_untouched() {
        let model = TierModel::new()
            .with_bucket(Tier::S, ["r1"])
            .with_bucket(Tier::C, ["x1", "x2"])
            .with_bucket(Bucket::Unrated, ["r2"]);

        let next = apply_move(&model, &id("r2"), &DropTarget::item("r1"), &Unlocked);
        assert_eq!(next.items(Tier::C), model.items(Tier::C));
    }

    #[test]
    fn test_rejections() {
        let model = TierModel::new().with_bucket(Tier::S, ["r1"]);
        let locked = |r: &ReadingId| r.as_str() != "r1";

        assert_eq!(
            try_move(&model, &id("r1"), &DropTarget::container(Tier::A), &locked),
            Err(MoveRejection::Locked(id("r1")))
        );
        assert_eq!(
            try_move(&model, &id("ghost"), &DropTarget::container(Tier::A), &Unlocked),
            Err(MoveRejection::UnknownItem(id("ghost")))
        );
        assert_eq!(
            try_move(&model, &id("r1"), &DropTarget::item("ghost"), &Unlocked),
            Err(MoveRejection::UnknownTarget(id("ghost")))
        );
    }

    #[test]
    fn test_parse_legacy_drag_ids() {
        assert_eq!(DropTarget::parse("tier:S"), Ok(DropTarget::container(Tier::S)));
        assert_eq!(DropTarget::parse("tier:UNRATED"), Ok(DropTarget::Container(Bucket::Unrated)));
        assert_eq!(DropTarget::parse("9f1c"), Ok(DropTarget::item("9f1c")));
        assert_eq!(DropTarget::parse("tier:E"), Err(UnknownBucket("E".to_string())));
    }

    #[test]
    fn test_drop_target_json() {
        let json = serde_json::to_value(DropTarget::container(Tier::A)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "container", "id": "A"}));

        let parsed: DropTarget =
            serde_json::from_value(serde_json::json!({"kind": "item", "id": "r7"})).unwrap();
        assert_eq!(parsed, DropTarget::item("r7"));
    }
}
