//! Persisted rating rows and the scopes they belong to.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::reading::ReadingId;
use super::tier::Tier;

/// Wire label of the all-time scope.
pub const ALL_TIME_LABEL: &str = "all-time";

/// Which board a set of rating rows belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RatingScope {
    /// The board for one club year.
    Year(i32),
    /// The board spanning every year.
    AllTime,
}

impl RatingScope {
    /// Parse `"2024"` or `"all-time"`.
    pub fn from_str(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ALL_TIME_LABEL) {
            return Some(Self::AllTime);
        }
        trimmed.parse::<i32>().ok().map(Self::Year)
    }

    /// The year, for yearly scopes.
    pub fn year(&self) -> Option<i32> {
        match self {
            Self::Year(year) => Some(*year),
            Self::AllTime => None,
        }
    }
}

impl fmt::Display for RatingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{}", year),
            Self::AllTime => f.write_str(ALL_TIME_LABEL),
        }
    }
}

impl From<RatingScope> for String {
    fn from(scope: RatingScope) -> Self {
        scope.to_string()
    }
}

/// Error for an unparseable scope label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid rating scope: {0} (expected a year or \"all-time\")")]
pub struct InvalidScope(pub String);

impl TryFrom<String> for RatingScope {
    type Error = InvalidScope;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or(InvalidScope(value))
    }
}

/// One persisted placement: `reading_id` sits at `position` in `tier`.
///
/// `position` is the zero-based index at save time and carries no meaning
/// beyond sort order. Unrated readings never produce rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatingRow {
    /// The ranked reading.
    pub reading_id: ReadingId,
    /// Its tier.
    pub tier: Tier,
    /// Index within the tier.
    pub position: u32,
}

impl RatingRow {
    /// Create a row.
    pub fn new(reading_id: impl Into<ReadingId>, tier: Tier, position: u32) -> Self {
        Self {
            reading_id: reading_id.into(),
            tier,
            position,
        }
    }
}
