//! Tiers and buckets.
//!
//! A [`Tier`] is one of the six ranked buckets. A [`Bucket`] is any place an
//! item can sit on the board: a tier, or the unrated bench.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranked tier, best to worst.
///
/// Tiers carry no score. Rank is the tier plus the index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Top tier.
    S,
    /// Second tier.
    A,
    /// Third tier.
    B,
    /// Fourth tier.
    C,
    /// Fifth tier.
    D,
    /// Bottom tier.
    F,
}

impl Tier {
    /// Every tier in display and persistence order.
    pub const ALL: [Tier; 6] = [Tier::S, Tier::A, Tier::B, Tier::C, Tier::D, Tier::F];

    /// Storage label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Parse a storage label. Labels outside the fixed set yield `None`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Some(Self::S),
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "F" => Some(Self::F),
            _ => None,
        }
    }

    /// Position in [`Tier::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a bucket label outside `S..F` / `UNRATED`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown bucket label: {0}")]
pub struct UnknownBucket(pub String);

/// A container on the board: a ranked tier or the unrated bench.
///
/// Serialized as its label (`"S"` .. `"F"`, `"UNRATED"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Bucket {
    /// One of the ranked tiers.
    Ranked(Tier),
    /// The non-ranking bench.
    Unrated,
}

impl Bucket {
    /// Number of buckets on a board.
    pub const COUNT: usize = 7;

    /// Every bucket: tiers best to worst, then the bench.
    pub const ALL: [Bucket; Bucket::COUNT] = [
        Bucket::Ranked(Tier::S),
        Bucket::Ranked(Tier::A),
        Bucket::Ranked(Tier::B),
        Bucket::Ranked(Tier::C),
        Bucket::Ranked(Tier::D),
        Bucket::Ranked(Tier::F),
        Bucket::Unrated,
    ];

    /// Position in [`Bucket::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Self::Ranked(tier) => tier.index(),
            Self::Unrated => Tier::ALL.len(),
        }
    }

    /// The tier, if this bucket is ranked.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Ranked(tier) => Some(*tier),
            Self::Unrated => None,
        }
    }

    /// Whether items here produce rating rows.
    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::Ranked(_))
    }

    /// Wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ranked(tier) => tier.as_str(),
            Self::Unrated => "UNRATED",
        }
    }

    /// Parse a wire label.
    pub fn from_str(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("UNRATED") {
            return Some(Self::Unrated);
        }
        Tier::from_str(trimmed).map(Self::Ranked)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Tier> for Bucket {
    fn from(tier: Tier) -> Self {
        Self::Ranked(tier)
    }
}

impl From<Bucket> for String {
    fn from(bucket: Bucket) -> Self {
        bucket.as_str().to_string()
    }
}

impl TryFrom<String> for Bucket {
    type Error = UnknownBucket;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or(UnknownBucket(value))
    }
}
