use core::{cmp, fmt};

use serde::{Deserialize, Serialize};

/// A rank within a height.
///
/// Rank 0 belongs to the initial proposer of the height; higher ranks are
/// timeout-triggered fall-backs under the leader rotation.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(u32);

impl Rank {
    /// The initial rank of every height.
    pub const ZERO: Self = Self(0);

    /// Create a new rank.
    pub const fn new(rank: u32) -> Self {
        Self(rank)
    }

    /// Convert the rank to a `u32`.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Whether this is the initial rank of a height.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Increment the rank by one.
    pub fn increment(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank({})", self.0)
    }
}

impl From<u32> for Rank {
    fn from(rank: u32) -> Self {
        Self(rank)
    }
}

/// The rank field carried by a notarization share.
///
/// Can be either:
/// - `ShareRank::FastPath` (ie. `-1`), marking the first share a voter sends
///   at a height when that share is for a rank-0 block;
/// - `ShareRank::Rank(r)` with the rank copied from the block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShareRank {
    /// The fast-path sentinel, ie. `-1`.
    FastPath,

    /// A non-negative rank copied from the block voted for.
    Rank(Rank),
}

impl ShareRank {
    /// Whether this share counts towards the fast-path quorum.
    pub const fn is_fast_path(&self) -> bool {
        matches!(self, ShareRank::FastPath)
    }

    /// Convert the share rank to an `i64`.
    ///
    /// `ShareRank::FastPath` is converted to `-1`.
    pub const fn as_i64(&self) -> i64 {
        match self {
            ShareRank::FastPath => -1,
            ShareRank::Rank(r) => r.as_u32() as i64,
        }
    }

    /// The rank the share effectively votes at: fast-path shares vote at
    /// rank 0, all others at their carried rank.
    pub const fn effective_rank(&self) -> Rank {
        match self {
            ShareRank::FastPath => Rank::ZERO,
            ShareRank::Rank(r) => *r,
        }
    }
}

impl From<Rank> for ShareRank {
    fn from(rank: Rank) -> Self {
        ShareRank::Rank(rank)
    }
}

impl PartialOrd for ShareRank {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShareRank {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.as_i64().cmp(&other.as_i64())
    }
}

impl fmt::Display for ShareRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_i64().fmt(f)
    }
}
