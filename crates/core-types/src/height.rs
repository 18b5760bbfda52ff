use core::fmt;

use serde::{Deserialize, Serialize};

/// A chain height.
///
/// Height 0 is reserved for the genesis sentinel; the first proposed block
/// has height 1.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Height(u64);

impl Height {
    /// The genesis height.
    pub const ZERO: Self = Self(0);

    /// The height of the first proposed block.
    pub const INITIAL: Self = Self(1);

    /// Create a new height.
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    /// Convert the height to a `u64`.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Increment the height by one.
    pub fn increment(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Decrement the height by one, or `None` at genesis.
    pub fn decrement(&self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Height({})", self.0)
    }
}

impl From<u64> for Height {
    fn from(height: u64) -> Self {
        Self(height)
    }
}
