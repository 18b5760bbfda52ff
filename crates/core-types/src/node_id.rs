use core::fmt;

use serde::{Deserialize, Serialize};

/// The identity of a replica, a small positive integer in `[1, n]`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new node id.
    ///
    /// Node ids are 1-based; 0 is never a valid replica identity.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Convert the node id to a `u32`.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// The zero-based index of this node, eg. for rotation arithmetic.
    pub const fn index(&self) -> u64 {
        (self.0 as u64).saturating_sub(1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
