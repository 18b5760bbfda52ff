use core::fmt;
use std::time::SystemTime;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::{Height, NodeId, PrivateKey, Rank, Signature};

/// A 32-byte content hash identifying a block.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(
    #[serde(
        serialize_with = "hex::serde::serialize",
        deserialize_with = "hex::serde::deserialize"
    )]
    [u8; Self::LENGTH],
);

impl BlockId {
    const LENGTH: usize = 32;

    /// Wrap a raw 32-byte hash.
    pub const fn new(value: [u8; Self::LENGTH]) -> Self {
        Self(value)
    }

    /// The Keccak-256 hash of the given bytes.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// The genesis sentinel, `hash("genesis")`, parent of the first block.
    pub fn genesis() -> Self {
        Self::hash(b"genesis")
    }

    /// The identifier as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({self})")
    }
}

/// A proposal for a single `(height, rank)` slot.
///
/// The identifier covers `(height, rank, proposer, prev_id, hash(payload))`
/// and both it and the proposer signature are fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The height this block is proposed at.
    pub height: Height,

    /// The rank of the proposal attempt within its height.
    pub rank: Rank,

    /// The replica that proposed this block.
    pub proposer: NodeId,

    /// The identifier of the parent block.
    pub prev_id: BlockId,

    /// Opaque payload bytes.
    pub payload: Bytes,

    /// The proposer's signature over the block identifier.
    pub signature: Signature,

    /// The content identifier of this block.
    pub id: BlockId,

    /// Origination time, stamped by the proposer.
    pub timestamp: SystemTime,
}

impl Block {
    /// Build and sign a new block.
    pub fn new(
        height: Height,
        rank: Rank,
        proposer: NodeId,
        prev_id: BlockId,
        payload: Bytes,
        key: &PrivateKey,
    ) -> Self {
        let id = Self::compute_id(height, rank, proposer, &prev_id, &payload);
        let signature = key.sign(id.as_bytes());

        Self {
            height,
            rank,
            proposer,
            prev_id,
            payload,
            signature,
            id,
            timestamp: SystemTime::now(),
        }
    }

    /// The content identifier of a block with the given fields:
    /// `hash(height, rank, proposer, prev_id, hash(payload))`.
    pub fn compute_id(
        height: Height,
        rank: Rank,
        proposer: NodeId,
        prev_id: &BlockId,
        payload: &[u8],
    ) -> BlockId {
        let payload_hash = BlockId::hash(payload);

        let mut hasher = Keccak256::new();
        hasher.update(height.as_u64().to_be_bytes());
        hasher.update(rank.as_u32().to_be_bytes());
        hasher.update(proposer.as_u32().to_be_bytes());
        hasher.update(prev_id.as_bytes());
        hasher.update(payload_hash.as_bytes());
        BlockId::new(hasher.finalize().into())
    }
}
