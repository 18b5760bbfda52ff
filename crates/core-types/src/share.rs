use serde::{Deserialize, Serialize};

use crate::{BlockId, Height, NodeId, PrivateKey, Rank, ShareRank, Signature};

/// A single replica's signed contribution towards notarizing a block.
///
/// A voter issues at most one share per `(height, block_id)`, but may issue
/// shares for different blocks at the same height when the rank rule allows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotarizationShare {
    /// The height of the block voted for.
    pub height: Height,

    /// The rank field: either the block's rank, or the fast-path sentinel.
    pub rank: ShareRank,

    /// The replica that issued the share.
    pub voter: NodeId,

    /// The identifier of the block voted for.
    pub block_id: BlockId,

    /// The voter's signature over the block identifier.
    pub signature: Signature,
}

impl NotarizationShare {
    /// Build and sign a notarization share.
    pub fn sign(
        height: Height,
        rank: ShareRank,
        voter: NodeId,
        block_id: BlockId,
        key: &PrivateKey,
    ) -> Self {
        let signature = key.sign(block_id.as_bytes());
        Self {
            height,
            rank,
            voter,
            block_id,
            signature,
        }
    }
}

/// A single replica's signed contribution towards finalizing a block.
///
/// A voter issues at most one finalization share per height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationShare {
    /// The height of the block voted for.
    pub height: Height,

    /// The rank of the block voted for.
    pub rank: Rank,

    /// The replica that issued the share.
    pub voter: NodeId,

    /// The identifier of the block voted for.
    pub block_id: BlockId,

    /// The voter's signature over the block identifier.
    pub signature: Signature,
}

impl FinalizationShare {
    /// Build and sign a finalization share.
    pub fn sign(
        height: Height,
        rank: Rank,
        voter: NodeId,
        block_id: BlockId,
        key: &PrivateKey,
    ) -> Self {
        let signature = key.sign(block_id.as_bytes());
        Self {
            height,
            rank,
            voter,
            block_id,
            signature,
        }
    }
}
