use banyan_core_types::{BlockId, Height, NodeId, Rank};
use thiserror::Error;

/// Protocol-invalid input detected while processing a block.
///
/// These are absorbed at the replica driver: logged at warning level and
/// dropped, never propagated outward.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The block's proposer is not the leader of its `(height, rank)` slot.
    #[error("received a proposal for height {height}, rank {rank} from an invalid leader ({proposer})")]
    InvalidLeader {
        /// The claimed proposer.
        proposer: NodeId,
        /// The block's height.
        height: Height,
        /// The block's rank.
        rank: Rank,
    },

    /// The block's proposer is not a member of the validator set.
    #[error("received a proposal from unknown proposer {proposer}")]
    UnknownProposer {
        /// The claimed proposer.
        proposer: NodeId,
    },

    /// The proposer signature does not verify over the block identifier.
    #[error("received block {id} with an invalid signature from {proposer}")]
    InvalidBlockSignature {
        /// The block identifier.
        id: BlockId,
        /// The claimed proposer.
        proposer: NodeId,
    },
}
