use std::collections::{BTreeMap, BTreeSet};

use banyan_core_types::{BlockId, FinalizationShare, NodeId, NotarizationShare, ThresholdParams};

/// A share that can be tallied per block and per voter.
pub trait QuorumShare {
    /// The replica that issued the share.
    fn voter(&self) -> NodeId;

    /// The block the share endorses.
    fn block_id(&self) -> BlockId;
}

impl QuorumShare for NotarizationShare {
    fn voter(&self) -> NodeId {
        self.voter
    }

    fn block_id(&self) -> BlockId {
        self.block_id
    }
}

impl QuorumShare for FinalizationShare {
    fn voter(&self) -> NodeId {
        self.voter
    }

    fn block_id(&self) -> BlockId {
        self.block_id
    }
}

/// Per-block tallies of a single share type against the supermajority
/// quorum (strictly more than two thirds of `n` distinct voters).
///
/// Used for finalization shares in both engines and for notarization
/// shares in the icc engine.
#[derive(Clone, Debug)]
pub struct ShareBag<S> {
    params: ThresholdParams,
    shares: BTreeMap<BlockId, BTreeMap<NodeId, S>>,
    reached: BTreeSet<BlockId>,
}

impl<S> ShareBag<S>
where
    S: QuorumShare,
{
    /// Create a new, empty bag.
    pub fn new(params: ThresholdParams) -> Self {
        Self {
            params,
            shares: BTreeMap::new(),
            reached: BTreeSet::new(),
        }
    }

    /// Add a share to its block's tally.
    ///
    /// Insertion is idempotent per `(block, voter)`: a second share from the
    /// same voter overwrites the first and does not change the count.
    /// Returns `true` exactly once, when the block first crosses the
    /// quorum threshold.
    pub fn add(&mut self, share: S) -> bool {
        let block_id = share.block_id();
        let bag = self.shares.entry(block_id).or_default();
        bag.insert(share.voter(), share);

        self.params.supermajority_met(bag.len()) && self.reached.insert(block_id)
    }

    /// The number of distinct voters recorded for the given block.
    pub fn voters(&self, block_id: &BlockId) -> usize {
        self.shares.get(block_id).map_or(0, |bag| bag.len())
    }

    /// Whether the given block has crossed the quorum threshold.
    pub fn quorum_reached(&self, block_id: &BlockId) -> bool {
        self.reached.contains(block_id)
    }
}
