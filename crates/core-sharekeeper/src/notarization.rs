use std::collections::{BTreeMap, BTreeSet};

use banyan_core_types::{BlockId, Height, NodeId, NotarizationShare, ThresholdParams};

/// Threshold state reported after inserting a notarization share.
///
/// Both flags are recomputed on every insertion and stay `true` once their
/// quorum has been reached; the caller suppresses duplicate work with its
/// own notarized/finalized membership sets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NotarizationOutcome {
    /// The share's block meets the notarization quorum.
    pub notarized: bool,

    /// The share's height meets the fast-path quorum of distinct
    /// rank-(-1) voters.
    pub fast_finalized: bool,
}

/// The dual-threshold notarization aggregator.
///
/// Tallies shares per block against the `(n + f) / 2` notarization quorum,
/// and separately counts the distinct fast-path voters per height against
/// the `n - p` fast-path quorum.
#[derive(Clone, Debug)]
pub struct NotarizationKeeper {
    params: ThresholdParams,
    shares: BTreeMap<BlockId, BTreeMap<NodeId, NotarizationShare>>,
    fast_voters: BTreeMap<Height, BTreeSet<NodeId>>,
}

impl NotarizationKeeper {
    /// Create a new, empty keeper.
    pub fn new(params: ThresholdParams) -> Self {
        Self {
            params,
            shares: BTreeMap::new(),
            fast_voters: BTreeMap::new(),
        }
    }

    /// Add a share and report the threshold state after insertion.
    ///
    /// Insertion is idempotent per `(block, voter)` and per fast-path
    /// voter: replaying a share changes neither tally.
    pub fn add(&mut self, share: NotarizationShare) -> NotarizationOutcome {
        let height = share.height;
        let block_id = share.block_id;
        let voter = share.voter;
        let fast_path = share.rank.is_fast_path();

        let bag = self.shares.entry(block_id).or_default();
        bag.insert(voter, share);
        let block_voters = bag.len();

        if fast_path {
            self.fast_voters.entry(height).or_default().insert(voter);
        }

        NotarizationOutcome {
            notarized: self.params.notarization_met(block_voters),
            fast_finalized: fast_path && self.params.fast_path_met(self.fast_voters(height)),
        }
    }

    /// The number of distinct voters recorded for the given block.
    pub fn voters(&self, block_id: &BlockId) -> usize {
        self.shares.get(block_id).map_or(0, |bag| bag.len())
    }

    /// The number of distinct fast-path voters recorded at the given height.
    pub fn fast_voters(&self, height: Height) -> usize {
        self.fast_voters.get(&height).map_or(0, |v| v.len())
    }
}
