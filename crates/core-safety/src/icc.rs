use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, warn};

use banyan_core_sharekeeper::ShareBag;
use banyan_core_types::{
    Block, BlockId, Election, FinalizationShare, Height, NodeId, NotarizationShare, PrivateKey,
    Rank, ShareRank, Signature, ThresholdParams, ValidatorSet,
};

use crate::error::Error;
use crate::output::Output;
use crate::scratch::HeightScratch;
use crate::ship::Shipper;
use crate::store::BlockStore;

/// The plain dual-vote safety engine.
///
/// Notarizes with a supermajority of `n` and carries no fast path: a
/// replica votes for every block above its head height, regardless of
/// rank.
pub struct IccSafety {
    id: NodeId,
    key: PrivateKey,
    validators: ValidatorSet,
    election: Arc<dyn Election>,
    payload_size: usize,

    store: BlockStore,
    notarizations: ShareBag<NotarizationShare>,
    finalizations: ShareBag<FinalizationShare>,

    head_height: Height,
    head_id: BlockId,

    scratch: BTreeMap<Height, HeightScratch>,
    notarized: BTreeSet<BlockId>,
    finalized: BTreeSet<BlockId>,
    shipper: Shipper,
    echoed: BTreeSet<BlockId>,
    rng: StdRng,
}

impl IccSafety {
    /// Create a new engine for the given replica.
    pub fn new(
        id: NodeId,
        key: PrivateKey,
        validators: ValidatorSet,
        election: Arc<dyn Election>,
        params: ThresholdParams,
        payload_size: usize,
    ) -> Self {
        Self {
            id,
            key,
            validators,
            election,
            payload_size,
            store: BlockStore::new(),
            notarizations: ShareBag::new(params),
            finalizations: ShareBag::new(params),
            head_height: Height::ZERO,
            head_id: BlockId::genesis(),
            scratch: BTreeMap::new(),
            notarized: BTreeSet::new(),
            finalized: BTreeSet::new(),
            shipper: Shipper::new(),
            echoed: BTreeSet::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// The highest height with a notarized block.
    pub fn head_height(&self) -> Height {
        self.head_height
    }

    /// The block this replica would extend with its next proposal.
    pub fn head_id(&self) -> BlockId {
        self.head_id
    }

    /// Whether the given block is finalized.
    pub fn is_finalized(&self, id: &BlockId) -> bool {
        self.finalized.contains(id)
    }

    /// The block graph.
    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    /// Ingest a block. A known block is a no-op; a block failing the leader
    /// or signature check is rejected.
    pub fn process_block(&mut self, block: Block) -> Result<Vec<Output>, Error> {
        if self.store.exists(&block.id) {
            return Ok(Vec::new());
        }

        debug!(height = %block.height, rank = %block.rank, id = %block.id, "got new block");

        if !self
            .election
            .is_leader(block.proposer, block.height, block.rank)
        {
            return Err(Error::InvalidLeader {
                proposer: block.proposer,
                height: block.height,
                rank: block.rank,
            });
        }

        if block.proposer != self.id {
            let Some(public_key) = self.validators.public_key(block.proposer) else {
                return Err(Error::UnknownProposer {
                    proposer: block.proposer,
                });
            };

            if !public_key.verify(&block.signature, block.id.as_bytes()) {
                return Err(Error::InvalidBlockSignature {
                    id: block.id,
                    proposer: block.proposer,
                });
            }
        }

        let mut out = Vec::new();

        if block.height > self.head_height && self.echoed.insert(block.id) {
            out.push(Output::block(block.clone()));
        }

        self.store.insert(block.clone());

        if self.shipper.is_queued(&block.id) {
            self.shipper.try_ship(&mut self.store, block.id, &mut out);
        }

        // Vote for every block above the head, no rank rule.
        if self.head_height < block.height {
            let share = {
                let scratch = self.scratch.entry(block.height).or_default();
                scratch.shares_sent += 1;
                scratch.last_share_id = Some(block.id);

                NotarizationShare::sign(
                    block.height,
                    ShareRank::Rank(block.rank),
                    self.id,
                    block.id,
                    &self.key,
                )
            };

            out.push(Output::notarization(share.clone()));
            self.apply_notarization_share(share, false, &mut out);
        }

        self.maybe_emit_finalization_share(block.height, block.rank, block.id, &mut out);

        Ok(out)
    }

    /// Ingest a notarization share received from the network.
    pub fn process_notarization_share(&mut self, share: NotarizationShare) -> Vec<Output> {
        let mut out = Vec::new();
        let verify = share.voter != self.id;
        self.apply_notarization_share(share, verify, &mut out);
        out
    }

    /// Ingest a finalization share received from the network.
    pub fn process_finalization_share(&mut self, share: FinalizationShare) -> Vec<Output> {
        let mut out = Vec::new();
        let verify = share.voter != self.id;
        self.apply_finalization_share(share, verify, &mut out);
        out
    }

    /// Build a signed proposal extending the current head.
    pub fn make_proposal(&mut self, height: Height, rank: Rank) -> Block {
        let mut payload = vec![0u8; self.payload_size];
        self.rng.fill_bytes(&mut payload);

        Block::new(
            height,
            rank,
            self.id,
            self.head_id,
            Bytes::from(payload),
            &self.key,
        )
    }

    fn apply_notarization_share(
        &mut self,
        share: NotarizationShare,
        verify: bool,
        out: &mut Vec<Output>,
    ) {
        if self.notarized.contains(&share.block_id) {
            return;
        }

        if verify && !self.verify_share(share.voter, &share.block_id, &share.signature) {
            return;
        }

        debug!(voter = %share.voter, block_id = %share.block_id, "processing notarization share");

        if !self.notarizations.add(share.clone()) {
            return;
        }

        self.notarized.insert(share.block_id);
        debug!(height = %share.height, block_id = %share.block_id, "block notarized");

        if self.head_height < share.height {
            self.head_height = share.height;
            self.head_id = share.block_id;
            out.push(Output::OpenHeight(share.height.increment()));
        }

        self.maybe_emit_finalization_share(
            share.height,
            share.rank.effective_rank(),
            share.block_id,
            out,
        );
    }

    fn apply_finalization_share(
        &mut self,
        share: FinalizationShare,
        verify: bool,
        out: &mut Vec<Output>,
    ) {
        if self.finalized.contains(&share.block_id) {
            return;
        }

        if verify && !self.verify_share(share.voter, &share.block_id, &share.signature) {
            return;
        }

        debug!(voter = %share.voter, block_id = %share.block_id, "processing finalization share");

        if !self.finalizations.add(share.clone()) {
            return;
        }

        self.finalized.insert(share.block_id);
        debug!(height = %share.height, block_id = %share.block_id, "block finalized");
        self.shipper.try_ship(&mut self.store, share.block_id, out);
    }

    fn maybe_emit_finalization_share(
        &mut self,
        height: Height,
        rank: Rank,
        block_id: BlockId,
        out: &mut Vec<Output>,
    ) {
        if !self.notarized.contains(&block_id) {
            return;
        }

        let share = {
            let scratch = self.scratch.entry(height).or_default();
            if scratch.finalization_sent
                || scratch.shares_sent != 1
                || scratch.last_share_id != Some(block_id)
            {
                return;
            }

            scratch.finalization_sent = true;
            FinalizationShare::sign(height, rank, self.id, block_id, &self.key)
        };

        out.push(Output::finalization(share.clone()));
        self.apply_finalization_share(share, false, out);
    }

    fn verify_share(&self, voter: NodeId, block_id: &BlockId, signature: &Signature) -> bool {
        let Some(public_key) = self.validators.public_key(voter) else {
            warn!(%voter, "received a share from an unknown voter");
            return false;
        };

        if !public_key.verify(signature, block_id.as_bytes()) {
            warn!(%voter, %block_id, "received a share with an invalid signature");
            return false;
        }

        true
    }
}
