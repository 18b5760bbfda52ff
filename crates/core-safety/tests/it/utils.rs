use std::sync::Arc;

use bytes::Bytes;

use banyan_core_safety::{Algorithm, Output, Safety};
use banyan_core_types::{
    Block, BlockId, ConsensusMsg, Election, FinalizationShare, Height, NodeId, NotarizationShare,
    PrivateKey, Rank, RoundRobin, ShareRank, ThresholdParams, Validator, ValidatorSet,
};

pub const N: usize = 4;

pub fn keys() -> Vec<PrivateKey> {
    (1..=N).map(|i| PrivateKey::from([i as u8; 32])).collect()
}

pub fn key(voter: u32) -> PrivateKey {
    PrivateKey::from([voter as u8; 32])
}

pub fn validator_set() -> ValidatorSet {
    ValidatorSet::new(
        keys()
            .iter()
            .enumerate()
            .map(|(i, key)| Validator::new(NodeId::new(i as u32 + 1), key.public_key())),
    )
}

pub fn params() -> ThresholdParams {
    // Notarization at 3 voters, fast path at 3, supermajority at 3.
    ThresholdParams::new(4, 1, 1)
}

pub fn engine(algorithm: Algorithm, id: u32) -> Safety {
    Safety::new(
        algorithm,
        NodeId::new(id),
        key(id),
        validator_set(),
        Arc::new(RoundRobin::new(N)),
        params(),
        16,
    )
}

/// A correctly-signed block for the leader of `(height, rank)`.
pub fn block(height: u64, rank: u32, prev_id: BlockId) -> Block {
    let election = RoundRobin::new(N);
    let leader = election.leader_for(Height::new(height), Rank::new(rank));

    Block::new(
        Height::new(height),
        Rank::new(rank),
        leader,
        prev_id,
        Bytes::from_static(b"payload"),
        &key(leader.as_u32()),
    )
}

pub fn n_share(voter: u32, rank: ShareRank, block: &Block) -> NotarizationShare {
    NotarizationShare::sign(block.height, rank, NodeId::new(voter), block.id, &key(voter))
}

pub fn f_share(voter: u32, block: &Block) -> FinalizationShare {
    FinalizationShare::sign(
        block.height,
        block.rank,
        NodeId::new(voter),
        block.id,
        &key(voter),
    )
}

pub fn committed(out: &[Output]) -> Vec<Block> {
    out.iter()
        .filter_map(|o| match o {
            Output::Committed(block) => Some(block.clone()),
            _ => None,
        })
        .collect()
}

pub fn forked(out: &[Output]) -> Vec<Block> {
    out.iter()
        .filter_map(|o| match o {
            Output::Forked(block) => Some(block.clone()),
            _ => None,
        })
        .collect()
}

pub fn notarization_broadcasts(out: &[Output]) -> Vec<NotarizationShare> {
    out.iter()
        .filter_map(|o| match o {
            Output::Broadcast(ConsensusMsg::Notarization(share)) => Some(share.clone()),
            _ => None,
        })
        .collect()
}

pub fn finalization_broadcasts(out: &[Output]) -> Vec<FinalizationShare> {
    out.iter()
        .filter_map(|o| match o {
            Output::Broadcast(ConsensusMsg::Finalization(share)) => Some(share.clone()),
            _ => None,
        })
        .collect()
}

pub fn block_broadcasts(out: &[Output]) -> Vec<Block> {
    out.iter()
        .filter_map(|o| match o {
            Output::Broadcast(ConsensusMsg::Block(block)) => Some(block.clone()),
            _ => None,
        })
        .collect()
}

pub fn opened_heights(out: &[Output]) -> Vec<Height> {
    out.iter()
        .filter_map(|o| match o {
            Output::OpenHeight(height) => Some(*height),
            _ => None,
        })
        .collect()
}
