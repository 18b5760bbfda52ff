//! Safety engines for the banyan consensus engine.
//!
//! The crate is sans-io: each engine ingests blocks and shares, mutates its
//! local state, and returns the [`Output`]s the caller must act on
//! (broadcasts, committed and forked blocks, height advancement signals).
//! All engine state is owned by a single consumer; see the replica driver.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod banyan;
mod error;
mod icc;
mod output;
mod scratch;
mod ship;
mod store;

pub use banyan::BanyanSafety;
pub use error::Error;
pub use icc::IccSafety;
pub use output::Output;
pub use store::BlockStore;

use core::fmt;
use std::str::FromStr;
use std::sync::Arc;

use banyan_core_types::{
    Block, Election, FinalizationShare, Height, NodeId, NotarizationShare, PrivateKey, Rank,
    ThresholdParams, ValidatorSet,
};

/// The consensus algorithm a replica runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// The height-ranked dual-vote engine with the fast path.
    Banyan,

    /// The plain dual-vote engine without the fast path and rank rule.
    Icc,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Banyan => write!(f, "banyan"),
            Algorithm::Icc => write!(f, "icc"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "banyan" => Ok(Algorithm::Banyan),
            "icc" => Ok(Algorithm::Icc),
            other => Err(format!(
                "unknown algorithm: {other}, available: banyan, icc"
            )),
        }
    }
}

/// A safety engine, selected at construction.
///
/// Static dispatch over the algorithm variants; every variant exposes the
/// same capability set: process a block, process either kind of share, and
/// build a proposal.
pub enum Safety {
    /// The banyan engine.
    Banyan(BanyanSafety),

    /// The icc engine.
    Icc(IccSafety),
}

impl Safety {
    /// Create the engine for the given algorithm.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        algorithm: Algorithm,
        id: NodeId,
        key: PrivateKey,
        validators: ValidatorSet,
        election: Arc<dyn Election>,
        params: ThresholdParams,
        payload_size: usize,
    ) -> Self {
        match algorithm {
            Algorithm::Banyan => Safety::Banyan(BanyanSafety::new(
                id,
                key,
                validators,
                election,
                params,
                payload_size,
            )),
            Algorithm::Icc => Safety::Icc(IccSafety::new(
                id,
                key,
                validators,
                election,
                params,
                payload_size,
            )),
        }
    }

    /// Ingest a block received from the network or proposed locally.
    pub fn process_block(&mut self, block: Block) -> Result<Vec<Output>, Error> {
        match self {
            Safety::Banyan(engine) => engine.process_block(block),
            Safety::Icc(engine) => engine.process_block(block),
        }
    }

    /// Ingest a notarization share.
    pub fn process_notarization_share(&mut self, share: NotarizationShare) -> Vec<Output> {
        match self {
            Safety::Banyan(engine) => engine.process_notarization_share(share),
            Safety::Icc(engine) => engine.process_notarization_share(share),
        }
    }

    /// Ingest a finalization share.
    pub fn process_finalization_share(&mut self, share: FinalizationShare) -> Vec<Output> {
        match self {
            Safety::Banyan(engine) => engine.process_finalization_share(share),
            Safety::Icc(engine) => engine.process_finalization_share(share),
        }
    }

    /// Build a signed proposal extending the current head.
    pub fn make_proposal(&mut self, height: Height, rank: Rank) -> Block {
        match self {
            Safety::Banyan(engine) => engine.make_proposal(height, rank),
            Safety::Icc(engine) => engine.make_proposal(height, rank),
        }
    }
}
