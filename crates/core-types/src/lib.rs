//! Core type definitions for the banyan consensus engine.
//!
//! This crate defines the data model shared by every other crate in the
//! workspace: heights and ranks, node identities, blocks and their 32-byte
//! content identifiers, notarization and finalization shares, the Ed25519
//! signing types, the validator set, the leader election contract, and the
//! quorum threshold parameters.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod block;
mod election;
mod height;
mod msg;
mod node_id;
mod rank;
mod share;
mod signing;
mod threshold;
mod validator_set;

pub use block::{Block, BlockId};
pub use election::{Election, RoundRobin, StaticLeader};
pub use height::Height;
pub use msg::ConsensusMsg;
pub use node_id::NodeId;
pub use rank::{Rank, ShareRank};
pub use share::{FinalizationShare, NotarizationShare};
pub use signing::{PrivateKey, PublicKey, Signature};
pub use threshold::ThresholdParams;
pub use validator_set::{Validator, ValidatorSet};
