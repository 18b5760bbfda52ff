//! Infrastructure for tallying notarization and finalization shares.
//!
//! Two aggregators are provided: [`ShareBag`], a plain per-block quorum bag
//! with supermajority semantics, and [`NotarizationKeeper`], the
//! dual-threshold variant that additionally tracks the fast-path tally of
//! rank-(-1) voters per height.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod bag;
mod notarization;

pub use bag::{QuorumShare, ShareBag};
pub use notarization::{NotarizationKeeper, NotarizationOutcome};
