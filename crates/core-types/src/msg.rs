use serde::{Deserialize, Serialize};

use crate::{Block, FinalizationShare, NotarizationShare};

/// A consensus message exchanged between replicas.
///
/// The serialized form is externally tagged and therefore self-describing
/// on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusMsg {
    /// A block proposal, original or echoed.
    Block(Block),

    /// A notarization share.
    Notarization(NotarizationShare),

    /// A finalization share.
    Finalization(FinalizationShare),
}

impl ConsensusMsg {
    /// A short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ConsensusMsg::Block(_) => "block",
            ConsensusMsg::Notarization(_) => "notarization-share",
            ConsensusMsg::Finalization(_) => "finalization-share",
        }
    }
}
