use banyan_core_types::{
    Block, ConsensusMsg, FinalizationShare, Height, NotarizationShare,
};

/// An action requested by a safety engine.
///
/// Outputs are produced in the order the engine decided them; the caller
/// must act on them in that order so that self-authored shares reach the
/// network before any derived message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// Broadcast a message to every peer.
    Broadcast(ConsensusMsg),

    /// A block has been committed, in chain order.
    Committed(Block),

    /// A stored block has been bypassed by the committed chain.
    Forked(Block),

    /// A notarized block opened the given height for block production.
    OpenHeight(Height),
}

impl Output {
    /// Build a `Broadcast` output for a block echo.
    pub fn block(block: Block) -> Self {
        Output::Broadcast(ConsensusMsg::Block(block))
    }

    /// Build a `Broadcast` output for a notarization share.
    pub fn notarization(share: NotarizationShare) -> Self {
        Output::Broadcast(ConsensusMsg::Notarization(share))
    }

    /// Build a `Broadcast` output for a finalization share.
    pub fn finalization(share: FinalizationShare) -> Self {
        Output::Broadcast(ConsensusMsg::Finalization(share))
    }
}
